//! ERSバックエンドとの境界
//!
//! 画面側のオーケストレーターはこのトレイト越しにバックエンドを呼び出す。
//! 本番では[`ApiClient`]、テストではインメモリの実装を使う。
use crate::features::auth::api_commands as auth_api;
use crate::features::expenses::api_commands as expense_api;
use crate::features::expenses::models::{CreateExpenseDto, Expense, UpdateExpenseDto};
use crate::features::notifications::api_commands as notification_api;
use crate::features::notifications::models::{CreateNotificationDto, Notification};
use crate::features::users::api_commands as user_api;
use crate::features::users::models::{User, UserId, UserPayload};
use crate::shared::api_client::{ApiClient, UploadFile};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
pub(crate) mod stub_server;

#[async_trait]
pub trait ErsBackend: Send + Sync {
    /// 認証情報が一致しない場合は`Ok(None)`
    async fn login(&self, email: &str, password: &str) -> AppResult<Option<User>>;

    async fn fetch_user_expenses(&self, user_id: &UserId) -> AppResult<Vec<Expense>>;

    async fn create_expense(&self, dto: &CreateExpenseDto) -> AppResult<Expense>;

    async fn update_expense(
        &self,
        expense_id: i64,
        user_id: &UserId,
        dto: &UpdateExpenseDto,
    ) -> AppResult<Expense>;

    async fn delete_expense(&self, expense_id: i64, user_id: &UserId) -> AppResult<()>;

    async fn approve_expense(
        &self,
        expense_id: i64,
        owner_id: &UserId,
        approved_by: &UserId,
    ) -> AppResult<Expense>;

    async fn reject_expense(
        &self,
        expense_id: i64,
        owner_id: &UserId,
        reason: &str,
        rejected_by: &UserId,
    ) -> AppResult<Expense>;

    /// 領収書の参照を返す
    async fn upload_receipt(&self, file: &UploadFile) -> AppResult<String>;

    async fn fetch_notifications(&self, user_id: &UserId) -> AppResult<Vec<Notification>>;

    async fn create_notification(&self, dto: &CreateNotificationDto) -> AppResult<Notification>;

    async fn fetch_users(&self) -> AppResult<Vec<User>>;

    async fn create_user(&self, payload: &UserPayload) -> AppResult<User>;

    async fn update_user(&self, user_key: &str, payload: &UserPayload) -> AppResult<User>;

    async fn delete_user(&self, user_key: &str) -> AppResult<()>;

    async fn fetch_subordinates(&self, user_key: &str) -> AppResult<Vec<User>>;

    async fn fetch_reportee_info(&self, reportee_id: &UserId) -> AppResult<User>;
}

#[async_trait]
impl ErsBackend for ApiClient {
    async fn login(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        auth_api::login(self, email, password).await
    }

    async fn fetch_user_expenses(&self, user_id: &UserId) -> AppResult<Vec<Expense>> {
        expense_api::fetch_user_expenses(self, user_id).await
    }

    async fn create_expense(&self, dto: &CreateExpenseDto) -> AppResult<Expense> {
        expense_api::create_expense(self, dto).await
    }

    async fn update_expense(
        &self,
        expense_id: i64,
        user_id: &UserId,
        dto: &UpdateExpenseDto,
    ) -> AppResult<Expense> {
        expense_api::update_expense(self, expense_id, user_id, dto).await
    }

    async fn delete_expense(&self, expense_id: i64, user_id: &UserId) -> AppResult<()> {
        expense_api::delete_expense(self, expense_id, user_id).await
    }

    async fn approve_expense(
        &self,
        expense_id: i64,
        owner_id: &UserId,
        approved_by: &UserId,
    ) -> AppResult<Expense> {
        expense_api::approve_expense(self, expense_id, owner_id, approved_by).await
    }

    async fn reject_expense(
        &self,
        expense_id: i64,
        owner_id: &UserId,
        reason: &str,
        rejected_by: &UserId,
    ) -> AppResult<Expense> {
        expense_api::reject_expense(self, expense_id, owner_id, reason, rejected_by).await
    }

    async fn upload_receipt(&self, file: &UploadFile) -> AppResult<String> {
        expense_api::upload_receipt(self, file).await
    }

    async fn fetch_notifications(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        notification_api::fetch_notifications(self, user_id).await
    }

    async fn create_notification(&self, dto: &CreateNotificationDto) -> AppResult<Notification> {
        notification_api::create_notification(self, dto).await
    }

    async fn fetch_users(&self) -> AppResult<Vec<User>> {
        user_api::fetch_users(self).await
    }

    async fn create_user(&self, payload: &UserPayload) -> AppResult<User> {
        user_api::create_user(self, payload).await
    }

    async fn update_user(&self, user_key: &str, payload: &UserPayload) -> AppResult<User> {
        user_api::update_user(self, user_key, payload).await
    }

    async fn delete_user(&self, user_key: &str) -> AppResult<()> {
        user_api::delete_user(self, user_key).await
    }

    async fn fetch_subordinates(&self, user_key: &str) -> AppResult<Vec<User>> {
        user_api::fetch_subordinates(self, user_key).await
    }

    async fn fetch_reportee_info(&self, reportee_id: &UserId) -> AppResult<User> {
        user_api::fetch_reportee_info(self, reportee_id).await
    }
}
