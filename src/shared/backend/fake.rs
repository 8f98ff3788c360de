//! テスト用のインメモリバックエンド
use super::ErsBackend;
use crate::features::expenses::models::{
    CreateExpenseDto, Expense, ExpenseOwner, ExpenseStatus, UpdateExpenseDto,
};
use crate::features::notifications::models::{CreateNotificationDto, Notification};
use crate::features::users::models::{User, UserId, UserPayload};
use crate::shared::api_client::UploadFile;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub(crate) struct FakeState {
    pub users: Vec<User>,
    pub passwords: HashMap<String, String>,
    pub expenses: HashMap<UserId, Vec<Expense>>,
    pub notifications: HashMap<UserId, Vec<Notification>>,
    pub subordinates: HashMap<String, Vec<User>>,
    pub created_notifications: Vec<CreateNotificationDto>,
    pub uploads: Vec<UploadFile>,
    pub calls: Vec<String>,
    failures: HashMap<&'static str, String>,
    failing_expense_owners: HashSet<UserId>,
    hang_expense_fetches: bool,
    next_id: i64,
}

/// 操作ごとに失敗を注入できるインメモリバックエンド
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.state().next_id = 1000;
        backend
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_user(self, user: User, password: &str) -> Self {
        {
            let mut state = self.state();
            state.passwords.insert(user.email.clone(), password.to_string());
            state.users.push(user);
        }
        self
    }

    pub fn with_expenses(self, owner: &str, expenses: Vec<Expense>) -> Self {
        self.state().expenses.insert(UserId::from(owner), expenses);
        self
    }

    pub fn with_notifications(self, owner: &str, notifications: Vec<Notification>) -> Self {
        self.state()
            .notifications
            .insert(UserId::from(owner), notifications);
        self
    }

    /// 指定した操作を500エラーで失敗させる
    pub fn fail(&self, operation: &'static str, message: &str) {
        self.state().failures.insert(operation, message.to_string());
    }

    pub fn recover(&self, operation: &'static str) {
        self.state().failures.remove(operation);
    }

    pub fn fail_expenses_for(&self, owner: &str) {
        self.state().failing_expense_owners.insert(UserId::from(owner));
    }

    pub fn hang_expense_fetches(&self) {
        self.state().hang_expense_fetches = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.split(':').next() == Some(operation))
            .count()
    }

    fn record(&self, operation: &'static str, detail: &str) -> AppResult<()> {
        let mut state = self.state();
        state.calls.push(format!("{operation}:{detail}"));
        match state.failures.get(operation) {
            Some(message) => Err(server_error(message)),
            None => Ok(()),
        }
    }

    fn set_status(&self, expense_id: i64, status: ExpenseStatus) -> AppResult<Expense> {
        let mut state = self.state();
        let expense = state
            .expenses
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|expense| expense.id == expense_id)
            .ok_or_else(|| AppError::not_found(format!("Expense {expense_id}")))?;
        expense.status = status;
        Ok(expense.clone())
    }
}

fn server_error(message: &str) -> AppError {
    AppError::Api {
        status: 500,
        code: "INTERNAL_SERVER_ERROR".to_string(),
        message: Some(message.to_string()).filter(|m| !m.trim().is_empty()),
    }
}

#[async_trait]
impl ErsBackend for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        self.record("login", email)?;
        let state = self.state();
        let matches = state.passwords.get(email).map(String::as_str) == Some(password);
        Ok(matches
            .then(|| state.users.iter().find(|u| u.email == email).cloned())
            .flatten())
    }

    async fn fetch_user_expenses(&self, user_id: &UserId) -> AppResult<Vec<Expense>> {
        self.record("fetch_user_expenses", user_id.as_str())?;
        let hang = self.state().hang_expense_fetches;
        if hang {
            std::future::pending::<()>().await;
        }
        // 後から登録した部下の取得が先に終わるよう順序を入れ替える
        tokio::task::yield_now().await;

        let state = self.state();
        if state.failing_expense_owners.contains(user_id) {
            return Err(server_error(&format!("expenses of {user_id} unavailable")));
        }
        Ok(state.expenses.get(user_id).cloned().unwrap_or_default())
    }

    async fn create_expense(&self, dto: &CreateExpenseDto) -> AppResult<Expense> {
        self.record("create_expense", dto.user_id.as_str())?;
        let mut state = self.state();
        state.next_id += 1;
        let expense = Expense {
            id: state.next_id,
            user: Some(ExpenseOwner {
                wissen_id: dto.user_id.clone(),
                name: None,
            }),
            wissen_id: Some(dto.user_id.clone()),
            category: dto.category,
            amount: dto.amount,
            description: dto.description.clone(),
            receipt: Some(dto.receipt.clone()),
            status: ExpenseStatus::Pending,
            created_at: Some(chrono::Utc::now()),
        };
        state
            .expenses
            .entry(dto.user_id.clone())
            .or_default()
            .insert(0, expense.clone());
        Ok(expense)
    }

    async fn update_expense(
        &self,
        expense_id: i64,
        user_id: &UserId,
        dto: &UpdateExpenseDto,
    ) -> AppResult<Expense> {
        self.record("update_expense", &expense_id.to_string())?;
        let mut state = self.state();
        let expense = state
            .expenses
            .get_mut(user_id)
            .and_then(|list| list.iter_mut().find(|e| e.id == expense_id))
            .ok_or_else(|| AppError::not_found(format!("Expense {expense_id}")))?;
        expense.category = dto.expense.category;
        expense.amount = dto.expense.amount;
        expense.description = dto.expense.description.clone();
        expense.receipt = Some(dto.expense.receipt.clone());
        expense.status = dto.expense.status;
        Ok(expense.clone())
    }

    async fn delete_expense(&self, expense_id: i64, user_id: &UserId) -> AppResult<()> {
        self.record("delete_expense", &expense_id.to_string())?;
        if let Some(list) = self.state().expenses.get_mut(user_id) {
            list.retain(|e| e.id != expense_id);
        }
        Ok(())
    }

    async fn approve_expense(
        &self,
        expense_id: i64,
        _owner_id: &UserId,
        approved_by: &UserId,
    ) -> AppResult<Expense> {
        self.record("approve_expense", &format!("{expense_id}:{approved_by}"))?;
        self.set_status(expense_id, ExpenseStatus::Approved)
    }

    async fn reject_expense(
        &self,
        expense_id: i64,
        _owner_id: &UserId,
        reason: &str,
        rejected_by: &UserId,
    ) -> AppResult<Expense> {
        self.record("reject_expense", &format!("{expense_id}:{reason}:{rejected_by}"))?;
        self.set_status(expense_id, ExpenseStatus::Rejected)
    }

    async fn upload_receipt(&self, file: &UploadFile) -> AppResult<String> {
        self.record("upload_receipt", &file.file_name)?;
        self.state().uploads.push(file.clone());
        Ok(format!("https://files.example.com/receipts/{}", file.file_name))
    }

    async fn fetch_notifications(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        self.record("fetch_notifications", user_id.as_str())?;
        Ok(self
            .state()
            .notifications
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_notification(&self, dto: &CreateNotificationDto) -> AppResult<Notification> {
        self.record("create_notification", &dto.expense_id.to_string())?;
        let mut state = self.state();
        state.created_notifications.push(dto.clone());
        state.next_id += 1;
        let mut notification = dto.to_local_notification(chrono::Utc::now());
        notification.id = Some(state.next_id);
        Ok(notification)
    }

    async fn fetch_users(&self) -> AppResult<Vec<User>> {
        self.record("fetch_users", "")?;
        Ok(self.state().users.clone())
    }

    async fn create_user(&self, payload: &UserPayload) -> AppResult<User> {
        self.record("create_user", &payload.email)?;
        let mut state = self.state();
        state.next_id += 1;
        let user = User {
            wissen_id: UserId::new(format!("W{}", state.next_id)),
            id: Some(state.next_id),
            name: payload.name.clone(),
            email: payload.email.clone(),
            role: payload.role.clone(),
            is_manager: payload.is_manager,
            reportees: Vec::new(),
            department: None,
            position: None,
            manager_id: payload.manager_id.as_deref().map(UserId::from),
            date_of_joining: Some(payload.date_of_joining.clone()),
            subordinate_ids: payload
                .subordinate_ids
                .iter()
                .map(|id| UserId::from(id.as_str()))
                .collect(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user_key: &str, payload: &UserPayload) -> AppResult<User> {
        self.record("update_user", user_key)?;
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.update_key() == user_key)
            .ok_or_else(|| AppError::not_found(format!("User {user_key}")))?;
        user.name = payload.name.clone();
        user.email = payload.email.clone();
        user.role = payload.role.clone();
        user.is_manager = payload.is_manager;
        Ok(user.clone())
    }

    async fn delete_user(&self, user_key: &str) -> AppResult<()> {
        self.record("delete_user", user_key)?;
        self.state().users.retain(|u| u.update_key() != user_key);
        Ok(())
    }

    async fn fetch_subordinates(&self, user_key: &str) -> AppResult<Vec<User>> {
        self.record("fetch_subordinates", user_key)?;
        Ok(self
            .state()
            .subordinates
            .get(user_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_reportee_info(&self, reportee_id: &UserId) -> AppResult<User> {
        self.record("fetch_reportee_info", reportee_id.as_str())?;
        self.state()
            .users
            .iter()
            .find(|u| &u.wissen_id == reportee_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("User {reportee_id}")))
    }
}

/// テスト用のユーザーを作成する
pub(crate) fn user(wissen_id: &str, name: &str, role: &str, reportees: &[&str]) -> User {
    User {
        wissen_id: UserId::from(wissen_id),
        id: None,
        name: name.to_string(),
        email: format!("{}@example.com", wissen_id.to_lowercase()),
        role: role.to_string(),
        is_manager: !reportees.is_empty(),
        reportees: reportees.iter().map(|id| UserId::from(*id)).collect(),
        department: None,
        position: None,
        manager_id: None,
        date_of_joining: None,
        subordinate_ids: Vec::new(),
    }
}

/// テスト用の経費を作成する
pub(crate) fn expense(id: i64, owner: &str, status: ExpenseStatus, created_at: &str) -> Expense {
    Expense {
        id,
        user: Some(ExpenseOwner {
            wissen_id: UserId::from(owner),
            name: None,
        }),
        wissen_id: Some(UserId::from(owner)),
        category: crate::features::expenses::models::ExpenseCategory::Travel,
        amount: 100.0,
        description: format!("expense {id}"),
        receipt: Some(format!("https://files.example.com/receipts/{id}.pdf")),
        status,
        created_at: crate::shared::utils::timestamp::parse_timestamp(created_at),
    }
}
