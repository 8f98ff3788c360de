//! ERSバックエンド経由での経費操作
use crate::features::expenses::models::{CreateExpenseDto, Expense, ExpenseStatus, UpdateExpenseDto};
use crate::features::users::models::UserId;
use crate::shared::api_client::{with_query, ApiClient, UploadFile};
use crate::shared::errors::{AppError, AppResult};
use log::{debug, error, info};

/// 領収書アップロード先
pub const RECEIPT_UPLOAD_ENDPOINT: &str = "/upload/pdf";

/// ユーザーの経費一覧を取得する
pub async fn fetch_user_expenses(client: &ApiClient, user_id: &UserId) -> AppResult<Vec<Expense>> {
    let endpoint = with_query("/expenses/user", &[("userId", user_id.as_str())]);
    let expenses: Vec<Expense> = client.get(&endpoint).await.map_err(|e| {
        error!("経費一覧取得エラー: user_id={user_id}, error={e}");
        e
    })?;

    info!("経費一覧取得成功: user_id={user_id}, count={}", expenses.len());
    Ok(expenses)
}

/// 経費を作成する
pub async fn create_expense(client: &ApiClient, dto: &CreateExpenseDto) -> AppResult<Expense> {
    debug!("経費作成リクエスト: {dto:?}");
    let expense: Expense = client.post("/expenses/", dto).await.map_err(|e| {
        error!("経費作成エラー: {e}");
        e
    })?;

    info!("経費作成成功: expense_id={}", expense.id);
    Ok(expense)
}

/// 経費を更新する
///
/// # 引数
/// * `expense_id` - 経費ID
/// * `user_id` - 申請者のwissenID
/// * `dto` - 更新内容
pub async fn update_expense(
    client: &ApiClient,
    expense_id: i64,
    user_id: &UserId,
    dto: &UpdateExpenseDto,
) -> AppResult<Expense> {
    let endpoint = with_query(&format!("/expenses/{expense_id}"), &[("userId", user_id.as_str())]);
    let expense: Expense = client.put(&endpoint, dto).await.map_err(|e| {
        error!("経費更新エラー: expense_id={expense_id}, error={e}");
        e
    })?;

    info!("経費更新成功: expense_id={}", expense.id);
    Ok(expense)
}

/// 経費を削除する
pub async fn delete_expense(client: &ApiClient, expense_id: i64, user_id: &UserId) -> AppResult<()> {
    let endpoint = with_query(&format!("/expenses/{expense_id}"), &[("userId", user_id.as_str())]);
    client.delete(&endpoint).await.map_err(|e| {
        error!("経費削除エラー: expense_id={expense_id}, error={e}");
        e
    })?;

    info!("経費削除成功: expense_id={expense_id}");
    Ok(())
}

/// 経費を承認する
///
/// # 引数
/// * `owner_id` - 申請者のwissenID
/// * `approved_by` - 承認するマネージャーのwissenID
pub async fn approve_expense(
    client: &ApiClient,
    expense_id: i64,
    owner_id: &UserId,
    approved_by: &UserId,
) -> AppResult<Expense> {
    let endpoint = with_query(
        &format!("/expenses/{expense_id}/status/approve"),
        &[
            ("userId", owner_id.as_str()),
            ("status", ExpenseStatus::Approved.as_str()),
            ("approvedBy", approved_by.as_str()),
        ],
    );
    let expense: Expense = client.put_without_body(&endpoint).await.map_err(|e| {
        error!("経費承認エラー: expense_id={expense_id}, error={e}");
        e
    })?;

    info!("経費承認成功: expense_id={expense_id}, approved_by={approved_by}");
    Ok(expense)
}

/// 経費を却下する
pub async fn reject_expense(
    client: &ApiClient,
    expense_id: i64,
    owner_id: &UserId,
    reason: &str,
    rejected_by: &UserId,
) -> AppResult<Expense> {
    let endpoint = with_query(
        &format!("/expenses/{expense_id}/status/reject"),
        &[
            ("userId", owner_id.as_str()),
            ("status", ExpenseStatus::Rejected.as_str()),
            ("reason", reason),
            ("rejectedBy", rejected_by.as_str()),
        ],
    );
    let expense: Expense = client.put_without_body(&endpoint).await.map_err(|e| {
        error!("経費却下エラー: expense_id={expense_id}, error={e}");
        e
    })?;

    info!("経費却下成功: expense_id={expense_id}, rejected_by={rejected_by}");
    Ok(expense)
}

/// 領収書をアップロードし、領収書の参照を返す
pub async fn upload_receipt(client: &ApiClient, file: &UploadFile) -> AppResult<String> {
    let body = client.upload(RECEIPT_UPLOAD_ENDPOINT, file).await.map_err(|e| {
        error!("領収書アップロードエラー: file_name={}, error={e}", file.file_name);
        e
    })?;

    let reference = receipt_reference_from_body(&body)?;
    info!("領収書アップロード成功: file_name={}", file.file_name);
    Ok(reference)
}

/// アップロードのレスポンスボディから領収書の参照を取り出す
///
/// バックエンドはプレーンテキストかJSON文字列のどちらかで返す
pub(crate) fn receipt_reference_from_body(body: &str) -> AppResult<String> {
    let reference = serde_json::from_str::<String>(body)
        .unwrap_or_else(|_| body.trim().to_string());

    if reference.trim().is_empty() {
        return Err(AppError::decode(format!(
            "{RECEIPT_UPLOAD_ENDPOINT}: 領収書の参照が空です"
        )));
    }
    Ok(reference)
}
