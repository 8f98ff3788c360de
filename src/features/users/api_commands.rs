//! ERSバックエンド経由でのユーザー管理操作
use crate::features::users::models::{User, UserId, UserPayload};
use crate::shared::api_client::{with_query, ApiClient};
use crate::shared::errors::AppResult;
use log::{debug, error, info};

/// 全ユーザーを取得する
pub async fn fetch_users(client: &ApiClient) -> AppResult<Vec<User>> {
    let users: Vec<User> = client.get("/users/").await.map_err(|e| {
        error!("ユーザー一覧取得エラー: {e}");
        e
    })?;

    info!("ユーザー一覧取得成功: count={}", users.len());
    Ok(users)
}

/// ユーザーを作成する
pub async fn create_user(client: &ApiClient, payload: &UserPayload) -> AppResult<User> {
    debug!("ユーザー作成リクエスト: email={}", payload.email);
    let user: User = client.post("/users", payload).await.map_err(|e| {
        error!("ユーザー作成エラー: email={}, error={e}", payload.email);
        e
    })?;

    info!("ユーザー作成成功: wissen_id={}", user.wissen_id);
    Ok(user)
}

/// ユーザーを更新する
///
/// # 引数
/// * `user_key` - 更新対象のキー（[`User::update_key`]）
pub async fn update_user(client: &ApiClient, user_key: &str, payload: &UserPayload) -> AppResult<User> {
    let endpoint = format!("/users/{}", urlencoding::encode(user_key));
    let user: User = client.put(&endpoint, payload).await.map_err(|e| {
        error!("ユーザー更新エラー: user_key={user_key}, error={e}");
        e
    })?;

    info!("ユーザー更新成功: wissen_id={}", user.wissen_id);
    Ok(user)
}

/// ユーザーを削除する
pub async fn delete_user(client: &ApiClient, user_key: &str) -> AppResult<()> {
    let endpoint = format!("/users/{}", urlencoding::encode(user_key));
    client.delete(&endpoint).await.map_err(|e| {
        error!("ユーザー削除エラー: user_key={user_key}, error={e}");
        e
    })?;

    info!("ユーザー削除成功: user_key={user_key}");
    Ok(())
}

/// 部下一覧を取得する
pub async fn fetch_subordinates(client: &ApiClient, user_key: &str) -> AppResult<Vec<User>> {
    let endpoint = format!("/users/{}/subordinates", urlencoding::encode(user_key));
    let subordinates: Vec<User> = client.get(&endpoint).await?;

    info!(
        "部下一覧取得成功: user_key={user_key}, count={}",
        subordinates.len()
    );
    Ok(subordinates)
}

/// 部下の詳細情報を取得する
pub async fn fetch_reportee_info(client: &ApiClient, reportee_id: &UserId) -> AppResult<User> {
    let endpoint = with_query(
        "/users/getReporteeInfo",
        &[("reporteeWissenId", reportee_id.as_str())],
    );
    let reportee: User = client.get(&endpoint).await.map_err(|e| {
        error!("部下情報取得エラー: reportee_id={reportee_id}, error={e}");
        e
    })?;

    info!("部下情報取得成功: reportee_id={reportee_id}");
    Ok(reportee)
}
