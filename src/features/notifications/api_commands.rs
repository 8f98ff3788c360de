//! ERSバックエンド経由での通知操作
use crate::features::notifications::models::{CreateNotificationDto, Notification};
use crate::features::users::models::UserId;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use log::{error, info};

/// ユーザー宛の通知一覧を取得する
pub async fn fetch_notifications(
    client: &ApiClient,
    user_id: &UserId,
) -> AppResult<Vec<Notification>> {
    let endpoint = format!("/notifications/user/{}", urlencoding::encode(user_id.as_str()));
    let notifications: Vec<Notification> = client.get(&endpoint).await.map_err(|e| {
        error!("通知一覧取得エラー: user_id={user_id}, error={e}");
        e
    })?;

    info!(
        "通知一覧取得成功: user_id={user_id}, count={}",
        notifications.len()
    );
    Ok(notifications)
}

/// 通知を作成する
pub async fn create_notification(
    client: &ApiClient,
    dto: &CreateNotificationDto,
) -> AppResult<Notification> {
    let notification: Notification = client.post("/notifications/", dto).await.map_err(|e| {
        error!("通知作成エラー: expense_id={}, error={e}", dto.expense_id);
        e
    })?;

    info!("通知作成成功: expense_id={}", dto.expense_id);
    Ok(notification)
}
