use crate::features::expenses::models::ExpenseStatus;
use crate::features::users::models::UserId;
use crate::shared::reconcile::Keyed;
use crate::shared::utils::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知データモデル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// ローカルで合成した通知には採番されたIDがない
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExpenseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<i64>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Keyed for Notification {
    type Key = Option<i64>;

    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// 通知作成用DTO
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationDto {
    pub message: String,
    pub status: ExpenseStatus,
    pub user_id: UserId,
    pub manager_id: UserId,
    pub expense_id: i64,
}

impl CreateNotificationDto {
    /// 作成リクエストと同じ内容のローカル通知を合成する
    pub fn to_local_notification(&self, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: None,
            message: self.message.clone(),
            status: Some(self.status),
            user_id: Some(self.user_id.clone()),
            manager_id: Some(self.manager_id.clone()),
            expense_id: Some(self.expense_id),
            created_at: Some(created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_notification_deserialization() {
        let json = r#"{
            "id": 5,
            "message": "Your expense request for TRAVEL. And amount 100 has been approved.",
            "status": "APPROVED",
            "userId": "W200",
            "managerId": "W100",
            "expenseId": 11,
            "createdAt": "2024-05-03T10:00:00Z"
        }"#;

        let notification: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(notification.id, Some(5));
        assert_eq!(notification.status, Some(ExpenseStatus::Approved));
        assert_eq!(notification.expense_id, Some(11));
    }

    #[test]
    fn test_minimal_notification() {
        let notification: Notification =
            serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(notification.message, "hello");
        assert!(notification.id.is_none());
        assert!(notification.created_at.is_none());
    }

    #[test]
    fn test_local_notification_from_dto() {
        let dto = CreateNotificationDto {
            message: "m".to_string(),
            status: ExpenseStatus::Rejected,
            user_id: UserId::from("W2"),
            manager_id: UserId::from("W1"),
            expense_id: 3,
        };
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let local = dto.to_local_notification(at);
        assert_eq!(local.id, None);
        assert_eq!(local.status, Some(ExpenseStatus::Rejected));
        assert_eq!(local.created_at, Some(at));

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["managerId"], "W1");
        assert_eq!(json["expenseId"], 3);
    }
}
