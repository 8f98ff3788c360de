use crate::features::users::models::UserId;
use crate::shared::reconcile::Keyed;
use crate::shared::utils::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 経費カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Travel,
    Electronics,
    Clothes,
    Vehicle,
    Accommodation,
}

impl ExpenseCategory {
    /// 選択肢として表示する順序
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Travel,
        ExpenseCategory::Electronics,
        ExpenseCategory::Clothes,
        ExpenseCategory::Vehicle,
        ExpenseCategory::Accommodation,
    ];

    /// バックエンドで保存される大文字の値
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Travel => "TRAVEL",
            ExpenseCategory::Electronics => "ELECTRONICS",
            ExpenseCategory::Clothes => "CLOTHES",
            ExpenseCategory::Vehicle => "VEHICLE",
            ExpenseCategory::Accommodation => "ACCOMMODATION",
        }
    }

    /// 画面表示用のラベル
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Electronics => "Electronics",
            ExpenseCategory::Clothes => "Clothes",
            ExpenseCategory::Vehicle => "Vehicle",
            ExpenseCategory::Accommodation => "Accommodation",
        }
    }

    /// 大文字小文字を区別せずに解析する
    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.trim().to_uppercase();
        Self::ALL.into_iter().find(|c| c.as_str() == upper)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 経費の承認ステータス
///
/// PENDING → APPROVED / PENDING → REJECTED のみ。遷移の判断はバックエンドが行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub const ALL: [ExpenseStatus; 3] = [
        ExpenseStatus::Pending,
        ExpenseStatus::Approved,
        ExpenseStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "PENDING",
            ExpenseStatus::Approved => "APPROVED",
            ExpenseStatus::Rejected => "REJECTED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "Pending",
            ExpenseStatus::Approved => "Approved",
            ExpenseStatus::Rejected => "Rejected",
        }
    }

    /// 大文字小文字を区別せずに解析する
    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.trim().to_uppercase();
        Self::ALL.into_iter().find(|s| s.as_str() == upper)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 経費に埋め込まれた申請者情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseOwner {
    #[serde(rename = "wissenID")]
    pub wissen_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 経費データモデル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ExpenseOwner>,
    /// 申請者のwissenID（`user`が埋め込まれていない場合に使われる）
    #[serde(rename = "wissenID", default, skip_serializing_if = "Option::is_none")]
    pub wissen_id: Option<UserId>,
    pub category: ExpenseCategory,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    /// 領収書の参照（URLまたはエンコード済みデータ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    pub status: ExpenseStatus,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// 申請者のwissenID
    pub fn owner_id(&self) -> Option<&UserId> {
        self.user
            .as_ref()
            .map(|owner| &owner.wissen_id)
            .or(self.wissen_id.as_ref())
    }

    /// 申請者の表示名
    pub fn owner_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|owner| owner.name.as_deref())
    }

    pub fn is_pending(&self) -> bool {
        self.status == ExpenseStatus::Pending
    }
}

impl Keyed for Expense {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

/// 経費作成用DTO
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseDto {
    pub user_id: UserId,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: String,
    pub receipt: String,
}

/// 経費更新時に送る内容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseChanges {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: String,
    pub receipt: String,
    pub status: ExpenseStatus,
}

/// 経費更新用DTO（バックエンドは`expense`キーで包んだ形を受け付ける）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateExpenseDto {
    pub expense: ExpenseChanges,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_deserialization() {
        let json = r#"{
            "id": 11,
            "user": {"wissenID": "W200", "name": "Arjun"},
            "category": "TRAVEL",
            "amount": 1250.75,
            "description": "Client visit",
            "receipt": "https://files.example.com/r/11.pdf",
            "status": "PENDING",
            "createdAt": "2024-05-02T08:15:00"
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.id, 11);
        assert_eq!(expense.category, ExpenseCategory::Travel);
        assert_eq!(expense.owner_id(), Some(&UserId::from("W200")));
        assert_eq!(expense.owner_name(), Some("Arjun"));
        assert!(expense.is_pending());
        assert!(expense.created_at.is_some());
    }

    #[test]
    fn test_expense_owner_falls_back_to_flat_id() {
        let json = r#"{"id":1,"wissenID":"W9","category":"VEHICLE","amount":10,"status":"APPROVED"}"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.owner_id(), Some(&UserId::from("W9")));
        assert_eq!(expense.owner_name(), None);
        assert!(expense.created_at.is_none());
    }

    #[test]
    fn test_unknown_category_or_status_is_rejected() {
        let bad_category = r#"{"id":1,"category":"FOOD","amount":1,"status":"PENDING"}"#;
        assert!(serde_json::from_str::<Expense>(bad_category).is_err());

        let bad_status = r#"{"id":1,"category":"TRAVEL","amount":1,"status":"DONE"}"#;
        assert!(serde_json::from_str::<Expense>(bad_status).is_err());
    }

    #[test]
    fn test_category_and_status_parse_case_insensitive() {
        assert_eq!(ExpenseCategory::parse("travel"), Some(ExpenseCategory::Travel));
        assert_eq!(
            ExpenseCategory::parse(" Accommodation "),
            Some(ExpenseCategory::Accommodation)
        );
        assert_eq!(ExpenseCategory::parse("food"), None);
        assert_eq!(ExpenseStatus::parse("Rejected"), Some(ExpenseStatus::Rejected));
        assert_eq!(ExpenseStatus::parse(""), None);
    }

    #[test]
    fn test_create_dto_serialization() {
        let dto = CreateExpenseDto {
            user_id: UserId::from("W100"),
            category: ExpenseCategory::Electronics,
            amount: 99.5,
            description: "Keyboard".to_string(),
            receipt: "https://files.example.com/r/1.png".to_string(),
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["userId"], "W100");
        assert_eq!(json["category"], "ELECTRONICS");
        assert_eq!(json["amount"], 99.5);
    }

    #[test]
    fn test_update_dto_is_wrapped() {
        let dto = UpdateExpenseDto {
            expense: ExpenseChanges {
                category: ExpenseCategory::Clothes,
                amount: 40.0,
                description: "Uniform".to_string(),
                receipt: "r.pdf".to_string(),
                status: ExpenseStatus::Pending,
            },
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["expense"]["category"], "CLOTHES");
        assert_eq!(json["expense"]["status"], "PENDING");
    }
}
