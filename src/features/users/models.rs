use crate::shared::reconcile::Keyed;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 管理者ロールの値
pub const ADMIN_ROLE: &str = "ADMIN";

/// ユーザー識別子（バックエンドの`wissenID`）
///
/// バックエンドは文字列と数値のどちらでも返すことがあるため、常に文字列として保持する
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UserIdVisitor;

        impl<'de> de::Visitor<'de> for UserIdVisitor {
            type Value = UserId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a user identifier as string or integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<UserId, E> {
                if value.trim().is_empty() {
                    return Err(E::custom("user identifier must not be empty"));
                }
                Ok(UserId::new(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<UserId, E> {
                Ok(UserId::new(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<UserId, E> {
                Ok(UserId::new(value.to_string()))
            }
        }

        deserializer.deserialize_any(UserIdVisitor)
    }
}

/// ユーザー（セッションに保存されるログインユーザーもこの型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "wissenID")]
    pub wissen_id: UserId,
    /// バックエンド内部の数値ID（ユーザー更新APIで使用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub reportees: Vec<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<UserId>,
    #[serde(default, alias = "joiningDate", skip_serializing_if = "Option::is_none")]
    pub date_of_joining: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subordinate_ids: Vec<UserId>,
}

impl User {
    /// 管理者ロールかどうか
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// ユーザー更新APIのパスに使うキー（数値IDがなければwissenID）
    pub fn update_key(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.wissen_id.to_string())
    }
}

impl Keyed for User {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.wissen_id.clone()
    }
}

/// プロフィールダイアログに表示する内容
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub role: String,
}

impl ProfileView {
    /// 一般画面用（ロール未設定なら"User"）
    pub fn for_employee(user: &User) -> Self {
        Self::with_default_role(user, "User")
    }

    /// 管理画面用（ロール未設定なら"Admin"）
    pub fn for_admin(user: &User) -> Self {
        Self::with_default_role(user, "Admin")
    }

    fn with_default_role(user: &User, default_role: &str) -> Self {
        let role = if user.role.trim().is_empty() {
            default_role.to_string()
        } else {
            user.role.clone()
        };

        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            department: user.department.clone(),
            position: user.position.clone(),
            role,
        }
    }
}

/// ユーザー作成・更新APIに送るペイロード
///
/// キー名はバックエンドの受け付ける形式に合わせている
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub date_of_joining: String,
    pub role: String,
    pub manager_id: Option<String>,
    #[serde(rename = "is_Manager")]
    pub is_manager: bool,
    pub subordinate_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
