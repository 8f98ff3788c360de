use crate::features::users::models::{User, UserPayload};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{normalize_string, validate_date, validate_email, validate_required_field};

/// 管理画面のユーザー作成・編集フォーム
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserForm {
    /// 編集中のユーザー（新規作成時は`None`）
    editing: Option<User>,
    pub full_name: String,
    pub email: String,
    /// YYYY-MM-DD形式
    pub joining_date: String,
    pub role: String,
    pub manager_id: String,
    /// "Yes" / "No"
    pub is_manager: String,
    /// カンマ区切りの部下ID
    pub subordinates: String,
    /// 新規作成時のみ使用
    pub password: String,
}

impl UserForm {
    pub fn new() -> Self {
        Self {
            is_manager: "No".to_string(),
            ..Default::default()
        }
    }

    /// 既存ユーザーの値を入れた編集フォーム
    pub fn edit(user: &User) -> Self {
        Self {
            editing: Some(user.clone()),
            full_name: user.name.clone(),
            email: user.email.clone(),
            joining_date: user
                .date_of_joining
                .as_deref()
                .map(|date| date.chars().take(10).collect())
                .unwrap_or_default(),
            role: user.role.clone(),
            manager_id: user
                .manager_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            is_manager: if user.is_manager { "Yes" } else { "No" }.to_string(),
            subordinates: user
                .subordinate_ids
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            password: String::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing(&self) -> Option<&User> {
        self.editing.as_ref()
    }

    /// 入力内容を初期状態に戻す
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 入力内容を検証し、APIに送るペイロードを作る
    pub fn to_payload(&self) -> AppResult<UserPayload> {
        validate_required_field(&self.full_name, "Full name is required")?;
        validate_required_field(&self.email, "Email is required")?;
        validate_email(&self.email)?;
        validate_required_field(&self.joining_date, "Joining date is required")?;
        validate_date(self.joining_date.trim())?;
        validate_required_field(&self.role, "Role is required")?;

        let password = if self.is_editing() {
            None
        } else {
            if self.password.is_empty() {
                return Err(AppError::validation("Password is required"));
            }
            Some(self.password.clone())
        };

        let manager_id = Some(normalize_string(&self.manager_id)).filter(|id| !id.is_empty());
        let subordinate_ids = self
            .subordinates
            .split(',')
            .map(normalize_string)
            .filter(|id| !id.is_empty())
            .collect();

        Ok(UserPayload {
            name: normalize_string(&self.full_name),
            email: normalize_string(&self.email),
            date_of_joining: normalize_string(&self.joining_date),
            role: normalize_string(&self.role),
            manager_id,
            is_manager: self.is_manager.trim().eq_ignore_ascii_case("yes"),
            subordinate_ids,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserId;
    use crate::shared::backend::fake;

    fn filled() -> UserForm {
        UserForm {
            full_name: " Maya Rao ".to_string(),
            email: "maya@example.com".to_string(),
            joining_date: "2024-01-15".to_string(),
            role: "EMPLOYEE".to_string(),
            manager_id: String::new(),
            is_manager: "Yes".to_string(),
            subordinates: "W200, W300 ,,".to_string(),
            password: "secret".to_string(),
            ..UserForm::new()
        }
    }

    #[test]
    fn test_create_payload() {
        let payload = filled().to_payload().unwrap();
        assert_eq!(payload.name, "Maya Rao");
        assert_eq!(payload.manager_id, None);
        assert!(payload.is_manager);
        assert_eq!(payload.subordinate_ids, vec!["W200", "W300"]);
        assert_eq!(payload.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_create_requires_password() {
        let mut form = filled();
        form.password.clear();
        let error = form.to_payload().unwrap_err();
        assert_eq!(error.user_message(), "Password is required");
    }

    #[test]
    fn test_invalid_inputs() {
        let mut form = filled();
        form.email = "not-an-email".to_string();
        assert!(form.to_payload().is_err());

        let mut form = filled();
        form.joining_date = "15/01/2024".to_string();
        assert!(form.to_payload().is_err());

        let mut form = filled();
        form.full_name = "  ".to_string();
        assert_eq!(
            form.to_payload().unwrap_err().user_message(),
            "Full name is required"
        );
    }

    #[test]
    fn test_edit_prefills_and_omits_password() {
        let mut user = fake::user("W100", "Maya Rao", "EMPLOYEE", &["W200"]);
        user.date_of_joining = Some("2023-04-01T00:00:00".to_string());
        user.manager_id = Some(UserId::from("W1"));
        user.subordinate_ids = vec![UserId::from("W200"), UserId::from("W300")];

        let form = UserForm::edit(&user);
        assert!(form.is_editing());
        assert_eq!(form.joining_date, "2023-04-01");
        assert_eq!(form.is_manager, "Yes");
        assert_eq!(form.subordinates, "W200, W300");

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.manager_id.as_deref(), Some("W1"));
        assert_eq!(payload.password, None);
    }

    #[test]
    fn test_reset() {
        let mut form = UserForm::edit(&fake::user("W1", "Maya", "EMPLOYEE", &[]));
        form.reset();
        assert!(!form.is_editing());
        assert_eq!(form.is_manager, "No");
        assert!(form.full_name.is_empty());
    }
}
