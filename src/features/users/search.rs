use crate::features::users::models::User;

/// マネージャーかどうかの絞り込み
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManagerFilter {
    #[default]
    All,
    Yes,
    No,
}

impl ManagerFilter {
    /// 画面の選択値（"Yes" / "No" / 空文字）から変換する
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "yes" | "true" => ManagerFilter::Yes,
            "no" | "false" => ManagerFilter::No,
            _ => ManagerFilter::All,
        }
    }

    fn matches(&self, user: &User) -> bool {
        match self {
            ManagerFilter::All => true,
            ManagerFilter::Yes => user.is_manager,
            ManagerFilter::No => !user.is_manager,
        }
    }
}

/// 管理画面のユーザー検索条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearch {
    pub term: String,
    pub role: String,
    pub manager: ManagerFilter,
}

impl UserSearch {
    /// 検索語・ロール・マネージャー条件をすべて満たすか
    pub fn matches(&self, user: &User) -> bool {
        self.matches_term(user) && self.matches_role(user) && self.manager.matches(user)
    }

    pub fn apply(&self, users: &[User]) -> Vec<User> {
        users.iter().filter(|user| self.matches(user)).cloned().collect()
    }

    /// 名前・メール・ロール・IDの部分一致（大文字小文字は区別しない）
    fn matches_term(&self, user: &User) -> bool {
        let term = self.term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        let numeric_id = user.id.map(|id| id.to_string());
        let found = [
            Some(user.name.as_str()),
            Some(user.email.as_str()),
            Some(user.role.as_str()),
            Some(user.wissen_id.as_str()),
            numeric_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term));
        found
    }

    fn matches_role(&self, user: &User) -> bool {
        let role = self.role.trim();
        role.is_empty() || user.role.eq_ignore_ascii_case(role)
    }
}
