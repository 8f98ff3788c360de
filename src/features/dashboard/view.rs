use crate::features::expenses::models::Expense;

/// ダッシュボードのタブ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardTab {
    /// 自分の申請
    #[default]
    Requests,
    /// 部下の申請の承認（マネージャーのみ）
    Approvals,
}

impl DashboardTab {
    pub fn title(&self) -> &'static str {
        match self {
            DashboardTab::Requests => "My Requests",
            DashboardTab::Approvals => "Approve Requests",
        }
    }

    /// ユーザーが選択できるタブ
    pub fn available(is_manager: bool) -> Vec<DashboardTab> {
        if is_manager {
            vec![DashboardTab::Requests, DashboardTab::Approvals]
        } else {
            vec![DashboardTab::Requests]
        }
    }
}

/// 経費カードに表示する操作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardActions {
    pub approve: bool,
    pub reject: bool,
    pub edit: bool,
    pub delete: bool,
}

/// カードが表示されているタブに応じて操作を決める
///
/// 承認タブでは承認待ちの経費にだけ承認・却下を出し、自分の申請には編集・削除を出す
pub fn card_actions(expense: &Expense, tab: DashboardTab) -> CardActions {
    match tab {
        DashboardTab::Approvals => CardActions {
            approve: expense.is_pending(),
            reject: expense.is_pending(),
            ..Default::default()
        },
        DashboardTab::Requests => CardActions {
            edit: true,
            delete: true,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expenses::models::ExpenseStatus;
    use crate::shared::backend::fake;

    #[test]
    fn test_card_actions() {
        let pending = fake::expense(1, "W2", ExpenseStatus::Pending, "");
        let approved = fake::expense(2, "W2", ExpenseStatus::Approved, "");

        let actions = card_actions(&pending, DashboardTab::Approvals);
        assert!(actions.approve && actions.reject);
        assert!(!actions.edit && !actions.delete);

        assert_eq!(
            card_actions(&approved, DashboardTab::Approvals),
            CardActions::default()
        );

        let own = card_actions(&approved, DashboardTab::Requests);
        assert!(own.edit && own.delete && !own.approve);
    }

    #[test]
    fn test_available_tabs() {
        assert_eq!(DashboardTab::available(false), vec![DashboardTab::Requests]);
        assert_eq!(DashboardTab::available(true).len(), 2);
        assert_eq!(DashboardTab::Approvals.title(), "Approve Requests");
    }
}
