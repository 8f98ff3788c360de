use crate::features::expenses::models::{Expense, ExpenseCategory, ExpenseStatus};
use crate::features::notifications::models::CreateNotificationDto;
use crate::features::users::models::{User, UserId};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::format_amount;

/// 経費のステータス変更を申請者に知らせる通知の内容
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChangeNotice {
    Approved {
        category: ExpenseCategory,
        amount: f64,
    },
    Rejected {
        category: ExpenseCategory,
        amount: f64,
        reason: String,
        actor_name: String,
    },
}

impl StatusChangeNotice {
    pub fn approved(expense: &Expense) -> Self {
        StatusChangeNotice::Approved {
            category: expense.category,
            amount: expense.amount,
        }
    }

    pub fn rejected(expense: &Expense, reason: &str, actor: &User) -> Self {
        StatusChangeNotice::Rejected {
            category: expense.category,
            amount: expense.amount,
            reason: reason.to_string(),
            actor_name: actor.name.clone(),
        }
    }

    pub fn status(&self) -> ExpenseStatus {
        match self {
            StatusChangeNotice::Approved { .. } => ExpenseStatus::Approved,
            StatusChangeNotice::Rejected { .. } => ExpenseStatus::Rejected,
        }
    }

    /// 通知文面を組み立てる
    pub fn render(&self) -> String {
        match self {
            StatusChangeNotice::Approved { category, amount } => format!(
                "Your expense request for {category}. And amount {} has been approved.",
                format_amount(*amount)
            ),
            StatusChangeNotice::Rejected {
                category,
                amount,
                reason,
                actor_name,
            } => format!(
                "Your expense request for {category}. And amount {} has been rejected. Due to {reason}. By {actor_name}",
                format_amount(*amount)
            ),
        }
    }

    /// 通知作成APIに送る内容を作る
    ///
    /// # 引数
    /// * `expense` - 対象の経費（申請者のIDが必要）
    /// * `manager_id` - 操作したマネージャーのwissenID
    pub fn to_dto(&self, expense: &Expense, manager_id: &UserId) -> AppResult<CreateNotificationDto> {
        let user_id = expense.owner_id().cloned().ok_or_else(|| {
            AppError::validation(format!("Expense {} has no owner", expense.id))
        })?;

        Ok(CreateNotificationDto {
            message: self.render(),
            status: self.status(),
            user_id,
            manager_id: manager_id.clone(),
            expense_id: expense.id,
        })
    }
}
