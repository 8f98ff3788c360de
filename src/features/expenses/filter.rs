use crate::features::expenses::models::{Expense, ExpenseCategory, ExpenseStatus};
use std::cmp::Ordering;

/// 作成日時の並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// 古い順
    Ascending,
    /// 新しい順
    Descending,
}

impl DateOrder {
    /// 画面の選択肢から変換する（空文字や未知の値は`None`）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "old to new" | "asc" | "ascending" => Some(DateOrder::Ascending),
            "new to old" | "desc" | "descending" => Some(DateOrder::Descending),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateOrder::Ascending => "Old to new",
            DateOrder::Descending => "New to old",
        }
    }
}

/// 経費一覧の絞り込み条件
///
/// ステータスとカテゴリはAND条件。並び順を指定しない場合は元の順序を保つ。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub status: Option<ExpenseStatus>,
    pub category: Option<ExpenseCategory>,
    pub date_order: Option<DateOrder>,
}

impl ExpenseFilter {
    /// 画面の選択値（空文字は「すべて」）から作成する
    pub fn from_selection(status: &str, category: &str, date_order: &str) -> Self {
        Self {
            status: ExpenseStatus::parse(status),
            category: ExpenseCategory::parse(category),
            date_order: DateOrder::parse(date_order),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.category.is_none() && self.date_order.is_none()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        let status_match = self.status.map_or(true, |status| expense.status == status);
        let category_match = self
            .category
            .map_or(true, |category| expense.category == category);
        status_match && category_match
    }

    /// 絞り込みと並べ替えを適用した新しい一覧を返す
    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        let mut result: Vec<Expense> = expenses
            .iter()
            .filter(|expense| self.matches(expense))
            .cloned()
            .collect();

        if let Some(order) = self.date_order {
            // sort_byは安定ソート
            result.sort_by(|a, b| compare_created_at(a, b, order));
        }

        result
    }
}

/// 作成日時で比較する（日時のない経費は古い側に寄せる）
fn compare_created_at(a: &Expense, b: &Expense, order: DateOrder) -> Ordering {
    let ordering = a.created_at.cmp(&b.created_at);
    match order {
        DateOrder::Ascending => ordering,
        DateOrder::Descending => ordering.reverse(),
    }
}
