/// 経費機能モジュール
///
/// このモジュールは経費に関連する機能を提供します：
/// - 経費・カテゴリ・ステータスのデータモデル
/// - バックエンドの経費APIの呼び出し
/// - 一覧の絞り込みと並べ替え
/// - 申請・編集フォームの状態管理とバリデーション
pub mod api_commands;
pub mod filter;
pub mod form;
pub mod models;

pub use filter::{DateOrder, ExpenseFilter};
pub use form::{ExpenseDraft, ExpenseForm, FormMode, FormState, ReceiptAttachment};
pub use models::{
    CreateExpenseDto, Expense, ExpenseCategory, ExpenseChanges, ExpenseOwner, ExpenseStatus,
    UpdateExpenseDto,
};
