//! 経費の申請・編集フォーム
//!
//! フォームは通信を行わない。確定時に作成用か更新用のコールバックの
//! どちらか一方だけを呼び出し、実際の送信は呼び出し側が行う。
use crate::features::expenses::models::{Expense, ExpenseCategory, ExpenseStatus};
use crate::shared::api_client::{content_type_for, UploadFile};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{format_amount, normalize_string, parse_amount};

/// 領収書ファイルの上限サイズ（5MB）
pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;

/// 受け付ける領収書のContent-Type
pub const ALLOWED_RECEIPT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const INVALID_RECEIPT_TYPE: &str = "Please upload a PDF, JPEG, or PNG file";
pub const RECEIPT_TOO_LARGE: &str = "File size must be less than 5MB";
pub const INVALID_CATEGORY: &str = "Please select a valid category";

/// フォームに添付された領収書
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptAttachment {
    /// 新しく選択したファイル（送信前にアップロードが必要）
    Upload(UploadFile),
    /// 既存の経費に登録済みの領収書の参照
    Existing(String),
}

/// 確定済みの入力内容
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: String,
    pub receipt: ReceiptAttachment,
    /// 編集時は元の経費のステータスを引き継ぐ
    pub status: Option<ExpenseStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Empty,
    Validating,
    Confirming,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit {
        expense_id: i64,
        status: ExpenseStatus,
    },
}

/// 経費フォームの状態
#[derive(Debug, Clone)]
pub struct ExpenseForm {
    mode: FormMode,
    amount: String,
    category: String,
    description: String,
    receipt: Option<ReceiptAttachment>,
    state: FormState,
    error: Option<String>,
    draft: Option<ExpenseDraft>,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

/// 領収書ファイルの形式とサイズをチェックする
pub fn validate_receipt(file: &UploadFile) -> AppResult<()> {
    let content_type = if file.content_type.trim().is_empty() {
        content_type_for(&file.file_name)
    } else {
        file.content_type.trim().to_lowercase()
    };

    if !ALLOWED_RECEIPT_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::validation(INVALID_RECEIPT_TYPE));
    }

    if file.bytes.len() > MAX_RECEIPT_BYTES {
        return Err(AppError::validation(RECEIPT_TOO_LARGE));
    }

    Ok(())
}

impl ExpenseForm {
    /// 新規申請用の空のフォーム
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            amount: String::new(),
            category: String::new(),
            description: String::new(),
            receipt: None,
            state: FormState::Empty,
            error: None,
            draft: None,
        }
    }

    /// 既存の経費を編集するフォーム
    pub fn edit(expense: &Expense) -> Self {
        Self {
            mode: FormMode::Edit {
                expense_id: expense.id,
                status: expense.status,
            },
            amount: format_amount(expense.amount),
            category: expense.category.label().to_string(),
            description: expense.description.clone(),
            receipt: expense
                .receipt
                .clone()
                .filter(|r| !r.trim().is_empty())
                .map(ReceiptAttachment::Existing),
            ..Self::new()
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn receipt(&self) -> Option<&ReceiptAttachment> {
        self.receipt.as_ref()
    }

    pub fn set_amount<S: Into<String>>(&mut self, amount: S) {
        self.amount = amount.into();
        self.reopen();
    }

    pub fn set_category<S: Into<String>>(&mut self, category: S) {
        self.category = category.into();
        self.reopen();
    }

    pub fn set_description<S: Into<String>>(&mut self, description: S) {
        self.description = description.into();
        self.reopen();
    }

    /// 領収書ファイルを選択する
    ///
    /// 形式かサイズが不正な場合はエラーを記録し、ファイルは保持しない
    pub fn select_receipt(&mut self, file: UploadFile) -> AppResult<()> {
        if let Err(e) = validate_receipt(&file) {
            log::debug!("領収書ファイルを拒否しました: file_name={}, error={e}", file.file_name);
            self.error = Some(e.user_message().to_string());
            return Err(e);
        }

        self.error = None;
        self.receipt = Some(ReceiptAttachment::Upload(file));
        self.reopen();
        Ok(())
    }

    /// 入力内容を検証し、確認待ちに進む
    pub fn submit(&mut self) -> AppResult<()> {
        self.state = FormState::Validating;
        match self.validate() {
            Ok(draft) => {
                self.error = None;
                self.draft = Some(draft);
                self.state = FormState::Confirming;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message().to_string());
                self.draft = None;
                self.state = FormState::Empty;
                Err(e)
            }
        }
    }

    /// 確認をキャンセルして入力に戻る
    pub fn cancel(&mut self) {
        if self.state == FormState::Confirming {
            self.draft = None;
            self.state = FormState::Empty;
        }
    }

    /// 確認を確定し、モードに応じたコールバックを1つだけ呼び出す
    pub fn confirm<C, U>(&mut self, on_create: C, on_update: U) -> AppResult<()>
    where
        C: FnOnce(ExpenseDraft),
        U: FnOnce(i64, ExpenseDraft),
    {
        if self.state != FormState::Confirming {
            return Err(AppError::validation("There is nothing to confirm"));
        }
        let draft = self
            .draft
            .take()
            .ok_or_else(|| AppError::validation("There is nothing to confirm"))?;

        match self.mode {
            FormMode::Create => on_create(draft),
            FormMode::Edit { expense_id, .. } => on_update(expense_id, draft),
        }
        self.state = FormState::Submitted;
        Ok(())
    }

    fn reopen(&mut self) {
        if matches!(self.state, FormState::Confirming | FormState::Submitted) {
            self.draft = None;
            self.state = FormState::Empty;
        }
    }

    fn validate(&self) -> AppResult<ExpenseDraft> {
        let receipt = match &self.receipt {
            Some(receipt)
                if !self.amount.trim().is_empty()
                    && !self.category.trim().is_empty()
                    && !self.description.trim().is_empty() =>
            {
                receipt.clone()
            }
            _ => return Err(AppError::validation(ALL_FIELDS_REQUIRED)),
        };

        let amount = parse_amount(&self.amount)?;
        let category = ExpenseCategory::parse(&self.category)
            .ok_or_else(|| AppError::validation(INVALID_CATEGORY))?;

        match &receipt {
            ReceiptAttachment::Upload(file) => validate_receipt(file)?,
            ReceiptAttachment::Existing(reference) if reference.trim().is_empty() => {
                return Err(AppError::validation(ALL_FIELDS_REQUIRED));
            }
            ReceiptAttachment::Existing(_) => {}
        }

        let status = match self.mode {
            FormMode::Create => None,
            FormMode::Edit { status, .. } => Some(status),
        };

        Ok(ExpenseDraft {
            category,
            amount,
            description: normalize_string(&self.description),
            receipt,
            status,
        })
    }
}
