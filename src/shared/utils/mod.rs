use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

pub mod timestamp;

/// メールアドレスの簡易形式チェック用の正規表現
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("メールアドレスの正規表現が不正です")
});

/// 日付文字列のバリデーション
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn validate_date(date_str: &str) -> AppResult<NaiveDate> {
    if date_str.len() != 10
        || date_str.chars().nth(4) != Some('-')
        || date_str.chars().nth(7) != Some('-')
    {
        return Err(AppError::validation("Dates must use the YYYY-MM-DD format"));
    }

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("The date is not valid"))?;

    let year = date.year();
    if !(1900..=2100).contains(&year) {
        return Err(AppError::validation(
            "The date must be between 1900 and 2100",
        ));
    }

    Ok(date)
}

/// 金額入力のバリデーションと変換
///
/// # 引数
/// * `input` - フォームに入力された金額文字列
///
/// # 戻り値
/// 有効な場合は`f64`に変換した金額
///
/// # バリデーション規則
/// - 数値として解析できること
/// - 有限の正の数であること
pub fn parse_amount(input: &str) -> AppResult<f64> {
    let amount: f64 = input
        .trim()
        .parse()
        .map_err(|_| AppError::validation("Amount must be a number"))?;

    if !amount.is_finite() {
        return Err(AppError::validation("Amount must be a number"));
    }

    if amount <= 0.0 {
        return Err(AppError::validation("Amount must be greater than zero"));
    }

    Ok(amount)
}

/// 必須フィールドのバリデーション
pub fn validate_required_field(text: &str, message: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(())
}

/// メールアドレスの形式チェック
pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_PATTERN.is_match(email.trim()) {
        return Err(AppError::validation("Please enter a valid email address"));
    }
    Ok(())
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 金額を通知文面用にフォーマットする
///
/// 小数点以下が0の場合は整数として表示し、それ以外は最短表現で表示する
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{amount:.0}")
    } else {
        format!("{amount}")
    }
}
