use thiserror::Error;

/// クライアント全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー（フォーム入力など、バックエンドへの通信は発生しない）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// ログイン時に認証情報が一致しなかった場合のエラー
    #[error("認証エラー: {0}")]
    InvalidCredentials(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// APIサーバーが2xx以外のステータスを返した場合のエラー
    ///
    /// `message`はバックエンドが返したメッセージ。ボディに含まれない場合は`None`
    #[error("APIサーバーエラー: status={status}, code={code}, message={message:?}")]
    Api {
        status: u16,
        code: String,
        message: Option<String>,
    },

    /// APIサーバーへの接続エラー
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// レスポンスの型検証エラー
    #[error("レスポンス解析エラー: {0}")]
    Decode(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// セッションストア関連のエラー
    #[error("セッションエラー: {0}")]
    Session(String),

    /// 処理がキャンセルされた場合のエラー（画面のアンマウントなど）
    #[error("処理がキャンセルされました: {0}")]
    Cancelled(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
}

impl AppError {
    /// ユーザーに表示するためのメッセージを取得
    ///
    /// バリデーションエラーとAPIサーバーのエラーメッセージはそのまま表示する
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::InvalidCredentials(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Api { status, message, .. } => message
                .as_deref()
                .unwrap_or_else(|| fallback_api_message(*status)),
            AppError::Network(_) => "An error occurred. Please try again.",
            AppError::Decode(_) => "Unexpected response from the server.",
            AppError::Configuration(_) => "The client is not configured correctly.",
            AppError::Session(_) => "Your session could not be read. Please log in again.",
            AppError::Cancelled(_) => "The operation was cancelled.",
            AppError::Io(_) => "A local file operation failed.",
            AppError::Json(_) => "Unexpected data format.",
        }
    }

    /// バックエンドが返したエラーメッセージ（APIエラー以外や、メッセージがない場合は`None`）
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            AppError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// エラーの詳細情報を取得（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::InvalidCredentials(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Cancelled(_) => ErrorSeverity::Low,
            AppError::Api { .. } => ErrorSeverity::Medium,
            AppError::Network(_) => ErrorSeverity::Medium,
            AppError::Decode(_) => ErrorSeverity::Medium,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
            AppError::Session(_) => ErrorSeverity::High,
            AppError::Configuration(_) => ErrorSeverity::High,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{} was not found", resource.into()))
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// セッションエラーを作成するヘルパー関数
    pub fn session<S: Into<String>>(message: S) -> Self {
        AppError::Session(message.into())
    }

    /// レスポンス解析エラーを作成するヘルパー関数
    pub fn decode<S: Into<String>>(message: S) -> Self {
        AppError::Decode(message.into())
    }

    /// ネットワークエラーを作成するヘルパー関数
    pub fn network<S: Into<String>>(message: S) -> Self {
        AppError::Network(message.into())
    }
}

/// バックエンドがメッセージを返さなかった場合のステータス別メッセージ
fn fallback_api_message(status: u16) -> &'static str {
    match status {
        400 => "The request was not valid.",
        401 => "Authentication failed. Please log in again.",
        403 => "You are not allowed to perform this action.",
        404 => "The requested resource was not found.",
        409 => "The resource was changed by someone else.",
        413 => "The upload is too large.",
        415 => "The file type is not supported.",
        500 => "The server encountered an error.",
        502..=504 => "The server is currently unavailable.",
        _ => "An unexpected error occurred.",
    }
}

/// AppErrorからStringへの変換（画面層での表示用）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// reqwest::ErrorからAppErrorへの変換
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            AppError::Decode(error.to_string())
        } else {
            AppError::Network(error.to_string())
        }
    }
}

/// Result型のエイリアス（クライアント全体で使用）
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        assert_eq!(AppError::validation("テスト").severity(), ErrorSeverity::Low);
        assert_eq!(AppError::not_found("expense").severity(), ErrorSeverity::Low);
        assert_eq!(AppError::network("接続失敗").severity(), ErrorSeverity::Medium);
        assert_eq!(
            AppError::configuration("設定不正").severity(),
            ErrorSeverity::High
        );
    }

    #[test]
    fn test_user_message() {
        let validation_error = AppError::validation("All fields are required");
        assert_eq!(validation_error.user_message(), "All fields are required");

        let not_found_error = AppError::not_found("Expense 42");
        assert_eq!(not_found_error.user_message(), "Expense 42 was not found");

        // APIサーバーのメッセージはそのまま表示する
        let api_error = AppError::Api {
            status: 409,
            code: "CONFLICT".to_string(),
            message: Some("Email already exists".to_string()),
        };
        assert_eq!(api_error.user_message(), "Email already exists");
        assert_eq!(api_error.backend_message(), Some("Email already exists"));

        // メッセージのないAPIエラーはステータス別の文言を表示する
        let bare_api_error = AppError::Api {
            status: 502,
            code: "SERVICE_UNAVAILABLE".to_string(),
            message: None,
        };
        assert_eq!(
            bare_api_error.user_message(),
            "The server is currently unavailable."
        );
        assert_eq!(bare_api_error.backend_message(), None);
        assert_eq!(AppError::validation("x").backend_message(), None);

        let network_error = AppError::network("connection refused");
        assert_eq!(
            network_error.user_message(),
            "An error occurred. Please try again."
        );
    }

    #[test]
    fn test_string_conversion() {
        let error = AppError::validation("File size must be less than 5MB");
        let error_string: String = error.into();
        assert_eq!(error_string, "File size must be less than 5MB");
    }

    #[test]
    fn test_error_details() {
        let error = AppError::decode("missing field `id`");
        assert!(error.details().contains("missing field `id`"));
    }
}
