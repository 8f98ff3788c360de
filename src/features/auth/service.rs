//! ログイン・ログアウトを扱う認証サービス
//!
//! 認証自体はバックエンドが行い、クライアントは入力チェックと
//! セッションへの保存だけを担当する。
use crate::features::auth::guard::landing_page;
use crate::features::auth::session::SessionContext;
use crate::features::users::models::User;
use crate::shared::backend::ErsBackend;
use crate::shared::errors::{AppError, AppResult};
use std::sync::Arc;

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// ログインフォームの入力
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// ログインフォームの項目ごとのエラー
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl LoginErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

impl LoginForm {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// 必須項目をチェックする
    pub fn field_errors(&self) -> LoginErrors {
        LoginErrors {
            email: self.email.trim().is_empty().then_some(EMAIL_REQUIRED),
            password: self.password.is_empty().then_some(PASSWORD_REQUIRED),
        }
    }
}

/// ログイン成功時の結果
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: User,
    /// ロールに応じた遷移先
    pub landing_page: &'static str,
}

pub struct AuthService {
    backend: Arc<dyn ErsBackend>,
    session: SessionContext,
}

impl AuthService {
    pub fn new(backend: Arc<dyn ErsBackend>, session: SessionContext) -> Self {
        Self { backend, session }
    }

    /// ログインする
    ///
    /// 入力エラーの場合はバックエンドを呼ばずに`AppError::Validation`を返す
    pub async fn login(&self, form: &LoginForm) -> AppResult<LoginOutcome> {
        let errors = form.field_errors();
        if let Some(message) = errors.email.or(errors.password) {
            return Err(AppError::validation(message));
        }

        let email = form.email.trim();
        let user = match self.backend.login(email, &form.password).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                log::warn!("ログイン失敗: email={email}");
                return Err(AppError::InvalidCredentials(INVALID_CREDENTIALS.to_string()));
            }
            Err(e) => {
                log::error!("ログイン処理エラー: {e}");
                return Err(AppError::network(e.to_string()));
            }
        };

        self.session.sign_in(user.clone())?;
        let landing_page = landing_page(Some(&user));
        log::info!(
            "ログインしました: wissen_id={}, landing_page={landing_page}",
            user.wissen_id
        );

        Ok(LoginOutcome { user, landing_page })
    }

    pub fn logout(&self) -> AppResult<()> {
        self.session.logout()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}
