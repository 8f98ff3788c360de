//! 管理者向けダッシュボード
//!
//! ユーザー一覧の取得・検索と、ユーザーの作成・更新・削除を扱う。
pub mod banner;

pub use banner::{Banner, BannerKind, BANNER_DURATION};

use crate::features::auth::session::SessionContext;
use crate::features::users::form::UserForm;
use crate::features::users::models::{ProfileView, User, UserId};
use crate::features::users::search::{ManagerFilter, UserSearch};
use crate::shared::backend::ErsBackend;
use crate::shared::errors::{AppError, AppResult, ErrorSeverity};
use crate::shared::reconcile::{reconcile_in_place, Mutation};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub const SAVE_USER_FAILED: &str = "An error occurred while saving the user.";
pub const DELETE_USER_FAILED: &str = "Failed to delete user. Please try again.";

/// 管理者ダッシュボードの状態
pub struct AdminDashboard {
    backend: Arc<dyn ErsBackend>,
    session: SessionContext,
    admin: User,
    users: Vec<User>,
    search: UserSearch,
    filtered: Vec<User>,
    form: UserForm,
    banner: Option<Banner>,
    last_error: Option<String>,
    cancel: CancellationToken,
}

impl AdminDashboard {
    /// 管理者のセッションでダッシュボードを作成する
    pub fn new(backend: Arc<dyn ErsBackend>, session: SessionContext) -> AppResult<Self> {
        let admin = match session.current_user() {
            Some(user) if user.is_admin() => user,
            Some(user) => {
                warn!("管理者以外が管理画面を開こうとしました: wissen_id={}", user.wissen_id);
                return Err(AppError::session("管理者権限がありません"));
            }
            None => return Err(AppError::session("ログインしていません")),
        };

        Ok(Self {
            backend,
            session,
            admin,
            users: Vec::new(),
            search: UserSearch::default(),
            filtered: Vec::new(),
            form: UserForm::new(),
            banner: None,
            last_error: None,
            cancel: CancellationToken::new(),
        })
    }

    /// ユーザー一覧を取得する
    pub async fn load(&mut self) -> AppResult<()> {
        let backend = Arc::clone(&self.backend);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                info!("管理画面がアンマウントされたため取得結果を破棄します");
                return Err(AppError::Cancelled("admin dashboard unmounted".to_string()));
            }
            result = backend.fetch_users() => result,
        };

        match result {
            Ok(users) => {
                info!("ユーザー一覧を取得しました: count={}", users.len());
                self.users = users;
                self.refresh_filtered();
                Ok(())
            }
            Err(e) => {
                error!("ユーザー一覧の取得に失敗: {e}");
                Err(self.fail(e))
            }
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// 検索条件に一致するユーザー
    pub fn filtered_users(&self) -> &[User] {
        &self.filtered
    }

    pub fn search(&self) -> &UserSearch {
        &self.search
    }

    pub fn set_search_term<S: Into<String>>(&mut self, term: S) {
        self.search.term = term.into();
        self.refresh_filtered();
    }

    pub fn set_role_filter<S: Into<String>>(&mut self, role: S) {
        self.search.role = role.into();
        self.refresh_filtered();
    }

    pub fn set_manager_filter(&mut self, manager: ManagerFilter) {
        self.search.manager = manager;
        self.refresh_filtered();
    }

    fn refresh_filtered(&mut self) {
        self.filtered = self.search.apply(&self.users);
    }

    pub fn form(&self) -> &UserForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UserForm {
        &mut self.form
    }

    pub fn open_create_form(&mut self) {
        self.form = UserForm::new();
    }

    /// 一覧のユーザーを編集フォームに読み込む
    pub fn open_edit_form(&mut self, wissen_id: &UserId) -> AppResult<()> {
        match self.users.iter().find(|user| &user.wissen_id == wissen_id) {
            Some(user) => {
                self.form = UserForm::edit(user);
                Ok(())
            }
            None => Err(self.fail(AppError::not_found(format!("User {wissen_id}")))),
        }
    }

    /// フォームの内容でユーザーを作成または更新する
    ///
    /// 結果はバナーに表示し、成功した場合はフォームを初期状態に戻す
    pub async fn save_form(&mut self) -> AppResult<User> {
        let payload = match self.form.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.banner = Some(Banner::error(e.user_message()));
                return Err(e);
            }
        };

        let editing_key = self.form.editing().map(User::update_key);
        let result = match &editing_key {
            Some(key) => self.backend.update_user(key, &payload).await,
            None => self.backend.create_user(&payload).await,
        };

        match result {
            Ok(user) => {
                let (mutation, message) = match editing_key {
                    Some(_) => (Mutation::Replace(user.clone()), "User updated successfully!"),
                    None => (Mutation::Prepend(user.clone()), "User created successfully!"),
                };
                info!("ユーザーを保存しました: wissen_id={}", user.wissen_id);
                reconcile_in_place(&mut self.users, mutation);
                self.refresh_filtered();
                self.form.reset();
                self.banner = Some(Banner::success(message));
                Ok(user)
            }
            Err(e) => {
                error!("ユーザーの保存に失敗: {e}");
                let message = e.backend_message().unwrap_or(SAVE_USER_FAILED);
                self.banner = Some(Banner::error(message));
                Err(e)
            }
        }
    }

    /// 表示中のバナー
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// 表示時間を過ぎたバナーを閉じる
    pub fn dismiss_expired_banner(&mut self, now: Instant) {
        if self.banner.as_ref().is_some_and(|b| b.is_expired_at(now)) {
            self.banner = None;
        }
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// ユーザーを削除し、一覧を取得し直す
    pub async fn delete_user(&mut self, user: &User) -> AppResult<()> {
        let key = user.update_key();
        if let Err(e) = self.backend.delete_user(&key).await {
            error!("ユーザーの削除に失敗: key={key}, error={e}");
            self.last_error = Some(DELETE_USER_FAILED.to_string());
            return Err(e);
        }

        info!("ユーザーを削除しました: key={key}");
        self.load().await
    }

    /// 部下一覧を取得する（失敗した場合は空の一覧）
    pub async fn subordinates(&self, user: &User) -> Vec<User> {
        let key = user.update_key();
        match self.backend.fetch_subordinates(&key).await {
            Ok(subordinates) => subordinates,
            Err(e) => {
                warn!("部下一覧の取得に失敗しました: key={key}, error={e}");
                Vec::new()
            }
        }
    }

    /// 部下の詳細情報を取得する
    pub async fn reportee_info(&mut self, reportee_id: &UserId) -> AppResult<User> {
        self.backend
            .fetch_reportee_info(reportee_id)
            .await
            .map_err(|e| self.fail(e))
    }

    pub fn admin(&self) -> &User {
        &self.admin
    }

    pub fn profile(&self) -> ProfileView {
        ProfileView::for_admin(&self.admin)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn logout(&mut self) -> AppResult<()> {
        self.unmount();
        self.session.logout()
    }

    fn fail(&mut self, error: AppError) -> AppError {
        match error.severity() {
            ErrorSeverity::High => error!("{}", error.details()),
            ErrorSeverity::Medium => warn!("{}", error.details()),
            ErrorSeverity::Low => info!("{}", error.details()),
        }
        self.last_error = Some(error.user_message().to_string());
        error
    }
}
