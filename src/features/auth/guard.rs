use crate::features::auth::session::SessionContext;
use crate::features::users::models::User;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/home";
pub const ADMIN_PATH: &str = "/admin";

/// 画面のルート
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// 未ログイン時のみ
    Login,
    /// ログイン済みなら誰でも
    Home,
    /// 管理者のみ（`/admin`と`/admin/*`）
    Admin,
    /// 上記以外
    Other(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = match path.len() {
            0 | 1 => path,
            _ => path.trim_end_matches('/'),
        };

        match path {
            LOGIN_PATH => Route::Login,
            HOME_PATH => Route::Home,
            _ if path == ADMIN_PATH || path.starts_with("/admin/") => Route::Admin,
            other => Route::Other(other.to_string()),
        }
    }
}

/// ルート判定の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// ログイン状態に応じた遷移先
pub fn landing_page(user: Option<&User>) -> &'static str {
    match user {
        Some(user) if user.is_admin() => ADMIN_PATH,
        Some(_) => HOME_PATH,
        None => LOGIN_PATH,
    }
}

/// ルートとユーザーから遷移可否を判定する
pub fn evaluate(route: &Route, user: Option<&User>) -> RouteDecision {
    match (route, user) {
        (Route::Login, None) => RouteDecision::Allow,
        (Route::Login, Some(_)) => RouteDecision::Redirect(landing_page(user)),
        (Route::Home, None) | (Route::Admin, None) => RouteDecision::Redirect(LOGIN_PATH),
        (Route::Home, Some(_)) => RouteDecision::Allow,
        (Route::Admin, Some(user)) if user.is_admin() => RouteDecision::Allow,
        (Route::Admin, Some(_)) => RouteDecision::Redirect(HOME_PATH),
        (Route::Other(_), _) => RouteDecision::Redirect(landing_page(user)),
    }
}

/// 現在のセッションでパスへの遷移を判定する
pub fn guard(path: &str, session: &SessionContext) -> RouteDecision {
    let user = session.current_user();
    let decision = evaluate(&Route::parse(path), user.as_ref());
    if let RouteDecision::Redirect(target) = decision {
        log::debug!("ルート判定: path={path} -> redirect={target}");
    }
    decision
}
