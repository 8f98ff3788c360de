//! 経費精算システム（ERS）のクライアントコア
//!
//! 画面に依存しない状態管理とバックエンドとの通信をまとめたライブラリ。
//! 画面側は`initialize_client()`の結果からセッションとAPIクライアントを受け取り、
//! `Dashboard`や`AdminDashboard`を操作して描画する。
pub mod features;
pub mod shared;

pub use features::admin::AdminDashboard;
pub use features::auth::{AuthService, LoginForm, LoginOutcome, RouteDecision, SessionContext};
pub use features::dashboard::{Dashboard, DashboardTab};
pub use shared::api_client::ApiClient;
pub use shared::backend::ErsBackend;
pub use shared::config::{initialize_client, AggregationPolicy, InitializationResult};
pub use shared::errors::{AppError, AppResult};
