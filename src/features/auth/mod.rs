/// 認証機能のモジュール
pub mod api_commands;
pub mod guard;
pub mod service;
pub mod session;

pub use guard::*;
pub use service::*;
pub use session::*;
