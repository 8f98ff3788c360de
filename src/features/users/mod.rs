/// ユーザー機能のモジュール
pub mod api_commands;
pub mod form;
pub mod models;
pub mod search;

pub use form::UserForm;
pub use models::*;
pub use search::{ManagerFilter, UserSearch};
