/// 通知機能のモジュール
pub mod api_commands;
pub mod models;
pub mod pagination;
pub mod template;

pub use models::*;
pub use pagination::NotificationPager;
pub use template::StatusChangeNotice;
