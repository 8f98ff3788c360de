/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するコード（モデル、API呼び出し、画面の状態管理）
/// を含む自己完結型のユニットです。
pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod expenses;
pub mod notifications;
pub mod users;
