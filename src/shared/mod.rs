/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// 汎用APIクライアント
pub mod api_client;

/// バックエンド呼び出しの抽象化
pub mod backend;

/// コレクションへの変更反映
pub mod reconcile;

/// 共有ユーティリティ関数
pub mod utils;

// 便利な再エクスポート
pub use config::{
    get_environment, initialize_client, initialize_logging_system, load_environment_variables,
    AggregationPolicy, ApiConfig, Environment, EnvironmentConfig, InitializationResult,
    SessionConfig,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
