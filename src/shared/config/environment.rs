use crate::shared::errors::{AppError, AppResult};
use std::path::PathBuf;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    /// 変数名
    pub var_name: String,
    /// エラーメッセージ
    pub message: String,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "環境変数 {} が見つかりません: {}",
            self.var_name, self.message
        )
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する（優先順位: 起動時 > コンパイル時 > エラー）
///
/// # 取得順序
/// 1. 起動時の環境変数（`std::env::var`）
/// 2. コンパイル時の環境変数（`option_env!`マクロ、build.rsで埋め込まれたもの）
/// 3. どちらも見つからない場合はエラー
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        } else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をコンパイル時の環境変数から取得しました", $var_name);
            Ok(value.to_string())
        } else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: format!(
                    "起動時の環境変数 {} もコンパイル時の環境変数も見つかりませんでした",
                    $var_name
                ),
            })
        }
    }};
}

/// 環境変数を取得する（オプション版）
#[macro_export]
macro_rules! get_env_var_optional {
    ($var_name:expr) => {{
        $crate::get_env_var!($var_name).ok()
    }};
}

/// 環境変数を取得する（デフォルト値付き）
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| {
            log::debug!(
                "環境変数 {} が見つからないため、デフォルト値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// APIサーバーのデフォルトのベースURL
pub const DEFAULT_API_SERVER_URL: &str = "http://localhost:8080/api";

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = crate::get_env_var_optional!("LOG_LEVEL").unwrap_or_else(|| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            debug_mode,
            log_level,
        }
    }

    /// 開発環境かどうかを判定
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// ログレベル文字列を`log::LevelFilter`に変換する
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 環境変数 ENVIRONMENT を確認（起動時、次にコンパイル時）
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Some(env_var) = crate::get_env_var_optional!("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境変数の読み込みを行う
///
/// 開発環境（デバッグビルド）の場合のみ.envファイルを読み込む。
/// 本番環境では環境変数は実行時に設定されることを前提とする。
pub fn load_environment_variables() {
    if !cfg!(debug_assertions) {
        eprintln!("本番環境: 環境変数は実行時に設定されます");
        return;
    }

    match dotenv::dotenv() {
        Ok(path) => {
            eprintln!("環境ファイルを読み込みました: {}", path.display());
        }
        Err(e) => {
            eprintln!("環境ファイルの読み込みに失敗: {e}");
            eprintln!("環境変数が設定されていることを確認してください");
        }
    }
}

/// ログシステムを初期化する
///
/// 2回目以降の呼び出しは無視される（テストから複数回呼ばれても安全）
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let result = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(env_config.is_development())
        .format_target(false)
        .try_init();

    match result {
        Ok(()) => log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment
        ),
        Err(e) => log::debug!("ログシステムは初期化済みです: {e}"),
    }
}

/// 承認待ち一覧を集約する際の失敗時の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationPolicy {
    /// 1件でも取得に失敗したら全体を失敗とし、一覧は更新しない
    #[default]
    AllOrNothing,
    /// 取得できた分だけ反映し、失敗した部下IDを報告する
    BestEffort,
}

impl AggregationPolicy {
    /// 設定文字列から変換する（未知の値はAllOrNothing）
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "best-effort" | "best_effort" | "besteffort" => AggregationPolicy::BestEffort,
            _ => AggregationPolicy::AllOrNothing,
        }
    }
}

/// API設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// APIサーバーのベースURL
    pub base_url: String,
    /// APIリクエストのタイムアウト（秒）
    pub timeout_seconds: u64,
    /// 接続失敗時の最大リトライ回数（0でリトライなし）
    pub max_retries: u32,
    /// 承認待ち一覧の集約ポリシー
    pub aggregation_policy: AggregationPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_SERVER_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 0,
            aggregation_policy: AggregationPolicy::AllOrNothing,
        }
    }
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    pub fn from_env() -> Self {
        log::debug!("ApiConfig::from_env() - 環境変数の読み込みを開始");

        let base_url = crate::get_env_var_or_default!("API_SERVER_URL", DEFAULT_API_SERVER_URL)
            .trim_end_matches('/')
            .to_string();

        let timeout_seconds = crate::get_env_var_or_default!("API_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!(
                    "API_TIMEOUT_SECONDSのパースに失敗しました。デフォルト値30秒を使用します"
                );
                30
            });

        let max_retries = crate::get_env_var_or_default!("API_MAX_RETRIES", "0")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!("API_MAX_RETRIESのパースに失敗しました。リトライなしで動作します");
                0
            });

        let aggregation_policy = AggregationPolicy::parse(&crate::get_env_var_or_default!(
            "APPROVAL_AGGREGATION",
            "all-or-nothing"
        ));

        log::info!(
            "API設定: base_url={base_url}, timeout={timeout_seconds}s, max_retries={max_retries}, aggregation={aggregation_policy:?}"
        );

        Self {
            base_url,
            timeout_seconds,
            max_retries,
            aggregation_policy,
        }
    }

    /// 設定を検証する
    pub fn validate(&self) -> AppResult<()> {
        if self.base_url.is_empty() {
            return Err(AppError::configuration(
                "APIサーバーのベースURLが設定されていません",
            ));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            AppError::configuration(format!(
                "APIサーバーのベースURLが不正です: {} ({e})",
                self.base_url
            ))
        })?;

        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "APIタイムアウトは0より大きい値である必要があります",
            ));
        }

        Ok(())
    }

    /// APIサーバーがlocalhostかどうかを判定
    pub fn is_localhost(&self) -> bool {
        is_localhost_url(&self.base_url)
    }
}

/// URLがローカルホストを指しているかどうかを判定
pub fn is_localhost_url(url: &str) -> bool {
    url.contains("localhost") || url.contains("127.0.0.1")
}

/// セッションストアの設定
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// セッション情報を保存するJSONファイルのパス
    pub store_path: PathBuf,
}

impl SessionConfig {
    /// 環境変数からセッション設定を読み込む
    ///
    /// ERS_SESSION_FILE が未設定の場合はユーザーデータディレクトリ配下を使用する
    pub fn from_env() -> AppResult<Self> {
        if let Ok(path) = std::env::var("ERS_SESSION_FILE") {
            return Ok(Self {
                store_path: PathBuf::from(path),
            });
        }

        let data_dir = dirs::data_dir().ok_or_else(|| {
            AppError::configuration("ユーザーデータディレクトリを特定できませんでした")
        })?;

        Ok(Self {
            store_path: data_dir.join("ers-client").join("session.json"),
        })
    }
}
