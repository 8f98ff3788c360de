use crate::features::auth::session::{FileSessionStorage, SessionContext};
use crate::shared::api_client::{ApiClient, ApiClientConfig};
use crate::shared::config::environment::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment, SessionConfig,
};
use crate::shared::errors::AppResult;
use std::path::PathBuf;
use std::sync::Arc;

/// クライアント初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 実行環境
    pub environment: Environment,
    /// 検証済みのAPI設定
    pub api_config: ApiConfig,
    /// バックエンドと通信するクライアント
    pub api_client: ApiClient,
    /// 保存済みのセッションから復元したセッション
    pub session: SessionContext,
    /// セッションファイルのパス
    pub session_path: PathBuf,
}

/// クライアントの初期化を実行する
///
/// # 処理内容
/// 1. 環境変数の読み込み（開発環境では.envファイル）
/// 2. ログシステムの初期化
/// 3. API設定とセッション設定の読み込み
/// 4. APIクライアントとセッションの作成
pub fn initialize_client() -> AppResult<InitializationResult> {
    load_environment_variables();
    initialize_logging_system();

    let environment = get_environment();
    log::info!("クライアント初期化を開始します: environment={environment:?}");

    let result = initialize_with(environment, ApiConfig::from_env(), SessionConfig::from_env()?)?;
    log_initialization_complete(&result);
    Ok(result)
}

/// 読み込み済みの設定からクライアントを組み立てる
pub fn initialize_with(
    environment: Environment,
    api_config: ApiConfig,
    session_config: SessionConfig,
) -> AppResult<InitializationResult> {
    api_config.validate()?;

    let api_client = ApiClient::new_with_config(ApiClientConfig::from(&api_config))?;

    let session_path = session_config.store_path;
    let storage = FileSessionStorage::new(session_path.clone());
    let session = SessionContext::restore(Arc::new(storage));

    Ok(InitializationResult {
        environment,
        api_config,
        api_client,
        session,
        session_path,
    })
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    log::info!("=== 初期化完了 ===");
    log::info!("環境: {:?}", result.environment);
    log::info!("APIサーバー: {}", result.api_client.base_url());
    log::info!("セッションファイル: {:?}", result.session_path);
    match result.session.current_user() {
        Some(user) => log::info!("保存済みセッションを復元しました: user={}", user.wissen_id),
        None => log::info!("保存済みセッションはありません"),
    }
}
