//! 汎用APIクライアント
//!
//! ERSバックエンドとの通信を行う汎用的なクライアント。
//! エンドポイントごとの呼び出しは各機能モジュールの`api_commands`にある。
use crate::shared::config::environment::{is_localhost_url, ApiConfig};
use crate::shared::errors::AppError;
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// リトライ間隔の上限（秒）
pub const MAX_BACKOFF_SECS: u64 = 30;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let api_config = ApiConfig::default();
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
            max_retries: api_config.max_retries,
        }
    }
}

impl ApiClientConfig {
    /// 環境設定からAPIクライアント設定を作成
    pub fn from_env() -> Self {
        Self::from(&ApiConfig::from_env())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(api_config: &ApiConfig) -> Self {
        Self {
            base_url: api_config.base_url.clone(),
            timeout_seconds: api_config.timeout_seconds,
            max_retries: api_config.max_retries,
        }
    }
}

/// APIサーバーからのエラーレスポンス
///
/// バックエンドは `{"message": "...", "error": "...", "status": 400}` 形式で返す。
/// どのフィールドも欠けている可能性がある。
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub error: Option<String>,
    pub status: Option<u16>,
}

/// アップロードするファイル
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 汎用APIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// 環境設定から新しいAPIクライアントを作成
    pub fn new() -> Result<Self, AppError> {
        let config = ApiClientConfig::from_env();
        Self::new_with_config(config)
    }

    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiClientConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_seconds));
        // ローカルのAPIサーバーにはプロキシを経由しない
        if is_localhost_url(&config.base_url) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// ベースURLを取得
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// エンドポイントから完全なURLを組み立てる
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url)
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");
        let request = self.client.get(self.url(endpoint));
        let body = self.send_request_with_retry(request, "GET", endpoint).await?;
        decode_body(&body, endpoint)
    }

    /// GETリクエストを送信（空ボディや`null`を`None`として扱う）
    pub async fn get_optional<T>(&self, endpoint: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");
        let request = self.client.get(self.url(endpoint));
        let body = self.send_request_with_retry(request, "GET", endpoint).await?;
        if body.trim().is_empty() {
            debug!("空のレスポンスを受信: endpoint={endpoint}");
            return Ok(None);
        }
        decode_body::<Option<T>>(&body, endpoint)
    }

    /// POSTリクエストを送信
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");
        let request = self.client.post(self.url(endpoint)).json(body);
        let body = self.send_request_with_retry(request, "POST", endpoint).await?;
        decode_body(&body, endpoint)
    }

    /// PUTリクエストを送信
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PUTリクエスト送信: endpoint={endpoint}");
        let request = self.client.put(self.url(endpoint)).json(body);
        let body = self.send_request_with_retry(request, "PUT", endpoint).await?;
        decode_body(&body, endpoint)
    }

    /// ボディなしのPUTリクエストを送信（パラメータはすべてクエリ文字列）
    pub async fn put_without_body<T>(&self, endpoint: &str) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!("PUTリクエスト送信: endpoint={endpoint}");
        let request = self.client.put(self.url(endpoint));
        let body = self.send_request_with_retry(request, "PUT", endpoint).await?;
        decode_body(&body, endpoint)
    }

    /// DELETEリクエストを送信
    ///
    /// レスポンスボディは読み捨て、成功ステータスのみチェックする
    pub async fn delete(&self, endpoint: &str) -> Result<(), AppError> {
        info!("DELETEリクエスト送信: endpoint={endpoint}");
        let request = self.client.delete(self.url(endpoint));
        self.send_request_with_retry(request, "DELETE", endpoint)
            .await
            .map(|_| ())
    }

    /// ファイルをマルチパートでアップロードし、レスポンスボディを文字列で返す
    pub async fn upload(&self, endpoint: &str, file: &UploadFile) -> Result<String, AppError> {
        info!(
            "ファイルアップロード開始: endpoint={endpoint}, file_name={}, size={}",
            file.file_name,
            file.bytes.len()
        );

        // マルチパートフォームはクローンできないため、リトライごとに再作成する
        let mut attempts = 0;
        loop {
            let part = multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| AppError::validation(format!("Invalid content type: {e}")))?;
            let form = multipart::Form::new().part("file", part);

            match self
                .client
                .post(self.url(endpoint))
                .multipart(form)
                .send()
                .await
            {
                Ok(response) => return self.read_response(response, "POST", endpoint).await,
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        self.wait_before_retry(attempts).await;
                        continue;
                    }
                    warn!("アップロード失敗: endpoint={endpoint}, error={e}");
                    return Err(AppError::network(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    /// リトライ機能付きでリクエストを送信し、成功時はレスポンスボディを返す
    ///
    /// リトライは接続エラーのみが対象。ステータスエラーは即座に返す。
    async fn send_request_with_retry(
        &self,
        request: RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> Result<String, AppError> {
        let mut attempts = 0;
        loop {
            let cloned_request = request.try_clone().ok_or_else(|| {
                AppError::network("リクエストのクローンに失敗しました".to_string())
            })?;

            match cloned_request.send().await {
                Ok(response) => return self.read_response(response, method, endpoint).await,
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        self.wait_before_retry(attempts).await;
                        continue;
                    }
                    warn!("{method}リクエスト失敗: endpoint={endpoint}, error={e}");
                    return Err(AppError::network(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    async fn wait_before_retry(&self, attempts: u32) {
        let delay = backoff_delay(attempts);
        warn!(
            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
            self.config.max_retries
        );
        tokio::time::sleep(delay).await;
    }

    async fn read_response(
        &self,
        response: Response,
        method: &str,
        endpoint: &str,
    ) -> Result<String, AppError> {
        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let body = response.text().await.map_err(AppError::from)?;
        info!("{method}リクエスト成功: endpoint={endpoint}");
        Ok(body)
    }

    /// エラーレスポンスを`AppError::Api`に変換する
    async fn handle_error_response(&self, response: Response) -> AppError {
        let status_code = response.status().as_u16();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        let error = api_error_from_body(status_code, &response_text);
        warn!("APIサーバーからエラーレスポンス: status={status_code}, body={response_text}");
        error
    }
}

/// 指数バックオフの待ち時間（`MAX_BACKOFF_SECS`で頭打ち）
pub(crate) fn backoff_delay(attempts: u32) -> Duration {
    let secs = 2_u64
        .checked_pow(attempts)
        .unwrap_or(u64::MAX)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

/// レスポンスボディを型付きで検証する
pub(crate) fn decode_body<T>(body: &str, endpoint: &str) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        warn!("レスポンスの型検証に失敗: endpoint={endpoint}, error={e}");
        AppError::decode(format!("{endpoint}: {e}"))
    })
}

/// ステータスコードとレスポンスボディからAPIエラーを組み立てる
pub(crate) fn api_error_from_body(status_code: u16, body: &str) -> AppError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).unwrap_or_default();

    let code = match status_code {
        400 => "BAD_REQUEST",
        401 => "UNAUTHORIZED",
        403 => "FORBIDDEN",
        404 => "NOT_FOUND",
        409 => "CONFLICT",
        413 => "PAYLOAD_TOO_LARGE",
        415 => "UNSUPPORTED_MEDIA_TYPE",
        500 => "INTERNAL_SERVER_ERROR",
        502..=504 => "SERVICE_UNAVAILABLE",
        _ => "UNKNOWN_ERROR",
    };

    AppError::Api {
        status: status_code,
        code: code.to_string(),
        message: parsed.message.filter(|m| !m.trim().is_empty()),
    }
}

/// パスにパーセントエンコードしたクエリを付ける
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

/// ファイル名からContent-Typeを推定する
pub fn content_type_for(file_name: &str) -> String {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "pdf" => "application/pdf",
        "gif" => "image/gif",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}
