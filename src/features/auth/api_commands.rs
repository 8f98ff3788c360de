//! ERSバックエンドのログインAPI
use crate::features::users::models::User;
use crate::shared::api_client::{with_query, ApiClient};
use crate::shared::errors::AppResult;
use log::{info, warn};

/// メールアドレスとパスワードでログインする
///
/// 認証情報が一致しない場合、バックエンドは空ボディか`null`を返すため`None`になる
pub async fn login(client: &ApiClient, email: &str, password: &str) -> AppResult<Option<User>> {
    let endpoint = with_query("/users/Login", &[("email", email), ("password", password)]);
    let user: Option<User> = client.get_optional(&endpoint).await.map_err(|e| {
        warn!("ログインAPIエラー: email={email}, error={e}");
        e
    })?;

    match &user {
        Some(user) => info!("ログイン成功: wissen_id={}", user.wissen_id),
        None => info!("ログイン失敗（認証情報不一致）: email={email}"),
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::backend::stub_server::StubServer;
    use crate::shared::errors::AppError;

    #[tokio::test]
    async fn test_login_sends_credentials_as_query() {
        let server = StubServer::start().await;
        server.respond(
            200,
            r#"{"wissenID":"W1","name":"Priya Nair","email":"priya+ers@example.com","role":"EMPLOYEE"}"#,
        );

        let user = login(&server.client(), "priya+ers@example.com", "p&ss word")
            .await
            .unwrap()
            .unwrap();

        let request = server.last_request();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path(), "/users/Login");
        assert_eq!(
            request.query(),
            vec![
                ("email".to_string(), "priya+ers@example.com".to_string()),
                ("password".to_string(), "p&ss word".to_string()),
            ]
        );
        assert_eq!(user.wissen_id.as_str(), "W1");
    }

    #[tokio::test]
    async fn test_login_mismatch_is_none() {
        let server = StubServer::start().await;
        server.respond(200, "").respond(200, "null");
        let client = server.client();

        assert!(login(&client, "a@example.com", "wrong").await.unwrap().is_none());
        assert!(login(&client, "a@example.com", "wrong").await.unwrap().is_none());
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_login_server_error_is_api_error() {
        let server = StubServer::start().await;
        server.respond(503, "");

        let error = login(&server.client(), "a@example.com", "pw").await.unwrap_err();
        assert!(matches!(error, AppError::Api { status: 503, .. }));
        assert_eq!(error.user_message(), "The server is currently unavailable.");
    }
}
