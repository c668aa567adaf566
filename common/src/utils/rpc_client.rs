use anyhow::Error;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::trace;

const JSONRPC_VERSION: &str = "2.0";

#[derive(Serialize)]
struct JwtClaims {
    iat: u64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC 2.0 client over HTTP.
///
/// When constructed with a JWT secret every request carries an Engine API style
/// `Authorization: Bearer` header. The token is minted per request, so its `iat`
/// claim always stays inside the server's allowed clock drift.
pub struct JSONRPCClient {
    client: Client,
    url: Url,
    jwt_secret: Option<[u8; 32]>,
    next_id: AtomicU64,
}

impl JSONRPCClient {
    pub fn new_with_timeout(url: &str, timeout: Duration) -> Result<Self, Error> {
        Self::build(url, timeout, None)
    }

    pub fn new_with_timeout_and_jwt(
        url: &str,
        timeout: Duration,
        jwt_secret: [u8; 32],
    ) -> Result<Self, Error> {
        Self::build(url, timeout, Some(jwt_secret))
    }

    fn build(url: &str, timeout: Duration, jwt_secret: Option<[u8; 32]>) -> Result<Self, Error> {
        let url = Url::parse(url)
            .map_err(|e| anyhow::anyhow!("Failed to parse RPC URL {url}: {e}"))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            url,
            jwt_secret,
            next_id: AtomicU64::new(1),
        })
    }

    pub async fn call_method(&self, method: &str, params: Vec<Value>) -> Result<Value, Error> {
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let body = serde_json::to_vec(&request)?;
        trace!("RPC request {}: {}", method, String::from_utf8_lossy(&body));

        let mut http_request = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(secret) = &self.jwt_secret {
            http_request = http_request.bearer_auth(create_jwt_token(secret)?);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{method}: request to {} failed: {e}", self.url))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("{method}: failed to read response body: {e}"))?;
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "{method}: HTTP status {status}: {}",
                String::from_utf8_lossy(&bytes)
            ));
        }

        let response: RpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| anyhow::anyhow!("{method}: malformed JSON-RPC response: {e}"))?;
        if let Some(error) = response.error {
            return Err(anyhow::anyhow!(
                "{method}: RPC error {}: {}{}",
                error.code,
                error.message,
                error
                    .data
                    .map(|data| format!(" ({data})"))
                    .unwrap_or_default()
            ));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Creates an HS256 token with the current time as `iat`, as required by the Engine API.
pub fn create_jwt_token(secret: &[u8; 32]) -> Result<String, Error> {
    let iat = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    encode(
        &Header::new(Algorithm::HS256),
        &JwtClaims { iat },
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create JWT token: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_call_method_returns_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["latest", false],
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"hash":"0xaa"}}"#)
            .create_async()
            .await;

        let client = JSONRPCClient::new_with_timeout(&server.url(), TIMEOUT).unwrap();
        let result = client
            .call_method("eth_getBlockByNumber", vec![json!("latest"), json!(false)])
            .await
            .unwrap();

        assert_eq!(result, json!({"hash": "0xaa"}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_method_null_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
            .create_async()
            .await;

        let client = JSONRPCClient::new_with_timeout(&server.url(), TIMEOUT).unwrap();
        let result = client.call_method("eth_getBlockByNumber", vec![]).await;
        assert_eq!(result.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_call_method_rpc_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-38001,"message":"Unknown payload"}}"#,
            )
            .create_async()
            .await;

        let client = JSONRPCClient::new_with_timeout(&server.url(), TIMEOUT).unwrap();
        let err = client
            .call_method("engine_getPayloadV5", vec![json!("0x0300000000000001")])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("-38001"));
        assert!(err.to_string().contains("Unknown payload"));
    }

    #[tokio::test]
    async fn test_call_method_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(401)
            .with_body("missing token")
            .create_async()
            .await;

        let client = JSONRPCClient::new_with_timeout(&server.url(), TIMEOUT).unwrap();
        let err = client
            .call_method("engine_forkchoiceUpdatedV3", vec![])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_jwt_client_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", Matcher::Regex("^Bearer .+".to_string()))
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":[]}"#)
            .create_async()
            .await;

        let client =
            JSONRPCClient::new_with_timeout_and_jwt(&server.url(), TIMEOUT, [7u8; 32]).unwrap();
        client
            .call_method("engine_getClientVersionV1", vec![])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_plain_client_sends_no_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", Matcher::Missing)
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"Geth/v1.0.0"}"#)
            .create_async()
            .await;

        let client = JSONRPCClient::new_with_timeout(&server.url(), TIMEOUT).unwrap();
        let version = client.call_method("web3_clientVersion", vec![]).await.unwrap();
        assert_eq!(version, json!("Geth/v1.0.0"));
        mock.assert_async().await;
    }

    #[test]
    fn test_invalid_url() {
        assert!(JSONRPCClient::new_with_timeout("not a url", TIMEOUT).is_err());
    }

    #[test]
    fn test_jwt_token_has_three_segments() {
        let token = create_jwt_token(&[1u8; 32]).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }
}
