use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use super::{WalletError, WalletProvider};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::WalletAddress;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Wallet backed by a configured public key and a Solana JSON-RPC node.
///
/// There is no signing here; "connecting" validates the configured key and
/// the balance comes from `getBalance` at `confirmed` commitment.
#[derive(Clone)]
pub struct RpcWalletProvider {
    http_client: Arc<dyn HttpClient>,
    rpc_url: String,
    public_key: Option<String>,
    timeout_ms: u64,
}

impl Default for RpcWalletProvider {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl RpcWalletProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            rpc_url: String::from(DEFAULT_RPC_URL),
            public_key: None,
            timeout_ms: 10_000,
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_public_key(mut self, public_key: Option<String>) -> Self {
        self.public_key = public_key.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn fetch_balance(&self, address: &WalletAddress) -> Result<f64, WalletError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [address.as_str(), { "commitment": "confirmed" }],
        });
        tracing::debug!(rpc_url = %self.rpc_url, address = %address.short(), "requesting balance");

        let request = HttpRequest::post_json(&self.rpc_url, body.to_string())
            .with_timeout_ms(self.timeout_ms);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| balance_error(format!("rpc transport error: {}", e.message())))?;

        if !response.is_success() {
            return Err(balance_error(format!(
                "rpc returned status {}",
                response.status
            )));
        }

        parse_balance_response(&response.body)
    }
}

impl WalletProvider for RpcWalletProvider {
    fn connect<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<WalletAddress, WalletError>> + Send + 'a>> {
        Box::pin(async move {
            let raw = self
                .public_key
                .as_deref()
                .ok_or(WalletError::WalletUnavailable)?;

            WalletAddress::parse(raw).map_err(|e| WalletError::ConnectionRejected {
                reason: e.to_string(),
            })
        })
    }

    fn balance<'a>(
        &'a self,
        address: &'a WalletAddress,
    ) -> Pin<Box<dyn Future<Output = Result<f64, WalletError>> + Send + 'a>> {
        Box::pin(self.fetch_balance(address))
    }
}

fn balance_error(reason: String) -> WalletError {
    WalletError::BalanceFetch { reason }
}

fn parse_balance_response(body: &str) -> Result<f64, WalletError> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| balance_error(format!("failed to parse rpc response: {e}")))?;

    if let Some(error) = response.error {
        return Err(balance_error(format!(
            "rpc error {}: {}",
            error.code, error.message
        )));
    }

    let lamports = response
        .result
        .map(|result| result.value)
        .ok_or_else(|| balance_error(String::from("rpc response has no result")))?;

    Ok(lamports as f64 / LAMPORTS_PER_SOL)
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<BalanceResult>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http_client::{HttpError, HttpMethod, HttpResponse};

    const ADDRESS: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    struct CannedRpc {
        response: Result<HttpResponse, HttpError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedRpc {
        fn new(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpClient for CannedRpc {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.seen.lock().expect("lock").push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn connect_without_public_key_is_unavailable() {
        let provider = RpcWalletProvider::new(CannedRpc::new(Ok(HttpResponse::ok_json("{}"))));
        assert_eq!(provider.connect().await, Err(WalletError::WalletUnavailable));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_key() {
        let provider = RpcWalletProvider::new(CannedRpc::new(Ok(HttpResponse::ok_json("{}"))))
            .with_public_key(Some(String::from("0OIl")));

        assert!(matches!(
            provider.connect().await,
            Err(WalletError::ConnectionRejected { .. })
        ));
    }

    #[tokio::test]
    async fn balance_converts_lamports() {
        let rpc = CannedRpc::new(Ok(HttpResponse::ok_json(
            r#"{"jsonrpc":"2.0","result":{"context":{"slot":7},"value":2500000000},"id":1}"#,
        )));
        let provider = RpcWalletProvider::new(rpc.clone()).with_rpc_url("http://rpc.local");
        let address = WalletAddress::parse(ADDRESS).expect("valid address");

        let balance = provider.balance(&address).await.expect("balance");
        assert!((balance - 2.5).abs() < 1e-12);

        let seen = rpc.seen.lock().expect("lock");
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].url, "http://rpc.local");
        let body: serde_json::Value =
            serde_json::from_str(seen[0].body.as_deref().expect("body")).expect("json body");
        assert_eq!(body["method"], "getBalance");
        assert_eq!(body["params"][0], ADDRESS);
    }

    #[tokio::test]
    async fn rpc_error_object_is_a_balance_failure() {
        let rpc = CannedRpc::new(Ok(HttpResponse::ok_json(
            r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid param"},"id":1}"#,
        )));
        let provider = RpcWalletProvider::new(rpc);
        let address = WalletAddress::parse(ADDRESS).expect("valid address");

        let error = provider.balance(&address).await.expect_err("rpc error");
        assert_eq!(error.code(), "wallet.balance_fetch");
        assert!(error.to_string().contains("Invalid param"));
    }
}
