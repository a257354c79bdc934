//! REST façade
//!
//! One method per exchange operation. Requests are built and signed by
//! `RequestBuilder` before any I/O; the response comes back untouched as a
//! `RawResponse`, non-2xx included.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::endpoints::{self, Endpoint};
use super::request::{push_opt, RequestBuilder, RestRequest};
use crate::actions::{
    ApproveSigner, CancelAndReplace, CancelOrder, CancelOrders, NewOrder, Withdraw,
};
use crate::config::constants::{HTTP_CONNECT_TIMEOUT_MS, HTTP_POOL_MAX_IDLE};
use crate::config::{ClientConfig, Environment};
use crate::error::{ClientError, ClientResult};
use crate::signing::{AccountSigner, Eip712Domain};
use crate::types::{Interval, OrderBookLimit};

/// Build the shared HTTP client
pub fn create_http_client(timeout: Duration) -> ClientResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .tcp_nodelay(true)
        .build()
        .map_err(|e| ClientError::Config(format!("HTTP client: {}", e)))?;
    info!(
        phase = "init",
        timeout_ms = timeout.as_millis() as u64,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        pool_max_idle = HTTP_POOL_MAX_IDLE,
        tcp_nodelay = true,
        "HTTP client configured"
    );
    Ok(client)
}

/// Status code and body exactly as the server returned them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Kline query (`/uiKlines`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    pub symbol: String,
    pub interval: Interval,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub limit: Option<u32>,
}

impl KlineQuery {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("symbol".to_string(), self.symbol.clone()),
            ("interval".to_string(), self.interval.to_string()),
        ];
        push_opt(&mut query, "startTime", self.start_time);
        push_opt(&mut query, "endTime", self.end_time);
        push_opt(&mut query, "limit", self.limit);
        query
    }
}

/// Order history query (`/orders`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOrdersQuery {
    pub symbol: String,
    /// Repeated as one `orderId` parameter each
    pub order_ids: Vec<String>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub limit: Option<u32>,
}

impl ListOrdersQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("symbol".to_string(), self.symbol.clone())];
        query.extend(
            self.order_ids
                .iter()
                .map(|id| ("orderId".to_string(), id.clone())),
        );
        push_opt(&mut query, "startTime", self.start_time);
        push_opt(&mut query, "endTime", self.end_time);
        push_opt(&mut query, "limit", self.limit);
        query
    }
}

/// REST client bound to one account and environment
///
/// Immutable after construction. `reqwest::Client` is internally pooled and
/// `Clone`, so a `RestClient` can be shared across tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RestClient {
    environment: Environment,
    base_url: String,
    signer: AccountSigner,
    domain: Eip712Domain,
    sub_account_id: u8,
    http: reqwest::Client,
}

impl RestClient {
    /// Fails with `MalformedKey` before any transport is created
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let signer = AccountSigner::from_hex(&config.private_key)?;
        let http = create_http_client(config.request_timeout())?;
        Self::assemble(config, signer, http)
    }

    /// Use a caller-provided HTTP client (its own timeout applies)
    pub fn with_http_client(config: &ClientConfig, http: reqwest::Client) -> ClientResult<Self> {
        let signer = AccountSigner::from_hex(&config.private_key)?;
        Self::assemble(config, signer, http)
    }

    fn assemble(
        config: &ClientConfig,
        signer: AccountSigner,
        http: reqwest::Client,
    ) -> ClientResult<Self> {
        let domain = Eip712Domain::for_environment(config.environment, config.verifying_contract)?;
        info!(
            environment = %config.environment,
            account = %signer.checksum_address(),
            sub_account_id = config.sub_account_id,
            chain_id = domain.chain_id,
            "REST client ready"
        );
        Ok(Self {
            environment: config.environment,
            base_url: config.rest_url().to_string(),
            signer,
            domain,
            sub_account_id: config.sub_account_id,
            http,
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// EIP-55 account address
    pub fn address(&self) -> String {
        self.signer.checksum_address()
    }

    pub fn sub_account_id(&self) -> u8 {
        self.sub_account_id
    }

    /// Request builder sharing this client's signer and domain
    pub fn requests(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.signer, &self.domain, self.sub_account_id)
    }

    /// Send a built request and hand back the raw response
    pub async fn execute(&self, request: RestRequest) -> ClientResult<RawResponse> {
        let url = request.url(&self.base_url)?;
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            let payload = serde_json::to_vec(body)?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(payload);
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(
            method = %request.method,
            path = %request.path(),
            auth = ?request.auth,
            status,
            latency_ms = start.elapsed().as_millis() as u64,
            "REST response"
        );
        Ok(RawResponse { status, body })
    }

    async fn public(
        &self,
        endpoint: &Endpoint,
        path_params: &[(&str, &str)],
        query: Vec<(String, String)>,
    ) -> ClientResult<RawResponse> {
        let request = self.requests().public(endpoint, path_params, query)?;
        self.execute(request).await
    }

    async fn query_signed(
        &self,
        endpoint: &Endpoint,
        extra: Vec<(String, String)>,
    ) -> ClientResult<RawResponse> {
        let request = self.requests().query_signed(endpoint, extra)?;
        self.execute(request).await
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    pub async fn get_24hr_ticker(&self, symbol: Option<&str>) -> ClientResult<RawResponse> {
        let mut query = Vec::new();
        push_opt(&mut query, "symbol", symbol);
        self.public(&endpoints::TICKER_24HR, &[], query).await
    }

    pub async fn get_product(&self, symbol: &str) -> ClientResult<RawResponse> {
        self.public(&endpoints::PRODUCT, &[("symbol", symbol)], Vec::new())
            .await
    }

    pub async fn get_product_by_id(&self, id: u32) -> ClientResult<RawResponse> {
        let id = id.to_string();
        self.public(&endpoints::PRODUCT_BY_ID, &[("id", id.as_str())], Vec::new())
            .await
    }

    pub async fn get_klines(&self, query: &KlineQuery) -> ClientResult<RawResponse> {
        self.public(&endpoints::KLINES, &[], query.to_query()).await
    }

    pub async fn list_products(&self) -> ClientResult<RawResponse> {
        self.public(&endpoints::PRODUCTS, &[], Vec::new()).await
    }

    pub async fn order_book(
        &self,
        symbol: &str,
        granularity: Option<u32>,
        limit: OrderBookLimit,
    ) -> ClientResult<RawResponse> {
        let mut query = vec![("symbol".to_string(), symbol.to_string())];
        push_opt(&mut query, "granularity", granularity);
        query.push(("limit".to_string(), limit.value().to_string()));
        self.public(&endpoints::ORDER_BOOK, &[], query).await
    }

    pub async fn server_time(&self) -> ClientResult<RawResponse> {
        self.public(&endpoints::SERVER_TIME, &[], Vec::new()).await
    }

    // =========================================================================
    // Signed actions
    // =========================================================================

    pub async fn approve_revoke_signer(&self, action: &ApproveSigner) -> ClientResult<RawResponse> {
        let request = self
            .requests()
            .body_signed(&endpoints::APPROVE_REVOKE_SIGNER, action)?;
        self.execute(request).await
    }

    pub async fn new_order(&self, order: &NewOrder) -> ClientResult<RawResponse> {
        let request = self.requests().body_signed(&endpoints::NEW_ORDER, order)?;
        self.execute(request).await
    }

    pub async fn cancel_and_replace(&self, action: &CancelAndReplace) -> ClientResult<RawResponse> {
        let request = self
            .requests()
            .body_signed(&endpoints::CANCEL_AND_REPLACE, action)?;
        self.execute(request).await
    }

    pub async fn cancel_order(&self, action: &CancelOrder) -> ClientResult<RawResponse> {
        let request = self.requests().body_signed(&endpoints::CANCEL_ORDER, action)?;
        self.execute(request).await
    }

    pub async fn cancel_all_orders(&self, action: &CancelOrders) -> ClientResult<RawResponse> {
        let request = self
            .requests()
            .body_signed(&endpoints::CANCEL_ALL_ORDERS, action)?;
        self.execute(request).await
    }

    pub async fn withdraw(&self, action: &Withdraw) -> ClientResult<RawResponse> {
        let request = self.requests().body_signed(&endpoints::WITHDRAW, action)?;
        self.execute(request).await
    }

    // =========================================================================
    // Signed account reads
    // =========================================================================

    pub async fn get_spot_balances(&self) -> ClientResult<RawResponse> {
        self.query_signed(&endpoints::SPOT_BALANCES, Vec::new()).await
    }

    pub async fn get_perpetual_position(&self, symbol: Option<&str>) -> ClientResult<RawResponse> {
        let mut extra = Vec::new();
        push_opt(&mut extra, "symbol", symbol);
        self.query_signed(&endpoints::PERPETUAL_POSITION, extra).await
    }

    pub async fn list_approved_signers(&self) -> ClientResult<RawResponse> {
        self.query_signed(&endpoints::APPROVED_SIGNERS, Vec::new())
            .await
    }

    pub async fn list_open_orders(&self, symbol: Option<&str>) -> ClientResult<RawResponse> {
        let mut extra = Vec::new();
        push_opt(&mut extra, "symbol", symbol);
        self.query_signed(&endpoints::OPEN_ORDERS, extra).await
    }

    pub async fn list_orders(&self, query: &ListOrdersQuery) -> ClientResult<RawResponse> {
        self.query_signed(&endpoints::ORDERS, query.to_query()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderType, TimeInForce};
    use mockito::Matcher;
    use serde_json::json;

    const TEST_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const TEST_ADDR: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn config_for(url: &str) -> ClientConfig {
        let mut config = ClientConfig::new(Environment::Testnet, TEST_KEY, 1);
        config.rest_url = Some(url.to_string());
        config
    }

    fn sample_order() -> NewOrder {
        NewOrder {
            product_id: 1002,
            is_buy: true,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::Gtc,
            expiration: 1735689600000,
            price: 3_300_000_000_000_000_000_000,
            quantity: 1_000_000_000_000_000_000,
            nonce: 1735689500000,
        }
    }

    #[test]
    fn test_malformed_key_fails_construction() {
        let config = ClientConfig::new(Environment::Testnet, "not-a-key", 0);
        let err = RestClient::new(&config).unwrap_err();
        assert!(matches!(err, ClientError::MalformedKey(_)));
    }

    #[test]
    fn test_client_exposes_account() {
        let client = RestClient::new(&config_for("http://127.0.0.1:1")).unwrap();
        assert_eq!(client.address(), TEST_ADDR);
        assert_eq!(client.sub_account_id(), 1);
        assert_eq!(client.domain().chain_id, 168587773);
    }

    #[test]
    fn test_raw_response_helpers() {
        let ok = RawResponse {
            status: 204,
            body: "{\"serverTime\":1}".into(),
        };
        assert!(ok.is_success());
        let value: serde_json::Value = ok.json().unwrap();
        assert_eq!(value["serverTime"], 1);

        let bad = RawResponse {
            status: 400,
            body: "oops".into(),
        };
        assert!(!bad.is_success());
        assert!(matches!(
            bad.json::<serde_json::Value>(),
            Err(ClientError::EncodingFailure(_))
        ));
    }

    #[test]
    fn test_list_orders_query_repeats_order_id() {
        let mut query = ListOrdersQuery::new("ethperp");
        query.order_ids = vec!["a".into(), "b".into()];
        query.limit = Some(50);
        let pairs = query.to_query();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["symbol", "orderId", "orderId", "limit"]);
    }

    #[tokio::test]
    async fn test_server_time() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/time")
            .with_status(200)
            .with_body(r#"{"serverTime":1735689600000}"#)
            .create_async()
            .await;

        let client = RestClient::new(&config_for(&server.url())).unwrap();
        let response = client.server_time().await.unwrap();
        assert_eq!(response.status, 200);
        assert!(response.body.contains("1735689600000"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_returned_intact() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/products/nope")
            .with_status(404)
            .with_body(r#"{"error":"not found"}"#)
            .create_async()
            .await;

        let client = RestClient::new(&config_for(&server.url())).unwrap();
        let response = client.get_product("nope").await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, r#"{"error":"not found"}"#);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_order_book_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/depth")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "ethperp".into()),
                Matcher::UrlEncoded("granularity".into(), "10".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = RestClient::new(&config_for(&server.url())).unwrap();
        client
            .order_book("ethperp", Some(10), OrderBookLimit::Twenty)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_klines_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/uiKlines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "btcperp".into()),
                Matcher::UrlEncoded("interval".into(), "15m".into()),
                Matcher::UrlEncoded("limit".into(), "100".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = RestClient::new(&config_for(&server.url())).unwrap();
        let mut query = KlineQuery::new("btcperp", Interval::FifteenMinutes);
        query.limit = Some(100);
        client.get_klines(&query).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_new_order_posts_signed_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/order")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "Account": TEST_ADDR,
                "SubAccountId": 1,
                "ProductId": 1002,
                "IsBuy": true,
                "OrderType": 0,
                "TimeInForce": 0,
                "Expiration": 1735689600000u64,
                "Price": "3300000000000000000000",
                "Quantity": "1000000000000000000",
                "Nonce": 1735689500000u64,
            })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = RestClient::new(&config_for(&server.url())).unwrap();
        let response = client.new_order(&sample_order()).await.unwrap();
        assert!(response.is_success());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cancel_all_uses_delete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/openOrders")
            .match_body(Matcher::PartialJson(json!({
                "Account": TEST_ADDR,
                "ProductId": 1002,
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = RestClient::new(&config_for(&server.url())).unwrap();
        client
            .cancel_all_orders(&CancelOrders { product_id: 1002 })
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_open_orders_signed_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/openOrders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("account".into(), TEST_ADDR.into()),
                Matcher::UrlEncoded("subAccountId".into(), "1".into()),
                Matcher::Regex("signature=0x[0-9a-f]{130}".into()),
                Matcher::UrlEncoded("symbol".into(), "ethperp".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = RestClient::new(&config_for(&server.url())).unwrap();
        client.list_open_orders(Some("ethperp")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RestClient::new(&config_for(&format!("http://{}", addr))).unwrap();
        let err = client.server_time().await.unwrap_err();
        assert!(matches!(err, ClientError::TransportFailure(_)), "Got: {:?}", err);
        assert!(!err.is_local());
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let holder = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = config_for(&format!("http://{}", addr));
        config.timeout = Some(Duration::from_millis(200));
        let client = RestClient::new(&config).unwrap();
        let err = client.server_time().await.unwrap_err();
        assert!(matches!(err, ClientError::TransportTimeout(_)), "Got: {:?}", err);
        holder.abort();
    }
}
