//! REST endpoint table
//!
//! Paths are relative to the environment's base URL. `{name}` segments
//! are substituted by `Endpoint::path_segments`; each substituted value
//! stays one segment and is percent-encoded when the URL is built.

use reqwest::Method;

use crate::error::{ClientError, ClientResult};
use crate::signing::PrimaryType;

/// How a request proves account ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Public,
    /// `account`, `subAccountId`, `signature` appended to the query string
    QuerySigned,
    /// Signature embedded in the JSON body
    BodySigned,
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub auth: Auth,
    pub primary_type: Option<PrimaryType>,
}

impl Endpoint {
    const fn public(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            method: Method::GET,
            path,
            auth: Auth::Public,
            primary_type: None,
        }
    }

    const fn query_signed(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            method: Method::GET,
            path,
            auth: Auth::QuerySigned,
            primary_type: Some(PrimaryType::SignedAuthentication),
        }
    }

    const fn body_signed(
        name: &'static str,
        method: Method,
        path: &'static str,
        primary_type: PrimaryType,
    ) -> Self {
        Self {
            name,
            method,
            path,
            auth: Auth::BodySigned,
            primary_type: Some(primary_type),
        }
    }

    /// Path segments with `{key}` placeholders substituted, not yet encoded
    pub fn path_segments(&self, params: &[(&str, &str)]) -> ClientResult<Vec<String>> {
        self.path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| {
                let placeholder = segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'));
                let Some(key) = placeholder else {
                    return Ok(segment.to_string());
                };
                let invalid = |reason: String| ClientError::InvalidParameter {
                    name: key.to_string(),
                    reason,
                };
                let value = params
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| invalid(format!("missing for {}", self.path)))?;
                // Dot segments would be resolved away by the URL parser
                if matches!(value, "" | "." | "..") {
                    return Err(invalid(format!("`{}` is not a path segment", value)));
                }
                Ok(value.to_string())
            })
            .collect()
    }
}

// Public market data
pub const TICKER_24HR: Endpoint = Endpoint::public("24h ticker", "/ticker/24hr");
pub const PRODUCT: Endpoint = Endpoint::public("product by symbol", "/products/{symbol}");
pub const PRODUCT_BY_ID: Endpoint =
    Endpoint::public("product by id", "/products/product-by-id/{id}");
pub const KLINES: Endpoint = Endpoint::public("kline", "/uiKlines");
pub const PRODUCTS: Endpoint = Endpoint::public("list products", "/products");
pub const ORDER_BOOK: Endpoint = Endpoint::public("order book", "/depth");
pub const SERVER_TIME: Endpoint = Endpoint::public("server time", "/time");

// Body-signed actions
pub const APPROVE_REVOKE_SIGNER: Endpoint = Endpoint::body_signed(
    "approve/revoke signer",
    Method::POST,
    "/approved-signers",
    PrimaryType::ApproveSigner,
);
pub const NEW_ORDER: Endpoint =
    Endpoint::body_signed("new order", Method::POST, "/order", PrimaryType::Order);
pub const CANCEL_AND_REPLACE: Endpoint = Endpoint::body_signed(
    "cancel+replace",
    Method::POST,
    "/order/cancel-and-replace",
    PrimaryType::Order,
);
pub const CANCEL_ORDER: Endpoint = Endpoint::body_signed(
    "cancel order",
    Method::DELETE,
    "/order",
    PrimaryType::CancelOrder,
);
pub const CANCEL_ALL_ORDERS: Endpoint = Endpoint::body_signed(
    "cancel all",
    Method::DELETE,
    "/openOrders",
    PrimaryType::CancelOrders,
);
pub const WITHDRAW: Endpoint =
    Endpoint::body_signed("withdraw", Method::POST, "/withdraw", PrimaryType::Withdraw);

// Query-signed account reads
pub const SPOT_BALANCES: Endpoint = Endpoint::query_signed("spot balances", "/balances");
pub const PERPETUAL_POSITION: Endpoint = Endpoint::query_signed("perp position", "/positionRisk");
pub const APPROVED_SIGNERS: Endpoint =
    Endpoint::query_signed("list signers", "/approved-signers");
pub const OPEN_ORDERS: Endpoint = Endpoint::query_signed("list open orders", "/openOrders");
pub const ORDERS: Endpoint = Endpoint::query_signed("list orders", "/orders");

pub const ALL: [Endpoint; 18] = [
    TICKER_24HR,
    PRODUCT,
    PRODUCT_BY_ID,
    KLINES,
    PRODUCTS,
    ORDER_BOOK,
    SERVER_TIME,
    APPROVE_REVOKE_SIGNER,
    NEW_ORDER,
    CANCEL_AND_REPLACE,
    CANCEL_ORDER,
    CANCEL_ALL_ORDERS,
    WITHDRAW,
    SPOT_BALANCES,
    PERPETUAL_POSITION,
    APPROVED_SIGNERS,
    OPEN_ORDERS,
    ORDERS,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments() {
        assert_eq!(
            PRODUCT.path_segments(&[("symbol", "ethperp")]).unwrap(),
            vec!["products", "ethperp"]
        );
        assert_eq!(
            PRODUCT_BY_ID.path_segments(&[("id", "1002")]).unwrap(),
            vec!["products", "product-by-id", "1002"]
        );
        assert_eq!(SERVER_TIME.path_segments(&[]).unwrap(), vec!["time"]);
    }

    #[test]
    fn test_value_with_separators_is_one_segment() {
        let segments = PRODUCT.path_segments(&[("symbol", "../time?x=1")]).unwrap();
        assert_eq!(segments, vec!["products", "../time?x=1"]);
    }

    #[test]
    fn test_missing_or_dot_path_parameter_is_rejected() {
        let cases: [&[(&str, &str)]; 4] = [
            &[],
            &[("symbol", "")],
            &[("symbol", "..")],
            &[("symbol", ".")],
        ];
        for params in cases {
            let err = PRODUCT.path_segments(params).unwrap_err();
            assert!(
                matches!(&err, ClientError::InvalidParameter { name, .. } if name == "symbol"),
                "Got: {:?}",
                err
            );
        }
    }

    #[test]
    fn test_signed_endpoints_carry_primary_type() {
        for endpoint in ALL.iter() {
            match endpoint.auth {
                Auth::Public => assert!(endpoint.primary_type.is_none(), "{}", endpoint.name),
                Auth::QuerySigned => {
                    assert_eq!(endpoint.method, Method::GET, "{}", endpoint.name);
                    assert_eq!(
                        endpoint.primary_type,
                        Some(PrimaryType::SignedAuthentication),
                        "{}",
                        endpoint.name
                    );
                }
                Auth::BodySigned => {
                    assert_ne!(endpoint.method, Method::GET, "{}", endpoint.name);
                    assert!(endpoint.primary_type.is_some(), "{}", endpoint.name);
                }
            }
        }
    }

    #[test]
    fn test_cancel_endpoints_use_delete() {
        assert_eq!(CANCEL_ORDER.method, Method::DELETE);
        assert_eq!(CANCEL_ORDER.path, "/order");
        assert_eq!(CANCEL_ALL_ORDERS.method, Method::DELETE);
        assert_eq!(CANCEL_ALL_ORDERS.path, "/openOrders");
    }
}
