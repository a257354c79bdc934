//! REST request construction
//!
//! Pure: builds method + path + query + body, signing where the endpoint
//! requires it. Nothing here touches the network, so every signing or
//! schema failure surfaces before any I/O.

use reqwest::{Method, Url};
use serde_json::Value;

use super::endpoints::{Auth, Endpoint};
use crate::actions::{sign_action, AccountContext, SignableAction, SignedAuthentication};
use crate::error::{ClientError, ClientResult};
use crate::signing::{AccountSigner, Eip712Domain};

/// A fully built request, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    /// Unencoded path segments
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: Auth,
}

impl RestRequest {
    /// Unencoded path, for logs
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Join onto `base_url`, keeping any path prefix the base carries.
    /// Each segment is percent-encoded, so `/`, `?` and `#` inside a
    /// parameter never leave its segment.
    pub fn url(&self, base_url: &str) -> ClientResult<Url> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid URL '{}': {}", base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("base URL '{}' has no path", base_url)))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Optional query parameter helper
pub(crate) fn push_opt<T: ToString>(
    query: &mut Vec<(String, String)>,
    key: &str,
    value: Option<T>,
) {
    if let Some(value) = value {
        query.push((key.to_string(), value.to_string()));
    }
}

/// Builds requests for one account
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    signer: &'a AccountSigner,
    domain: &'a Eip712Domain,
    ctx: AccountContext,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(signer: &'a AccountSigner, domain: &'a Eip712Domain, sub_account_id: u8) -> Self {
        Self {
            signer,
            domain,
            ctx: AccountContext::new(signer.address(), sub_account_id),
        }
    }

    pub fn context(&self) -> &AccountContext {
        &self.ctx
    }

    fn check_auth(endpoint: &Endpoint, expected: Auth) -> ClientResult<()> {
        if endpoint.auth != expected {
            return Err(ClientError::Config(format!(
                "endpoint '{}' is {:?}, not {:?}",
                endpoint.name, endpoint.auth, expected
            )));
        }
        Ok(())
    }

    /// Unsigned GET
    pub fn public(
        &self,
        endpoint: &Endpoint,
        path_params: &[(&str, &str)],
        query: Vec<(String, String)>,
    ) -> ClientResult<RestRequest> {
        Self::check_auth(endpoint, Auth::Public)?;
        Ok(RestRequest {
            method: endpoint.method.clone(),
            segments: endpoint.path_segments(path_params)?,
            query,
            body: None,
            auth: Auth::Public,
        })
    }

    /// Signed action with the signature in the JSON body
    pub fn body_signed<A: SignableAction>(
        &self,
        endpoint: &Endpoint,
        action: &A,
    ) -> ClientResult<RestRequest> {
        Self::check_auth(endpoint, Auth::BodySigned)?;
        if endpoint.primary_type != Some(A::PRIMARY_TYPE) {
            return Err(ClientError::schema_mismatch(
                A::PRIMARY_TYPE.name(),
                format!("endpoint '{}' does not accept this action", endpoint.name),
            ));
        }

        let body = sign_action(self.signer, self.domain, &self.ctx, action)?;
        tracing::debug!(
            endpoint = endpoint.name,
            method = %endpoint.method,
            path = endpoint.path,
            primary_type = %A::PRIMARY_TYPE,
            "Built body-signed request"
        );

        Ok(RestRequest {
            method: endpoint.method.clone(),
            segments: endpoint.path_segments(&[])?,
            query: Vec::new(),
            body: Some(body),
            auth: Auth::BodySigned,
        })
    }

    /// Signed GET: `account`, `subAccountId`, `signature` lead the query,
    /// followed by `extra`
    pub fn query_signed(
        &self,
        endpoint: &Endpoint,
        extra: Vec<(String, String)>,
    ) -> ClientResult<RestRequest> {
        Self::check_auth(endpoint, Auth::QuerySigned)?;

        let auth = sign_action(self.signer, self.domain, &self.ctx, &SignedAuthentication)?;
        let mut query = Vec::with_capacity(3 + extra.len());
        for key in ["account", "subAccountId", "signature"] {
            let value = match &auth[key] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            query.push((key.to_string(), value));
        }
        query.extend(extra);

        tracing::debug!(
            endpoint = endpoint.name,
            path = endpoint.path,
            "Built query-signed request"
        );

        Ok(RestRequest {
            method: endpoint.method.clone(),
            segments: endpoint.path_segments(&[])?,
            query,
            body: None,
            auth: Auth::QuerySigned,
        })
    }
}
