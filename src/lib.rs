//! 100x exchange client
//!
//! REST and WebSocket access to the 100x perpetual-futures exchange:
//! - EIP-712 signing of account actions (`signing`, `actions`)
//! - Request construction and the `RestClient` façade (`rest`)
//! - JSON-RPC 2.0 envelopes and the `WsClient` façade (`ws`)

pub mod actions;
pub mod config;
pub mod error;
pub mod rest;
pub mod signing;
pub mod types;
pub mod ws;

pub use actions::{
    ApproveSigner, CancelAndReplace, CancelOrder, CancelOrders, Login, NewOrder, SignableAction,
    SignedAuthentication, Withdraw,
};
pub use config::{ClientConfig, Environment, VerifyingContract};
pub use error::{ClientError, ClientResult};
pub use rest::{RawResponse, RestClient};
pub use signing::{derive_address, AccountSigner, Eip712Domain, PrimaryType};
pub use types::{Interval, OrderBookLimit, OrderType, Product, TimeInForce};
pub use ws::{RpcRequest, RpcResponse, WsClient};
