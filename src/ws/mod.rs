//! WebSocket surface: JSON-RPC 2.0 envelopes and the `WsClient` façade

pub mod client;
pub mod envelope;

pub use client::{connect_tls, EventReceiver, WsClient};
pub use envelope::{login_request, RpcRequest, RpcResponse, JSONRPC_VERSION};
