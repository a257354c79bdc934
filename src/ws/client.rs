//! WebSocket façade
//!
//! One connection per client. A writer task owns the sink and drains a
//! bounded queue, so frames are never interleaved. A reader task routes
//! responses to the waiter registered under their `id`; every other frame
//! goes to the event channel returned by `connect`.
//!
//! No ping scheduling, reconnect or per-request timeout: wrap `request` in
//! `tokio::time::timeout` if a deadline is needed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};

use super::envelope::{login_request, RpcRequest, RpcResponse};
use crate::actions::current_time_ms;
use crate::config::constants::WS_OUTBOUND_CAPACITY;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::signing::{AccountSigner, Eip712Domain};

pub type TlsWebSocketStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = SplitSink<TlsWebSocketStream, Message>;
type WsSource = SplitStream<TlsWebSocketStream>;
type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<RpcResponse>>>>;

/// Frames that did not answer a pending request
pub type EventReceiver = mpsc::UnboundedReceiver<Value>;

/// Connect with TLS 1.2 minimum (plain for `ws://`)
pub async fn connect_tls(url: &str) -> ClientResult<TlsWebSocketStream> {
    let tls = native_tls::TlsConnector::builder()
        .min_protocol_version(Some(native_tls::Protocol::Tlsv12))
        .build()
        .map_err(|e| ClientError::TransportFailure(format!("TLS error: {}", e)))?;

    let (ws_stream, _response) =
        connect_async_tls_with_config(url, None, false, Some(Connector::NativeTls(tls))).await?;

    Ok(ws_stream)
}

pub struct WsClient {
    signer: AccountSigner,
    domain: Eip712Domain,
    outbound: mpsc::Sender<Message>,
    pending: PendingMap,
    reader_alive: Arc<AtomicBool>,
    writer_handle: Option<JoinHandle<()>>,
    reader_handle: Option<JoinHandle<()>>,
}

impl WsClient {
    /// Open the connection and start the writer and reader tasks
    ///
    /// Fails with `MalformedKey` before any connection attempt.
    pub async fn connect(config: &ClientConfig) -> ClientResult<(Self, EventReceiver)> {
        let signer = AccountSigner::from_hex(&config.private_key)?;
        let domain = Eip712Domain::for_environment(config.environment, config.verifying_contract)?;

        let url = config.ws_url();
        let ws_stream = connect_tls(url).await?;
        tracing::info!(
            url = %url,
            environment = %config.environment,
            account = %signer.checksum_address(),
            "WebSocket connected"
        );

        let (sink, source) = ws_stream.split();
        let (outbound, outbound_rx) = mpsc::channel(WS_OUTBOUND_CAPACITY);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader_alive = Arc::new(AtomicBool::new(true));

        let writer_handle = tokio::spawn(Self::writer_loop(sink, outbound_rx));
        let reader_handle = tokio::spawn(Self::reader_loop(
            source,
            Arc::clone(&pending),
            events_tx,
            Arc::clone(&reader_alive),
        ));

        Ok((
            Self {
                signer,
                domain,
                outbound,
                pending,
                reader_alive,
                writer_handle: Some(writer_handle),
                reader_handle: Some(reader_handle),
            },
            events_rx,
        ))
    }

    /// Sole owner of the sink
    async fn writer_loop(mut sink: WsSink, mut outbound_rx: mpsc::Receiver<Message>) {
        while let Some(message) = outbound_rx.recv().await {
            let is_close = matches!(message, Message::Close(_));
            if let Err(e) = sink.send(message).await {
                tracing::warn!(error = %e, "WebSocket write failed");
                break;
            }
            if is_close {
                break;
            }
        }
        let _ = sink.close().await;
        tracing::debug!("WebSocket writer stopped");
    }

    async fn reader_loop(
        mut source: WsSource,
        pending: PendingMap,
        events_tx: mpsc::UnboundedSender<Value>,
        reader_alive: Arc<AtomicBool>,
    ) {
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    tracing::trace!("Raw WS message: {}", text);
                    Self::dispatch(&text, &pending, &events_tx).await;
                }
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => Self::dispatch(&text, &pending, &events_tx).await,
                    Err(e) => tracing::debug!("Binary message not UTF-8: {}", e),
                },
                Ok(Message::Close(frame)) => {
                    tracing::info!(frame = ?frame, "WebSocket closed by server");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket read failed");
                    break;
                }
            }
        }

        // Flag first, then drop the waiters under the lock
        reader_alive.store(false, Ordering::SeqCst);
        let dropped = {
            let mut waiters = pending.lock().await;
            let count = waiters.len();
            waiters.clear();
            count
        };
        tracing::info!(pending_dropped = dropped, "WebSocket reader stopped");
    }

    async fn dispatch(text: &str, pending: &PendingMap, events_tx: &mpsc::UnboundedSender<Value>) {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, message = %text, "Undecodable WS frame");
                return;
            }
        };

        let waiter = match value.get("id").and_then(Value::as_str) {
            Some(id) => pending.lock().await.remove(id),
            None => None,
        };

        if let Some(waiter) = waiter {
            // Receiver gone means the caller stopped waiting
            let _ = waiter.send(RpcResponse::from(value));
            return;
        }

        let _ = events_tx.send(value);
    }

    /// EIP-55 account address
    pub fn address(&self) -> String {
        self.signer.checksum_address()
    }

    pub fn is_open(&self) -> bool {
        self.reader_alive.load(Ordering::SeqCst) && !self.outbound.is_closed()
    }

    /// Number of requests still awaiting a response
    pub async fn pending_requests(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn enqueue(&self, message: Message) -> ClientResult<()> {
        self.outbound
            .send(message)
            .await
            .map_err(|_| ClientError::TransportFailure("WebSocket writer stopped".into()))
    }

    /// Queue a frame without waiting for a response
    pub async fn send(&self, request: &RpcRequest) -> ClientResult<()> {
        let frame = request.to_frame()?;
        tracing::debug!(id = %request.id, method = %request.method, "WS send");
        self.enqueue(Message::Text(frame)).await
    }

    /// Send and await the response carrying the same `id`
    ///
    /// Error envelopes from the server are returned as responses, not errors.
    pub async fn request(&self, request: RpcRequest) -> ClientResult<RpcResponse> {
        let frame = request.to_frame()?;
        let (tx, rx) = oneshot::channel();
        {
            let mut waiters = self.pending.lock().await;
            if !self.reader_alive.load(Ordering::SeqCst) {
                return Err(ClientError::TransportFailure("WebSocket connection closed".into()));
            }
            if waiters.contains_key(&request.id) {
                return Err(ClientError::DuplicateRequestId(request.id));
            }
            waiters.insert(request.id.clone(), tx);
        }

        tracing::debug!(id = %request.id, method = %request.method, "WS request");
        if let Err(e) = self.enqueue(Message::Text(frame)).await {
            self.pending.lock().await.remove(&request.id);
            return Err(e);
        }

        rx.await.map_err(|_| {
            ClientError::TransportFailure(format!(
                "WebSocket closed before response to '{}'",
                request.id
            ))
        })
    }

    /// Signed `session.login` envelope, forward-dated from now
    pub fn login_request(&self, id: impl Into<String>) -> ClientResult<RpcRequest> {
        login_request(&self.signer, &self.domain, id, current_time_ms())
    }

    pub async fn login(&self, id: impl Into<String>) -> ClientResult<RpcResponse> {
        let request = self.login_request(id)?;
        let response = self.request(request).await?;
        tracing::info!(
            account = %self.address(),
            success = response.success,
            "Session login response"
        );
        Ok(response)
    }

    /// Send a close frame, flush the writer and stop the reader
    pub async fn close(mut self) -> ClientResult<()> {
        let _ = self.enqueue(Message::Close(None)).await;
        if let Some(handle) = self.writer_handle.take() {
            let _ = handle.await;
        }
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
        tracing::info!(account = %self.address(), "WebSocket closed");
        Ok(())
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.writer_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for WsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsClient")
            .field("account", &self.address())
            .field("chain_id", &self.domain.chain_id)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
