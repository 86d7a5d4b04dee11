//! OCPP 1.6 WebSocket server.
//!
//! Accepts charge-point connections at `ws://<host>:<port>/ocpp/{charge_point_id}`
//! and negotiates the `ocpp1.6` subprotocol.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use crate::ocpp::dispatcher::SharedOutboundDispatcher;
use crate::ocpp::frame::OcppFrame;
use crate::ocpp::handlers::{self, HandlerContext};
use crate::ocpp::registry::SharedConnectionRegistry;
use crate::support::shutdown::ShutdownSignal;

const OCPP_SUBPROTOCOL: &str = "ocpp1.6";

pub struct OcppServer {
    registry: SharedConnectionRegistry,
    dispatcher: SharedOutboundDispatcher,
    handler_context: Arc<HandlerContext>,
    shutdown: ShutdownSignal,
}

impl OcppServer {
    pub fn new(registry: SharedConnectionRegistry, dispatcher: SharedOutboundDispatcher, handler_context: Arc<HandlerContext>, shutdown: ShutdownSignal) -> Self {
        Self { registry, dispatcher, handler_context, shutdown }
    }

    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("OCPP 1.6 Central System listening on ws://{addr}");
        info!("charge points should connect to ws://{addr}/ocpp/{{charge_point_id}}");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.spawn_connection(stream, peer),
                        Err(e) => error!(error = %e, "failed to accept TCP connection"),
                    }
                }
                _ = self.shutdown.wait() => {
                    info!("OCPP server shutting down");
                    return Ok(());
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let registry = self.registry.clone();
        let dispatcher = self.dispatcher.clone();
        let handler_context = self.handler_context.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, registry, dispatcher, handler_context, shutdown).await {
                error!(%peer, error = %e, "OCPP connection terminated with an error");
            }
        });
    }
}

fn extract_charge_point_id(path: &str) -> Option<String> {
    let path = path.trim_start_matches('/');
    if let Some(id) = path.strip_prefix("ocpp/") {
        let id = id.trim_start_matches('/');
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    if !path.is_empty() && !path.contains('/') {
        return Some(path.to_string());
    }
    None
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: SharedConnectionRegistry,
    dispatcher: SharedOutboundDispatcher,
    handler_context: Arc<HandlerContext>,
    shutdown: ShutdownSignal,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut charge_point_id: Option<String> = None;

    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, mut response: Response| {
        let path = req.uri().path();
        let requested_protocols = req.headers().get("Sec-WebSocket-Protocol").and_then(|v| v.to_str().ok()).unwrap_or("");
        let supports_ocpp16 = requested_protocols.split(',').map(str::trim).any(|p| p == OCPP_SUBPROTOCOL);

        if !supports_ocpp16 {
            warn!(path, requested_protocols, "rejecting handshake: charger did not offer the ocpp1.6 subprotocol");
            let mut rejection = ErrorResponse::new(None);
            *rejection.status_mut() = StatusCode::BAD_REQUEST;
            return Err(rejection);
        }
        response.headers_mut().insert("Sec-WebSocket-Protocol", OCPP_SUBPROTOCOL.parse().unwrap());

        charge_point_id = extract_charge_point_id(path);
        Ok(response)
    })
    .await?;

    let Some(charge_point_id) = charge_point_id else {
        warn!(%peer, "rejecting connection with no charge point id in the path");
        return Ok(());
    };

    info!(charge_point_id = charge_point_id.as_str(), %peer, "charger connected");

    let (mut ws_sink, mut ws_source) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    if let Some(replaced) = registry.register(&charge_point_id, tx) {
        dispatcher.fail_all_for(&charge_point_id, "connection superseded by a new session");
        drop(replaced);
    }

    let cp_id_send = charge_point_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sink.send(Message::Text(msg)).await {
                error!(charge_point_id = cp_id_send.as_str(), error = %e, "failed to write to websocket");
                break;
            }
        }
    });

    let cp_id_recv = charge_point_id.clone();
    let recv_registry = registry.clone();
    let recv_dispatcher = dispatcher.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(message) = ws_source.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    recv_registry.touch(&cp_id_recv);
                    handle_frame(&cp_id_recv, &text, &recv_registry, &recv_dispatcher, &handler_context).await;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(frame)) => {
                    info!(charge_point_id = cp_id_recv.as_str(), ?frame, "charger sent close frame");
                    break;
                }
                Ok(Message::Binary(data)) => {
                    warn!(charge_point_id = cp_id_recv.as_str(), bytes = data.len(), "ignoring unexpected binary frame");
                }
                Ok(Message::Frame(_)) => {}
                Err(e) => {
                    error!(charge_point_id = cp_id_recv.as_str(), error = %e, "websocket read error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
        _ = shutdown.wait() => {
            info!(charge_point_id = charge_point_id.as_str(), "closing connection for server shutdown");
        }
    }

    registry.unregister(&charge_point_id);
    dispatcher.fail_all_for(&charge_point_id, "connection closed");
    info!(charge_point_id = charge_point_id.as_str(), "charger disconnected");
    Ok(())
}

async fn handle_frame(charge_point_id: &str, text: &str, registry: &SharedConnectionRegistry, dispatcher: &SharedOutboundDispatcher, handler_context: &Arc<HandlerContext>) {
    let frame = match OcppFrame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(charge_point_id, error = %e, "dropping unparseable OCPP frame");
            return;
        }
    };

    match frame {
        OcppFrame::Call { unique_id, action, payload } => {
            let response_payload = handlers::handle_call(handler_context, charge_point_id, &action, payload).await;
            let response = OcppFrame::CallResult { unique_id, payload: response_payload };
            if let Err(e) = registry.send_to(charge_point_id, response.serialize()) {
                error!(charge_point_id, error = e.as_str(), "failed to send CALLRESULT");
            }
        }
        OcppFrame::CallResult { unique_id, payload } => {
            dispatcher.resolve(charge_point_id, &unique_id, payload);
        }
        OcppFrame::CallError { unique_id, error_code, error_description, .. } => {
            dispatcher.reject(charge_point_id, &unique_id, &error_code, &error_description);
        }
    }
}
