//! TCP server for the remote controller
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use arrayvec::ArrayVec;

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::SwapRequest;

pub const DEFAULT_PORT: u16 = 7878;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("MATCH3_AI_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "127.0.0.1".to_string());
        let port = env::var("MATCH3_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_pending_commands = env::var("MATCH3_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(10);

        Self {
            host,
            port,
            max_pending_commands,
        }
    }
}

/// Shared server state
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>, // Client id
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    /// Check if remote control is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("MATCH3_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the last one seen
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };

        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>, // Channel to send messages to client
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Line(String),
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up (useful
/// with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new());
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Line(line));
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Line(line.clone()));
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Line(line) => {
                    buf.extend_from_slice(line.as_bytes());
                    Ok(())
                }
                ClientOutbound::Ack(ack) => serde_json::to_writer(&mut buf, ack),
                ClientOutbound::Error(err) => serde_json::to_writer(&mut buf, err),
                ClientOutbound::Welcome(welcome) => serde_json::to_writer(&mut buf, welcome),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    // Handle incoming messages
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Client disconnected
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    send_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                // Same major version only
                let major = PROTOCOL_VERSION.split('.').next().unwrap_or("1");
                if hello.protocol_version.split('.').next() != Some(major) {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                // First client to hello becomes controller unless it asks to observe.
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }

                    let wants_observer = hello.requested.role == Some(RequestedRole::Observer);
                    if *controller == Some(client_id) {
                        (AssignedRole::Controller, *controller)
                    } else if controller.is_none() && !wants_observer {
                        *controller = Some(client_id);
                        info!(client_id, "client is now controller");
                        (AssignedRole::Controller, *controller)
                    } else {
                        (AssignedRole::Observer, *controller)
                    }
                };

                let welcome = create_welcome(
                    hello.seq,
                    client_id as u64,
                    role,
                    controller_id.map(|id| id as u64),
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                // Send the current state right away.
                if hello.requested.stream_observations
                    && command_tx
                        .try_send(InboundCommand {
                            client_id,
                            seq: hello.seq,
                            payload: InboundPayload::SnapshotRequest,
                        })
                        .is_err()
                {
                    debug!(client_id, "command queue full, initial observation deferred");
                    send_error(
                        hello.seq,
                        ErrorCode::Backpressure,
                        "Command queue is full; observation follows the next state change",
                    );
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    send_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    send_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        send_error(cmd.seq, code, &message);
                        continue;
                    }
                };

                // Backpressure: bounded queue. The game loop acks once applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    send_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    send_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let mut controller = state.controller.write().await;
                match ctrl.action {
                    ControlAction::Claim => {
                        if controller.is_none() || *controller == Some(client_id) {
                            *controller = Some(client_id);
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        } else {
                            send_error(ctrl.seq, ErrorCode::ControllerActive, "Controller already assigned");
                        }
                    }
                    ControlAction::Release => {
                        if *controller == Some(client_id) {
                            *controller = None;
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        } else {
                            send_error(ctrl.seq, ErrorCode::NotController, "Only controller may release");
                        }
                    }
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    send_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                debug!(client_id, error = %e, "unparseable line");
                send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    // Clean up: remove client and promote the next controller if needed.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => info!(client_id = new_id, "controller promoted"),
                None => info!(client_id, "controller released"),
            }
        }
    }

    // Closing the channel ends the write task.
    drop(send_error);
    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Map a protocol command into an engine command.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.action {
        CommandAction::Swap => {
            let swaps = match cmd.swaps.as_ref() {
                Some(list) if !list.0.is_empty() => list,
                _ => return Err((ErrorCode::InvalidCommand, "Missing swaps".to_string())),
            };
            let requests: ArrayVec<SwapRequest, MAX_SWAPS_PER_COMMAND> = swaps
                .0
                .iter()
                .map(|s| SwapRequest::new(s.source, s.target))
                .collect();
            Ok(ClientCommand::Swaps(requests))
        }
        CommandAction::Restart => Ok(ClientCommand::Restart { seed: cmd.seed }),
    }
}
