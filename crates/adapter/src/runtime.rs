//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server. The game loop stays
//! the only owner of the [`Game`]; the server only hands it commands and
//! ships the lines it produces.

use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::core::{Game, SwapOutcome};
use crate::protocol::{
    create_ack, create_error, create_result, ErrorCode, ObservationMessage, MAX_SWAPS_PER_COMMAND,
};
use crate::server::{run_server, ServerConfig, ServerState};
use crate::types::SwapRequest;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client finished its handshake and wants the current state right away
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Swaps(ArrayVec<SwapRequest, MAX_SWAPS_PER_COMMAND>),
    Restart { seed: Option<u32> },
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    Broadcast { line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `MATCH3_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerState::is_disabled() {
            info!("remote control disabled via MATCH3_AI_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new()?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None).await {
                error!(error = %e, "adapter server stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}

/// What applying one inbound command did to the game
#[derive(Debug, Clone, Default)]
pub struct Applied {
    pub messages: Vec<OutboundMessage>,
    /// Every swap outcome, in request order
    pub outcomes: Vec<SwapOutcome>,
    /// A new episode started; in-flight animations belong to the old board
    pub restarted: bool,
}

/// Apply an inbound command to the game and build the replies.
///
/// Swaps are applied one after another; each resolves fully before the next.
/// A successful command is answered with `ack` and, for swaps, a `result`.
pub fn apply_inbound(game: &mut Game, inbound: InboundCommand) -> Applied {
    let mut applied = Applied::default();
    let client_id = inbound.client_id;

    match inbound.payload {
        InboundPayload::SnapshotRequest => {
            push_json(&mut applied, client_id, &build_observation(game, inbound.seq));
        }
        InboundPayload::Command(ClientCommand::Swaps(swaps)) => {
            applied.outcomes = swaps
                .iter()
                .map(|s| game.request_swap(s.source, s.target))
                .collect();
            let result = create_result(inbound.seq, &applied.outcomes);
            push_json(&mut applied, client_id, &create_ack(inbound.seq));
            push_json(&mut applied, client_id, &result);
        }
        InboundPayload::Command(ClientCommand::Restart { seed }) => {
            let seed = seed.unwrap_or(game.config().seed);
            match game.restart(seed) {
                Ok(()) => {
                    applied.restarted = true;
                    push_json(&mut applied, client_id, &create_ack(inbound.seq));
                }
                Err(e) => {
                    warn!(seed, error = %e, "restart refused");
                    push_json(
                        &mut applied,
                        client_id,
                        &create_error(inbound.seq, ErrorCode::EngineFailure, &e.to_string()),
                    );
                }
            }
        }
    }

    applied
}

/// Observation of the current game state
pub fn build_observation(game: &Game, seq: u64) -> ObservationMessage {
    let mut obs = ObservationMessage::from(&game.snapshot());
    obs.seq = seq;
    obs
}

/// Serialized observation, ready for [`OutboundMessage::Broadcast`]
pub fn observation_line(game: &Game, seq: u64) -> Option<String> {
    serde_json::to_string(&build_observation(game, seq)).ok()
}

fn push_json<T: serde::Serialize>(applied: &mut Applied, client_id: usize, msg: &T) {
    match serde_json::to_string(msg) {
        Ok(line) => applied
            .messages
            .push(OutboundMessage::ToClient { client_id, line }),
        Err(e) => warn!(error = %e, "failed to serialize reply"),
    }
}
