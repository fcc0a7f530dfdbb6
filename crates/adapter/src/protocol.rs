//! Protocol module - JSON message types for the remote controller
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sender-side
//! sequence number) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use arrayvec::ArrayVec;

use crate::core::{GameSnapshot, SwapOutcome};
use crate::types::{CellIndex, ClearLine, FlavorId, Phase, StepResult};

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Upper bound on swaps in a single `command`
pub const MAX_SWAPS_PER_COMMAND: usize = 32;

// ============== Client -> Game Messages ==============

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default = "default_true")]
    pub stream_observations: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RequestedRole>,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: true,
            role: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedRole {
    Auto,
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Command message (controller only)
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: CommandAction,
    #[serde(default)]
    pub swaps: Option<SwapList>,
    /// Seed for `restart`; the current seed is reused when absent
    #[serde(default)]
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Swap,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireSwap {
    pub source: CellIndex,
    pub target: CellIndex,
}

/// Bounded swap list; more than [`MAX_SWAPS_PER_COMMAND`] entries is a parse error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapList(pub ArrayVec<WireSwap, MAX_SWAPS_PER_COMMAND>);

impl<'de> Deserialize<'de> for SwapList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = SwapList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of {{source, target}} objects")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<WireSwap, MAX_SWAPS_PER_COMMAND>::new();
                while let Some(s) = seq.next_element::<WireSwap>()? {
                    out.try_push(s)
                        .map_err(|_| serde::de::Error::custom("too many swaps"))?;
                }
                Ok(SwapList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Claim,
    Release,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultType {
    #[serde(rename = "result")]
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
    /// The engine refused to build a board (e.g. restart could not settle)
    EngineFailure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub command_actions: [CommandAction; 2],
    pub max_swaps_per_command: usize,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            command_actions: [CommandAction::Swap, CommandAction::Restart],
            max_swaps_per_command: MAX_SWAPS_PER_COMMAND,
        }
    }
}

/// Acknowledgment, sent once a command or control request has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Per-swap outcomes of a `swap` command, in request order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(rename = "type")]
    pub msg_type: ResultType,
    pub seq: u64,
    pub ts: u64,
    pub outcomes: Vec<SwapResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    pub source: CellIndex,
    pub target: CellIndex,
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub score_delta: u32,
    pub steps: Vec<StepSummary>,
}

impl From<&SwapOutcome> for SwapResult {
    fn from(value: &SwapOutcome) -> Self {
        Self {
            source: value.request.source,
            target: value.request.target,
            accepted: value.accepted,
            rejection: value.rejection.map(|r| r.as_str().to_string()),
            score_delta: value.score_delta,
            steps: value.cascade.iter().map(StepSummary::from).collect(),
        }
    }
}

/// One resolution cycle as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub cleared: Vec<CellIndex>,
    pub lines: Vec<LineSummary>,
    /// Columns that shifted, ascending
    pub columns: Vec<i32>,
    pub spawned: u32,
    pub score: u32,
}

impl From<&StepResult> for StepSummary {
    fn from(value: &StepResult) -> Self {
        Self {
            cleared: value.cleared.clone(),
            lines: value.lines.iter().map(LineSummary::from).collect(),
            columns: value.shifts.iter().map(|s| s.column).collect(),
            spawned: value.shifts.iter().map(|s| s.spawned.len() as u32).sum(),
            score: value.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSummary {
    pub axis: String,
    pub flavor: FlavorId,
    pub cells: Vec<CellIndex>,
}

impl From<&ClearLine> for LineSummary {
    fn from(value: &ClearLine) -> Self {
        Self {
            axis: value.axis.as_str().to_string(),
            flavor: value.flavor,
            cells: value.cells.clone(),
        }
    }
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Game state observation (sent to every streaming client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub episode_id: u32,
    pub seed: u32,
    pub phase: PhaseLower,
    pub board: BoardSnapshot,
    pub score: u32,
    pub moves: u32,
    pub cascade_steps: u32,
    pub animations: AnimationSnapshot,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major flavors, bottom row first
    pub cells: Vec<FlavorId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    pub pending: usize,
    pub running: usize,
}

/// Wire form of [`Phase`]. Observations are taken between engine calls and
/// therefore carry `idle`; `resolving` is kept for completeness of the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseLower {
    Idle,
    Resolving,
}

impl From<Phase> for PhaseLower {
    fn from(value: Phase) -> Self {
        match value {
            Phase::Idle => Self::Idle,
            Phase::Resolving => Self::Resolving,
        }
    }
}

/// Deterministic board hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for slot in buf.iter_mut().rev() {
            *slot = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        match std::str::from_utf8(&buf) {
            Ok(s) => serializer.serialize_str(s),
            Err(e) => Err(serde::ser::Error::custom(e)),
        }
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

impl From<&GameSnapshot> for ObservationMessage {
    fn from(s: &GameSnapshot) -> Self {
        Self {
            msg_type: ObservationType::Observation,
            seq: 0,
            ts: current_timestamp_ms(),
            episode_id: s.episode_id,
            seed: s.seed,
            phase: s.phase.into(),
            board: BoardSnapshot {
                width: s.width,
                height: s.height,
                cells: s.flavors.clone(),
            },
            score: s.score,
            moves: s.moves,
            cascade_steps: s.cascade_steps,
            animations: AnimationSnapshot {
                pending: s.pending_jobs,
                running: s.running_jobs,
            },
            state_hash: StateHash(s.board_hash),
        }
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // An unknown type is reported, not treated as a framing error.
            #[derive(Debug, Deserialize)]
            struct Header<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type {
                Some("hello") | Some("command") | Some("control") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Best-effort `seq` of a line that failed to parse, for the error reply
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, role: Option<RequestedRole>) -> HelloMessage {
    HelloMessage {
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
            role,
        },
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        controller_id,
        game_id: "match3".to_string(),
        capabilities: ServerCapabilities::default(),
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create a result message from the outcomes of one command
pub fn create_result(seq: u64, outcomes: &[SwapOutcome]) -> ResultMessage {
    ResultMessage {
        msg_type: ResultType::Result,
        seq,
        ts: current_timestamp_ms(),
        outcomes: outcomes.iter().map(SwapResult::from).collect(),
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
