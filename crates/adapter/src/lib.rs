//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! Lets an external agent (a bot, a test harness, a remote UI) play the game
//! over a TCP connection while the game loop keeps sole ownership of the engine.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends an `observation` whenever the state changes
//! 5. **Commanding**: Controller sends swaps (up to 32 per command) or a restart
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `swap` with a list of `{source, target}` cells, or `restart`
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the assigned role
//! - **ack**: Sent once a command has been applied
//! - **result**: Per-swap outcome, including every cascade step
//! - **observation**: Board flavors, score, phase, animation backlog, state hash
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `MATCH3_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `MATCH3_AI_PORT`: Port number (default: 7878)
//! - `MATCH3_AI_MAX_PENDING`: Bound on queued commands (default: 10)
//! - `MATCH3_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"role":"controller","client_id":1,...}
//! Server -> Client: {"type":"observation","seq":1,"board":{"width":8,"height":8,"cells":[...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"action":"swap","swaps":[{"source":2,"target":3}]}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! Server -> Client: {"type":"result","seq":2,"ts":...,"outcomes":[{"accepted":true,...}]}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use match3_core as core;
pub use match3_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{
    apply_inbound, build_observation, observation_line, Adapter, Applied, ClientCommand, InboundCommand,
    InboundPayload, OutboundMessage,
};
pub use server::{map_command, run_server, ServerConfig, ServerState, DEFAULT_PORT};
