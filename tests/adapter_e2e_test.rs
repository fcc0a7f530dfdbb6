use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use match3::adapter::protocol::{create_hello, RequestedRole};
use match3::adapter::server::{run_server, ServerConfig};
use match3::adapter::{
    apply_inbound, ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
};
use match3::core::{Game, GameConfig};

type Reader = Lines<BufReader<OwnedReadHalf>>;

async fn start(max_pending: usize) -> (
    std::net::SocketAddr,
    mpsc::Receiver<InboundCommand>,
    mpsc::UnboundedSender<OutboundMessage>,
    tokio::task::JoinHandle<()>,
) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: max_pending,
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    (addr, cmd_rx, out_tx, server_handle)
}

async fn connect(addr: std::net::SocketAddr) -> (Reader, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half).lines(), write_half)
}

async fn send_line(w: &mut OwnedWriteHalf, line: &str) {
    w.write_all(line.as_bytes()).await.unwrap();
    w.write_all(b"\n").await.unwrap();
    w.flush().await.unwrap();
}

async fn next_json(lines: &mut Reader) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for a line")
        .unwrap()
        .expect("connection closed");
    serde_json::from_str(&line).unwrap()
}

async fn next_inbound(rx: &mut mpsc::Receiver<InboundCommand>) -> InboundCommand {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a command")
        .expect("command channel closed")
}

fn deliver(out_tx: &mpsc::UnboundedSender<OutboundMessage>, msgs: Vec<OutboundMessage>) {
    for m in msgs {
        out_tx.send(m).unwrap();
    }
}

#[tokio::test]
async fn adapter_hello_swap_ack_result_and_observation() {
    let (addr, mut cmd_rx, out_tx, server_handle) = start(8).await;
    let (mut lines, mut w) = connect(addr).await;
    let mut game = Game::initialize(GameConfig::default()).unwrap();

    // hello -> welcome
    let hello = create_hello(1, "e2e-test", None);
    send_line(&mut w, &serde_json::to_string(&hello).unwrap()).await;
    let welcome = next_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["game_id"], "match3");

    // The handshake asks the game loop for an immediate observation.
    let inbound = next_inbound(&mut cmd_rx).await;
    assert!(matches!(inbound.payload, InboundPayload::SnapshotRequest));
    deliver(&out_tx, apply_inbound(&mut game, inbound).messages);
    let obs = next_json(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["board"]["width"], 8);
    assert_eq!(obs["board"]["cells"].as_array().unwrap().len(), 64);
    assert_eq!(obs["score"], 0);
    assert_eq!(obs["state_hash"].as_str().unwrap().len(), 16);

    // command -> inbound swaps
    let legal = game.legal_moves();
    let m = legal.first().copied().expect("seeded board has a legal move");
    let cmd = format!(
        r#"{{"type":"command","seq":2,"ts":1,"action":"swap","swaps":[{{"source":0,"target":10}},{{"source":{},"target":{}}}]}}"#,
        m.source, m.target
    );
    send_line(&mut w, &cmd).await;

    let inbound = next_inbound(&mut cmd_rx).await;
    assert_eq!(inbound.seq, 2);
    match &inbound.payload {
        InboundPayload::Command(ClientCommand::Swaps(s)) => assert_eq!(s.len(), 2),
        other => panic!("unexpected payload {:?}", other),
    }

    // ack and result after apply
    deliver(&out_tx, apply_inbound(&mut game, inbound).messages);
    let ack = next_json(&mut lines).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    let result = next_json(&mut lines).await;
    assert_eq!(result["type"], "result");
    assert_eq!(result["outcomes"][0]["accepted"], false);
    assert_eq!(result["outcomes"][0]["rejection"], "not_adjacent");
    assert_eq!(result["outcomes"][1]["accepted"], true);
    assert!(!result["outcomes"][1]["steps"].as_array().unwrap().is_empty());

    // broadcast observation reaches streaming clients
    let line = match3::adapter::observation_line(&game, 10).unwrap();
    out_tx.send(OutboundMessage::Broadcast { line }).unwrap();
    let obs = next_json(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["seq"], 10);
    assert_eq!(obs["moves"], 1);

    server_handle.abort();
}

#[tokio::test]
async fn adapter_rejects_commands_before_hello_and_from_observers() {
    let (addr, mut cmd_rx, _out_tx, server_handle) = start(8).await;

    let (mut lines, mut w) = connect(addr).await;
    let cmd = r#"{"type":"command","seq":1,"ts":1,"action":"restart"}"#;
    send_line(&mut w, cmd).await;
    let err = next_json(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");

    // First client becomes controller.
    let hello = create_hello(2, "controller", None);
    send_line(&mut w, &serde_json::to_string(&hello).unwrap()).await;
    assert_eq!(next_json(&mut lines).await["role"], "controller");
    let _ = next_inbound(&mut cmd_rx).await;

    // Second client observes and may not command.
    let (mut lines2, mut w2) = connect(addr).await;
    let hello = create_hello(1, "observer", Some(RequestedRole::Controller));
    send_line(&mut w2, &serde_json::to_string(&hello).unwrap()).await;
    let welcome = next_json(&mut lines2).await;
    assert_eq!(welcome["role"], "observer");
    assert_eq!(welcome["controller_id"], 1);
    let _ = next_inbound(&mut cmd_rx).await;

    send_line(&mut w2, r#"{"type":"command","seq":2,"ts":1,"action":"restart"}"#).await;
    let err = next_json(&mut lines2).await;
    assert_eq!(err["code"], "not_controller");

    // Stale seq from the controller.
    send_line(&mut w, r#"{"type":"command","seq":2,"ts":1,"action":"restart"}"#).await;
    let err = next_json(&mut lines).await;
    assert_eq!(err["code"], "invalid_command");

    // Unknown types and garbage are reported, not fatal.
    send_line(&mut w, r#"{"type":"dance","seq":5}"#).await;
    let err = next_json(&mut lines).await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 5);
    send_line(&mut w, "not json").await;
    assert_eq!(next_json(&mut lines).await["type"], "error");

    server_handle.abort();
}

#[tokio::test]
async fn adapter_promotes_next_client_when_controller_leaves() {
    let (addr, mut cmd_rx, _out_tx, server_handle) = start(8).await;

    let (mut lines1, mut w1) = connect(addr).await;
    send_line(&mut w1, &serde_json::to_string(&create_hello(1, "a", None)).unwrap()).await;
    assert_eq!(next_json(&mut lines1).await["role"], "controller");
    let _ = next_inbound(&mut cmd_rx).await;

    let (mut lines2, mut w2) = connect(addr).await;
    send_line(&mut w2, &serde_json::to_string(&create_hello(1, "b", None)).unwrap()).await;
    assert_eq!(next_json(&mut lines2).await["role"], "observer");
    let _ = next_inbound(&mut cmd_rx).await;

    drop(w1);
    drop(lines1);

    // Once the first client is gone the second one may command.
    let mut seq = 2;
    let mut promoted = false;
    for _ in 0..20 {
        let cmd = format!(r#"{{"type":"command","seq":{},"ts":1,"action":"restart"}}"#, seq);
        send_line(&mut w2, &cmd).await;
        let got = tokio::time::timeout(Duration::from_millis(100), cmd_rx.recv()).await;
        if let Ok(Some(inbound)) = got {
            assert!(matches!(
                inbound.payload,
                InboundPayload::Command(ClientCommand::Restart { seed: None })
            ));
            promoted = true;
            break;
        }
        // Drain the not_controller error before retrying.
        let _ = next_json(&mut lines2).await;
        seq += 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(promoted);

    server_handle.abort();
}

#[tokio::test]
async fn adapter_backpressure_returns_error() {
    let (addr, mut cmd_rx, _out_tx, server_handle) = start(1).await;
    let (mut lines, mut w) = connect(addr).await;

    let mut hello = create_hello(1, "e2e-test", None);
    hello.requested.stream_observations = false;
    send_line(&mut w, &serde_json::to_string(&hello).unwrap()).await;
    // welcome
    let _ = next_json(&mut lines).await;

    // Send two commands without draining cmd_rx; second should backpressure.
    send_line(&mut w, r#"{"type":"command","seq":2,"ts":1,"action":"restart"}"#).await;
    send_line(&mut w, r#"{"type":"command","seq":3,"ts":1,"action":"restart","seed":4}"#).await;

    let err = next_json(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["seq"], 3);
    assert_eq!(err["code"], "backpressure");

    let first = next_inbound(&mut cmd_rx).await;
    assert_eq!(first.seq, 2);

    server_handle.abort();
}

#[tokio::test]
async fn adapter_reports_deferred_observation_when_queue_is_full() {
    let (addr, mut cmd_rx, _out_tx, server_handle) = start(1).await;

    let (mut lines, mut w) = connect(addr).await;
    let mut hello = create_hello(1, "controller", None);
    hello.requested.stream_observations = false;
    send_line(&mut w, &serde_json::to_string(&hello).unwrap()).await;
    assert_eq!(next_json(&mut lines).await["role"], "controller");

    // Fill the queue and leave it undrained.
    send_line(&mut w, r#"{"type":"command","seq":2,"ts":1,"action":"restart"}"#).await;
    // A later command from the same client proves the first one was queued.
    send_line(&mut w, r#"{"type":"command","seq":3,"ts":1,"action":"restart"}"#).await;
    assert_eq!(next_json(&mut lines).await["code"], "backpressure");

    let (mut lines2, mut w2) = connect(addr).await;
    send_line(&mut w2, &serde_json::to_string(&create_hello(7, "late", None)).unwrap()).await;
    let welcome = next_json(&mut lines2).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["role"], "observer");
    let err = next_json(&mut lines2).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["seq"], 7);
    assert_eq!(err["code"], "backpressure");

    assert_eq!(next_inbound(&mut cmd_rx).await.seq, 2);

    server_handle.abort();
}
