use builderport_client::{Client, ClientConfig, ClientError, SessionState};
use builderport_client::proto::encode_text;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TOKEN: &str = "c1gtri32";

/// A scripted stand-in for the BuilderPort server: sends the observed
/// greeting (blank line + banner), then answers each command line with
/// the canned replies from `script`. Unknown commands get `ERROR 1`.
async fn spawn_server(script: Vec<(&'static str, Vec<String>)>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().unwrap().to_string();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        write_half.write_all(b"\r\n").await.unwrap();
        write_half
            .write_all(b"BuilderPort world editor ready\r\n")
            .await
            .unwrap();

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                return;
            }
            let cmd = line.trim_end_matches(['\r', '\n']);
            if cmd == "quit" {
                return;
            }
            let replies = script
                .iter()
                .find(|(expect, _)| *expect == cmd)
                .map(|(_, replies)| replies.clone())
                .unwrap_or_else(|| vec![format!("ERROR 1 {}", encode_text("unknown command"))]);
            for reply in replies {
                write_half.write_all(reply.as_bytes()).await.unwrap();
                write_half.write_all(b"\r\n").await.unwrap();
            }
        }
    });
    (addr, handle)
}

fn config_for(addr: &str) -> ClientConfig {
    ClientConfig {
        addr: addr.to_string(),
        token: TOKEN.to_string(),
        read_timeout_secs: 2,
    }
}

async fn authed_client(script: Vec<(&'static str, Vec<String>)>) -> (Client, JoinHandle<()>) {
    let mut full = vec![("hello c1gtri32 1", vec!["OK".to_string()])];
    full.extend(script);
    let (addr, handle) = spawn_server(full).await;
    let cfg = config_for(&addr);
    let mut client = Client::connect(&cfg).await.expect("connect");
    client.hello(&cfg.token).await.expect("hello");
    (client, handle)
}

#[tokio::test]
async fn hello_consumes_greeting_and_authenticates() {
    let (client, _server) = authed_client(vec![]).await;
    assert_eq!(client.state(), SessionState::Idle);
}

#[tokio::test]
async fn command_before_hello_is_refused() {
    let (addr, _server) = spawn_server(vec![]).await;
    let mut client = Client::connect(&config_for(&addr)).await.unwrap();
    match client.command("wld_list").await {
        Err(ClientError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn wld_list_streams_zone_entries() {
    let (mut client, _server) = authed_client(vec![(
        "wld_list",
        vec![
            format!("DATA ZONE 468 {}", encode_text("The Open Road")),
            format!("DATA ZONE 469 {}", encode_text("Riverlands")),
            "END".to_string(),
        ],
    )])
    .await;

    let zones = client.list_zones().await.expect("wld_list");
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].vnum, 468);
    assert_eq!(zones[0].name, "The Open Road");
    assert!(!zones[1].name.is_empty());
}

#[tokio::test]
async fn blank_lines_before_a_reply_are_skipped() {
    let (mut client, _server) = authed_client(vec![(
        "wld_dump 46851",
        vec![
            String::new(),
            "DATA name QSBXaW5kc3dlcHQgUm9hZA==".to_string(),
            String::new(),
            "END".to_string(),
        ],
    )])
    .await;

    let rows = client.dump_room(46851).await.expect("wld_dump");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn server_error_carries_code_and_decoded_message() {
    let (mut client, _server) = authed_client(vec![(
        "wld_dump 1",
        vec![format!("ERROR 404 {}", encode_text("no such room"))],
    )])
    .await;

    match client.dump_room(1).await {
        Err(ClientError::Server(f)) => {
            assert_eq!(f.code, 404);
            assert_eq!(f.message(), "no such room");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn tx_begin_then_abort_round_trips() {
    let (mut client, _server) = authed_client(vec![
        ("tx_begin ZONES 468", vec!["OK".to_string()]),
        ("tx_abort", vec!["OK".to_string()]),
    ])
    .await;

    client.tx_begin("ZONES", 468).await.expect("tx_begin");
    assert_eq!(client.state(), SessionState::InTx);
    client.tx_abort().await.expect("tx_abort");
    assert_eq!(client.state(), SessionState::Idle);
}

#[tokio::test]
async fn tx_commit_without_open_transaction_is_refused_locally() {
    let (mut client, _server) = authed_client(vec![]).await;
    match client.tx_commit().await {
        Err(ClientError::Protocol(msg)) => assert!(msg.contains("no open transaction")),
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert_eq!(client.state(), SessionState::Idle);
}

#[tokio::test]
async fn nested_tx_begin_is_refused_locally() {
    let (mut client, _server) = authed_client(vec![(
        "tx_begin ZONES 0",
        vec!["OK".to_string()],
    )])
    .await;

    client.tx_begin("ZONES", 0).await.unwrap();
    match client.tx_begin("ZONES", 1).await {
        Err(ClientError::Protocol(msg)) => assert!(msg.contains("already open")),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn with_tx_commits_on_success() {
    let (mut client, _server) = authed_client(vec![
        ("tx_begin ZONES 468", vec!["OK".to_string()]),
        ("wld_dump 46851", vec!["DATA x eA==".to_string(), "END".to_string()]),
        ("tx_commit", vec!["OK".to_string()]),
    ])
    .await;

    let rows = client
        .with_tx("ZONES", 468, |c| {
            Box::pin(async move { c.dump_room(46851).await })
        })
        .await
        .expect("with_tx");
    assert_eq!(rows.len(), 1);
    assert_eq!(client.state(), SessionState::Idle);
}

#[tokio::test]
async fn with_tx_aborts_when_the_server_refuses_the_commit() {
    let (mut client, _server) = authed_client(vec![
        ("tx_begin ZONES 468", vec!["OK".to_string()]),
        (
            "tx_commit",
            vec![format!("ERROR 9 {}", encode_text("commit rejected"))],
        ),
        ("tx_abort", vec!["OK".to_string()]),
    ])
    .await;

    let result = client
        .with_tx("ZONES", 468, |_| Box::pin(async { Ok(()) }))
        .await;

    match result {
        Err(ClientError::Server(f)) => {
            assert_eq!(f.code, 9);
            assert_eq!(f.message(), "commit rejected");
        }
        other => panic!("expected the commit error, got {other:?}"),
    }
    // The scope must have closed the transaction; the session is
    // reusable and a fresh tx_begin is not refused as nested.
    assert_eq!(client.state(), SessionState::Idle);
}

#[tokio::test]
async fn with_tx_aborts_on_error_and_returns_to_idle() {
    let (mut client, _server) = authed_client(vec![
        ("tx_begin ZONES 0", vec!["OK".to_string()]),
        ("tx_abort", vec!["OK".to_string()]),
    ])
    .await;

    let result: Result<(), _> = client
        .with_tx("ZONES", 0, |_| {
            Box::pin(async { Err(ClientError::Protocol("boom".to_string())) })
        })
        .await;

    match result {
        Err(ClientError::Protocol(msg)) => assert_eq!(msg, "boom"),
        other => panic!("expected the scope's own error, got {other:?}"),
    }
    assert_eq!(client.state(), SessionState::Idle);
}

#[tokio::test]
async fn silent_server_times_out_without_closing_the_session() {
    // Greeting only; the server never answers wld_list.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let _server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (_read_half, mut write_half) = stream.into_split();
        write_half.write_all(b"\r\nbanner\r\nOK\r\n").await.unwrap();
        // hold the socket open, say nothing more
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    });

    let mut cfg = config_for(&addr);
    cfg.read_timeout_secs = 1;
    let mut client = Client::connect(&cfg).await.unwrap();
    client.hello(&cfg.token).await.expect("hello");

    match client.stream("wld_list").await {
        Err(ClientError::Timeout) => {}
        other => panic!("expected timeout, got {other:?}"),
    }
    // An empty-buffer timeout does not poison the session.
    assert_eq!(client.state(), SessionState::Idle);
}

#[tokio::test]
async fn mid_line_timeout_poisons_the_session() {
    // The server starts a reply line but never finishes it: the
    // framing is gone and the session must not be reused.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let _server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (_read_half, mut write_half) = stream.into_split();
        write_half.write_all(b"\r\nbanner\r\nOK\r\n").await.unwrap();
        write_half.write_all(b"DATA ZO").await.unwrap(); // no newline
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    });

    let mut cfg = config_for(&addr);
    cfg.read_timeout_secs = 1;
    let mut client = Client::connect(&cfg).await.unwrap();
    client.hello(&cfg.token).await.expect("hello");

    match client.stream("wld_list").await {
        Err(ClientError::Protocol(msg)) => assert!(msg.contains("mid-line")),
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert_eq!(client.state(), SessionState::Closed);

    match client.command("wld_list").await {
        Err(ClientError::Closed) => {}
        other => panic!("expected closed session, got {other:?}"),
    }
}
