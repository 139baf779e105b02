//! Tests for BloomdClient
//!
//! These tests verify:
//! - Argument validation before any I/O
//! - Connection lifecycle (lazy, eager, connect/disconnect idempotence)
//! - Wire lines produced for each operation
//! - Decoding of scalar and block replies
//! - Protocol errors and connection teardown

#[path = "../common/mod.rs"]
mod common;

use bloomd_client::protocol::hash_key;
use bloomd_client::{BloomdClient, BloomdError, Config, ConnectMode, CreateOptions};

use common::{
    client_for, closed_port, eager_client_for, local_config, MockServer, StalledServer,
};

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_port_zero_rejected_before_io() {
    let result = BloomdClient::with_addr("127.0.0.1", 0);
    assert!(matches!(result, Err(BloomdError::InvalidArgument(_))));

    // Eager mode must not dial either
    let config = Config::builder()
        .port(0)
        .connect_mode(ConnectMode::Eager)
        .build();
    assert!(matches!(
        BloomdClient::new(config),
        Err(BloomdError::InvalidArgument(_))
    ));
}

#[test]
fn test_empty_host_rejected_before_io() {
    assert!(matches!(
        BloomdClient::with_addr("", 8673),
        Err(BloomdError::InvalidArgument(_))
    ));

    let config = Config::builder()
        .host(" ")
        .connect_mode(ConnectMode::Eager)
        .build();
    assert!(matches!(
        BloomdClient::new(config),
        Err(BloomdError::InvalidArgument(_))
    ));
}

#[test]
fn test_valid_ports_accepted() {
    for port in [1u16, 80, 8673, 65535] {
        let client = BloomdClient::with_addr("127.0.0.1", port).unwrap();
        assert!(!client.is_connected());
        assert_eq!(client.config().port, port);
    }
}

#[test]
fn test_default_client_targets_localhost() {
    let client = BloomdClient::new(Config::default()).unwrap();
    assert_eq!(client.config().addr(), "localhost:8673");
    assert!(!client.is_connected());
}

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

#[test]
fn test_connect_disconnect_idempotent() {
    let server = MockServer::start(&[]);
    let mut client = client_for(server.port);

    assert!(!client.is_connected());
    assert!(client.connect().unwrap());
    assert!(client.is_connected());
    assert!(!client.connect().unwrap());

    assert!(client.disconnect());
    assert!(!client.is_connected());
    assert!(!client.disconnect());

    server.received();
}

#[test]
fn test_connect_refused() {
    let mut client = client_for(closed_port());

    let result = client.connect();
    assert!(matches!(result, Err(BloomdError::Connection(_))));
    assert!(!client.is_connected());
}

#[test]
fn test_lazy_client_connects_on_first_command() {
    let server = MockServer::start(&["Yes\n"]);
    let mut client = client_for(server.port);

    assert!(!client.is_connected());
    assert!(client.check("f", "foo").unwrap());
    assert!(client.is_connected());

    drop(client);
    assert_eq!(server.received(), vec![format!("check f {}", hash_key("foo"))]);
}

#[test]
fn test_eager_client_connects_in_constructor() {
    let server = MockServer::start(&["Done\n"]);
    let mut client = eager_client_for(server.port);

    assert!(client.is_connected());
    assert!(client.flush_filter("f").unwrap());

    drop(client);
    assert_eq!(server.received(), vec!["flush f"]);
}

#[test]
fn test_eager_client_fails_when_server_down() {
    let config = Config::builder()
        .host("127.0.0.1")
        .port(closed_port())
        .connect_mode(ConnectMode::Eager)
        .build();
    assert!(matches!(
        BloomdClient::new(config),
        Err(BloomdError::Connection(_))
    ));
}

#[test]
fn test_eager_client_does_not_redial_after_disconnect() {
    let server = MockServer::start(&[]);
    let mut client = eager_client_for(server.port);

    assert!(client.disconnect());
    assert!(matches!(
        client.check("f", "foo"),
        Err(BloomdError::Connection(_))
    ));
    assert!(!client.is_connected());

    server.received();
}

// =============================================================================
// Filter Management Tests
// =============================================================================

#[test]
fn test_create_filter_encoding() {
    let server = MockServer::start(&["Done\n", "Done\n", "Exists\n"]);
    let mut client = client_for(server.port);

    assert!(client.create_filter("plain", CreateOptions::new()).unwrap());
    assert!(client
        .create_filter(
            "tuned",
            CreateOptions::new()
                .capacity(1000)
                .probability(0.01)
                .in_memory(false),
        )
        .unwrap());
    assert!(!client.create_filter("plain", CreateOptions::new()).unwrap());

    drop(client);
    assert_eq!(
        server.received(),
        vec![
            "create plain",
            "create tuned capacity=1000 prob=0.01 in_memory=0",
            "create plain",
        ]
    );
}

#[test]
fn test_management_commands() {
    let server = MockServer::start(&[
        "Done\n",
        "Done\n",
        "Done\n",
        "Done\n",
        "Filter does not exist\n",
    ]);
    let mut client = client_for(server.port);

    assert!(client.close_filter("f").unwrap());
    assert!(client.clear_filter("f").unwrap());
    assert!(client.flush_filter("g").unwrap());
    assert!(client.drop_filter("g").unwrap());
    assert!(!client.drop_filter("missing").unwrap());

    // A domain failure is not a transport failure
    assert!(client.is_connected());

    drop(client);
    assert_eq!(
        server.received(),
        vec!["close f", "clear f", "flush g", "drop g", "drop missing"]
    );
}

#[test]
fn test_list_filters() {
    let server = MockServer::start(&[
        "START\nfoo 0.01 128 1000 2\nbar 0.02 64 500 1\nEND\n",
        "START\nEND\n",
    ]);
    let mut client = client_for(server.port);

    let records = client.list_filters(None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "foo");
    assert_eq!(records[0].probability, 0.01);
    assert_eq!(records[0].size, 128);
    assert_eq!(records[0].capacity, 1000);
    assert_eq!(records[0].items, 2);
    assert_eq!(records[1].name, "bar");
    assert_eq!(records[1].items, 1);

    assert!(client.list_filters(Some("zzz")).unwrap().is_empty());

    drop(client);
    assert_eq!(server.received(), vec!["list", "list zzz"]);
}

#[test]
fn test_info() {
    let server = MockServer::start(&[
        "START\ncapacity 100000\nchecks 0\nin_memory 1\nsize 0\nEND\n",
        "Filter does not exist\n",
        "START\nFilter does not exist\nEND\n",
    ]);
    let mut client = client_for(server.port);

    let info = client.info("f").unwrap();
    assert_eq!(info.len(), 4);
    assert_eq!(info["capacity"], "100000");
    assert_eq!(info["in_memory"], "1");

    assert!(client.info("missing").unwrap().is_empty());
    assert!(client.info("missing").unwrap().is_empty());

    drop(client);
    assert_eq!(server.received(), vec!["info f", "info missing", "info missing"]);
}

// =============================================================================
// Membership Tests
// =============================================================================

#[test]
fn test_set_and_check() {
    let server = MockServer::start(&["Yes\n", "No\n", "Yes\r\n", "No\n"]);
    let mut client = client_for(server.port);

    assert!(client.set("f", "foo").unwrap());
    assert!(!client.set("f", "foo").unwrap());
    assert!(client.check("f", "foo").unwrap());
    assert!(!client.check("f", "nope").unwrap());

    drop(client);
    let foo = hash_key("foo");
    assert_eq!(
        server.received(),
        vec![
            format!("set f {}", foo),
            format!("set f {}", foo),
            format!("check f {}", foo),
            format!("check f {}", hash_key("nope")),
        ]
    );
}

#[test]
fn test_bulk_and_multi_keyed_by_original_items() {
    let server = MockServer::start(&["Yes Yes No\n", "No Yes Yes\n"]);
    let mut client = client_for(server.port);

    let items = ["zeta", "alpha", "mid"];
    let added = client.bulk("f", &items).unwrap();
    assert_eq!(added.keys().collect::<Vec<_>>(), items);
    assert_eq!(added.get("zeta"), Some(true));
    assert_eq!(added.get("alpha"), Some(true));
    assert_eq!(added.get("mid"), Some(false));

    let owned: Vec<String> = vec!["mid".into(), "zeta".into(), "alpha".into()];
    let present = client.multi("f", &owned).unwrap();
    assert_eq!(present.len(), 3);
    assert_eq!(present.get("mid"), Some(false));
    assert_eq!(present.get("zeta"), Some(true));
    assert_eq!(present.get("alpha"), Some(true));

    drop(client);
    let keys = |list: &[&str]| list.iter().map(hash_key).collect::<Vec<_>>().join(" ");
    assert_eq!(
        server.received(),
        vec![
            format!("bulk f {}", keys(&items[..])),
            format!("multi f {}", keys(&["mid", "zeta", "alpha"][..])),
        ]
    );
}

#[test]
fn test_any_and_all() {
    let server = MockServer::start(&["No Yes No\n", "Yes No\n", "Yes Yes\n", "No No\n"]);
    let mut client = client_for(server.port);

    assert!(client.any("f", &["a", "b", "c"]).unwrap());
    assert!(!client.all("f", &["a", "b"]).unwrap());
    assert!(client.all("f", &["a", "b"]).unwrap());
    assert!(!client.any("f", &["a", "b"]).unwrap());

    drop(client);
    let received = server.received();
    assert_eq!(received.len(), 4);
    assert!(received.iter().all(|line| line.starts_with("multi f ")));
    // Every item is requested, even when the first answer already decides
    assert_eq!(received[0].split(' ').count(), 5);
}

#[test]
fn test_empty_item_lists_skip_the_round_trip() {
    let mut client = client_for(closed_port());
    let empty: [&str; 0] = [];

    assert!(!client.any("f", &empty).unwrap());
    assert!(client.all("f", &empty).unwrap());
    assert!(client.multi("f", &empty).unwrap().is_empty());
    assert!(client.bulk("f", &empty).unwrap().is_empty());
    assert!(!client.is_connected());

    assert!(matches!(
        client.multi("bad name", &empty),
        Err(BloomdError::InvalidArgument(_))
    ));
}

#[test]
fn test_multi_against_missing_filter() {
    let server = MockServer::start(&["Filter does not exist\n"]);
    let mut client = client_for(server.port);

    let statuses = client.multi("missing", &["a"]).unwrap();
    assert_eq!(statuses.get("a"), Some(false));
    assert!(client.is_connected());

    drop(client);
    server.received();
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_invalid_filter_name_rejected_before_io() {
    let mut client = client_for(closed_port());

    assert!(matches!(
        client.check("two words", "x"),
        Err(BloomdError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.create_filter("", CreateOptions::new()),
        Err(BloomdError::InvalidArgument(_))
    ));
    assert!(!client.is_connected());
}

#[test]
fn test_empty_response_is_protocol_error() {
    let server = MockServer::start(&["\n"]);
    let mut client = client_for(server.port);

    assert!(matches!(
        client.drop_filter("f"),
        Err(BloomdError::Protocol(_))
    ));
    assert!(!client.is_connected());

    server.received();
}

#[test]
fn test_server_hangup_is_protocol_error() {
    // Empty reply: the server reads the command and closes without answering
    let server = MockServer::start(&[""]);
    let mut client = client_for(server.port);

    assert!(matches!(client.set("f", "x"), Err(BloomdError::Protocol(_))));
    assert!(!client.is_connected());

    server.received();
}

#[test]
fn test_status_count_mismatch_drops_connection() {
    let server = MockServer::start(&["Yes No\n"]);
    let mut client = client_for(server.port);

    let result = client.bulk("f", &["a", "b", "c"]);
    assert!(matches!(result, Err(BloomdError::Protocol(_))));
    assert!(!client.is_connected());

    server.received();
}

#[test]
fn test_blank_line_in_block_is_protocol_error() {
    let server = MockServer::start(&["START\nfoo 0.01 128 1000 2\n\nEND\n"]);
    let mut client = client_for(server.port);

    assert!(matches!(
        client.list_filters(None),
        Err(BloomdError::Protocol(_))
    ));
    assert!(!client.is_connected());

    server.received();
}

#[test]
fn test_error_line_keeps_connection() {
    let server = MockServer::start(&[
        "Client Error: Bad arguments\n",
        "Client Error: Command not supported\n",
        "Yes\n",
    ]);
    let mut client = client_for(server.port);

    assert!(client.info("f").unwrap().is_empty());
    assert!(client.is_connected());

    assert!(client.list_filters(None).unwrap().is_empty());
    assert!(client.is_connected());

    // The next reply is still matched to the next command
    assert!(client.check("f", "foo").unwrap());

    drop(client);
    assert_eq!(
        server.received(),
        vec![
            "info f".to_string(),
            "list".to_string(),
            format!("check f {}", hash_key("foo")),
        ]
    );
}

#[test]
fn test_send_deadline_is_connection_error() {
    let server = StalledServer::start();
    let config = Config::builder()
        .host("127.0.0.1")
        .port(server.port)
        .write_timeout_ms(200)
        .read_timeout_ms(5000)
        .build();
    let mut client = BloomdClient::new(config).unwrap();

    // Roughly 20 MB of keys, far more than the socket buffers hold
    let items: Vec<String> = (0..500_000).map(|i| format!("item-{}", i)).collect();

    let started = std::time::Instant::now();
    let result = client.multi("f", &items);

    match result {
        Err(BloomdError::Connection(msg)) => assert!(msg.contains("send multi"), "{}", msg),
        other => panic!("Expected connection error, got {:?}", other.map(|m| m.len())),
    }
    assert!(!client.is_connected());
    assert!(started.elapsed() < std::time::Duration::from_secs(30));

    drop(client);
    server.release();
}

#[test]
fn test_lazy_client_redials_after_protocol_error() {
    let sessions: [&[&str]; 2] = [&["\n"], &["Yes\n"]];
    let server = MockServer::start_sessions(&sessions);
    let mut client = client_for(server.port);

    assert!(client.check("f", "foo").is_err());
    assert!(!client.is_connected());

    assert!(client.check("f", "foo").unwrap());
    assert!(client.is_connected());

    drop(client);
    assert_eq!(server.received().len(), 2);
}

#[test]
fn test_independent_clients_per_thread() {
    let servers: Vec<MockServer> = (0..4).map(|_| MockServer::start(&["Yes\n"])).collect();

    let handles: Vec<_> = servers
        .iter()
        .map(|server| {
            let config = local_config(server.port);
            std::thread::spawn(move || {
                let mut client = BloomdClient::new(config).unwrap();
                client.set("f", "item").unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    for server in servers {
        assert_eq!(server.received().len(), 1);
    }
}
