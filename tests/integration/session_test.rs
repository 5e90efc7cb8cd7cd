// tests/integration/session_test.rs

//! End-to-end session tests over real TCP connections: framing, silent
//! rejection, classification, idle timeout, and session termination.

use super::fixtures::*;
use super::test_helpers::{ServerHarness, test_config};
use fenceline::core::roster::ClientRole;
use fenceline::core::store::{LOCATION_SENTINEL, ZONE_SENTINEL};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::timeout;

/// Polls `cond` for up to two seconds before failing the test.
async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not met within 2s");
}

#[tokio::test]
async fn test_full_tracking_scenario() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    // Record a location; no reply is expected.
    client
        .send(format!("setLocation {DEVICE2} {LOCATION1}"))
        .await
        .unwrap();

    // Read it back.
    client.send(format!("getLocation {DEVICE2}")).await.unwrap();
    let reply = client.next().await.unwrap().unwrap();
    assert_eq!(reply, LOCATION1);

    // Assign a zone; again no reply.
    client
        .send(format!("setZone {DEVICE2} {ZONE_SINGLE}"))
        .await
        .unwrap();

    client.send(format!("getZone {DEVICE2}")).await.unwrap();
    let reply = client.next().await.unwrap().unwrap();
    assert_eq!(reply, ZONE_SINGLE);

    // Goodbye ends the session with no parting frame.
    client.send("Goodbye".to_string()).await.unwrap();
    let closed = timeout(Duration::from_secs(2), client.next()).await.unwrap();
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_unknown_device_sentinels_over_the_wire() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    client.send(format!("getLocation {DEVICE1}")).await.unwrap();
    assert_eq!(client.next().await.unwrap().unwrap(), LOCATION_SENTINEL);

    client.send(format!("getZone {DEVICE1}")).await.unwrap();
    assert_eq!(client.next().await.unwrap().unwrap(), ZONE_SENTINEL);
}

#[tokio::test]
async fn test_malformed_lines_are_dropped_silently() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    // None of these produce a reply or end the session.
    for line in MALFORMED_LINES {
        client.send(line.to_string()).await.unwrap();
    }

    // The next valid command is answered as if nothing happened, and no
    // reply frames queued up in between.
    client.send(format!("getLocation {DEVICE1}")).await.unwrap();
    let reply = client.next().await.unwrap().unwrap();
    assert_eq!(reply, LOCATION_SENTINEL);

    assert_eq!(
        harness.state.stats.get_rejected_commands(),
        MALFORMED_LINES.len() as u64
    );

    // Rejected lines never reach the store.
    assert_eq!(harness.state.store.device_count(), 1);
}

#[tokio::test]
async fn test_multi_line_zone_in_one_frame() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    client
        .send(format!("setZone {DEVICE1} {ZONE_MULTI}"))
        .await
        .unwrap();
    client.send(format!("getZone {DEVICE1}")).await.unwrap();
    assert_eq!(client.next().await.unwrap().unwrap(), ZONE_MULTI);
}

#[tokio::test]
async fn test_set_zone_classifies_peer_as_observer() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    client
        .send(format!("setZone {DEVICE1} {ZONE_SINGLE}"))
        .await
        .unwrap();
    client.send(format!("getZone {DEVICE1}")).await.unwrap();
    client.next().await.unwrap().unwrap();

    let peer_ip = harness.addr.ip();
    assert_eq!(
        harness.state.roster.role_of(peer_ip),
        Some(ClientRole::Observer)
    );
}

#[tokio::test]
async fn test_set_location_classifies_peer_as_tracker() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    client
        .send(format!("setLocation {DEVICE1} {LOCATION1}"))
        .await
        .unwrap();
    client.send(format!("getLocation {DEVICE1}")).await.unwrap();
    client.next().await.unwrap().unwrap();

    assert_eq!(
        harness.state.roster.role_of(harness.addr.ip()),
        Some(ClientRole::Tracker)
    );
}

#[tokio::test]
async fn test_first_classification_wins_across_sessions() {
    let harness = ServerHarness::start().await;

    let mut observer = harness.connect().await;
    observer
        .send(format!("setZone {DEVICE1} {ZONE_SINGLE}"))
        .await
        .unwrap();
    observer.send(format!("getZone {DEVICE1}")).await.unwrap();
    observer.next().await.unwrap().unwrap();
    drop(observer);

    // A later session from the same address issues tracker-flavored verbs,
    // but the remembered classification stands.
    let mut tracker = harness.connect().await;
    tracker
        .send(format!("setLocation {DEVICE1} {LOCATION1}"))
        .await
        .unwrap();
    tracker.send(format!("getLocation {DEVICE1}")).await.unwrap();
    tracker.next().await.unwrap().unwrap();

    assert_eq!(
        harness.state.roster.role_of(harness.addr.ip()),
        Some(ClientRole::Observer)
    );
}

#[tokio::test]
async fn test_read_only_session_stays_unclassified() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    client.send(format!("getLocation {DEVICE1}")).await.unwrap();
    client.next().await.unwrap().unwrap();
    client.send(format!("getZone {DEVICE1}")).await.unwrap();
    client.next().await.unwrap().unwrap();

    assert_eq!(harness.state.roster.role_of(harness.addr.ip()), None);
}

#[tokio::test]
async fn test_idle_session_is_closed() {
    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(data_dir.path());
    config.idle_timeout = Duration::from_millis(300);

    let harness = ServerHarness::start_with_config(config, data_dir).await;
    let mut client = harness.connect().await;

    // Say nothing; the server hangs up once the idle timeout passes.
    let closed = timeout(Duration::from_secs(3), client.next()).await.unwrap();
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_activity_resets_idle_timer() {
    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(data_dir.path());
    config.idle_timeout = Duration::from_millis(400);

    let harness = ServerHarness::start_with_config(config, data_dir).await;
    let mut client = harness.connect().await;

    // Keep the session alive past several timeout spans with steady traffic.
    for _ in 0..4 {
        tokio::time::sleep(Duration::from_millis(200)).await;
        client.send(format!("getLocation {DEVICE1}")).await.unwrap();
        let reply = timeout(Duration::from_secs(1), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(reply, LOCATION_SENTINEL);
    }
}

#[tokio::test]
async fn test_session_is_deregistered_after_goodbye() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    client.send(format!("getLocation {DEVICE1}")).await.unwrap();
    client.next().await.unwrap().unwrap();
    assert_eq!(harness.state.clients.len(), 1);

    client.send("Goodbye".to_string()).await.unwrap();
    assert!(client.next().await.is_none());

    let state = harness.state.clone();
    wait_for(move || state.clients.is_empty()).await;
}

#[tokio::test]
async fn test_abrupt_disconnect_mid_frame_cleans_up() {
    use tokio::io::AsyncWriteExt;

    let harness = ServerHarness::start().await;
    let mut socket = tokio::net::TcpStream::connect(harness.addr).await.unwrap();

    // A header promising more bytes than ever arrive, then a hard close.
    socket.write_all(b"\x00\x40partial").await.unwrap();
    socket.shutdown().await.unwrap();
    drop(socket);

    let state = harness.state.clone();
    wait_for(move || state.clients.is_empty()).await;
}

#[tokio::test]
async fn test_command_counters_and_events() {
    let harness = ServerHarness::start().await;
    let mut client = harness.connect().await;

    client
        .send(format!("setLocation {DEVICE2} {LOCATION1}"))
        .await
        .unwrap();
    client.send("nonsense".to_string()).await.unwrap();
    client.send(format!("getLocation {DEVICE2}")).await.unwrap();
    client.next().await.unwrap().unwrap();

    assert_eq!(harness.state.stats.get_total_connections(), 1);
    assert_eq!(harness.state.stats.get_total_commands(), 2);
    assert_eq!(harness.state.stats.get_rejected_commands(), 1);

    let events = harness.state.events.recent();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].verb, "setLocation");
    assert_eq!(events[0].reply, None);
    assert_eq!(events[1].verb, "getLocation");
    assert_eq!(events[1].reply.as_deref(), Some(LOCATION1));
}
