use super::*;
use crate::state::test_helpers;

fn readings(list: &[(&str, i32)]) -> Vec<RssiReading> {
    list.iter()
        .map(|(mac, rssi)| RssiReading { beacon_id: (*mac).to_string(), rssi: *rssi })
        .collect()
}

fn location_request(beacons: Vec<RssiReading>, mode: Option<&str>, target: Option<&str>) -> Inbound {
    Inbound::Location {
        beacons,
        mode: mode.map(str::to_string),
        target: target.map(str::to_string),
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn open_and_close_session() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;
    assert_eq!(state.session_count().await, 1);

    close_session(&state, session_id).await;
    assert_eq!(state.session_count().await, 0);

    // Closing twice is harmless.
    close_session(&state, session_id).await;
}

#[tokio::test]
async fn unregistered_session_gets_an_error() {
    let state = test_helpers::test_app_state();
    let reply = handle_message(
        &state,
        uuid::Uuid::new_v4(),
        location_request(readings(&[("08:92:72:87:9C:72", -55)]), None, None),
    )
    .await;
    assert!(matches!(reply, Outbound::Error { .. }));
}

// =============================================================================
// Location
// =============================================================================

#[tokio::test]
async fn location_request_yields_position() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let reply = handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9C:72", -55)]), Some("PROXIMITY"), None),
    )
    .await;

    let Outbound::Location(response) = reply else {
        panic!("expected location reply");
    };
    assert_eq!(response.status, "ok");
    assert!((response.x - 789.0).abs() < f64::EPSILON);
    assert!((response.y - 184.0).abs() < f64::EPSILON);
    assert!((response.x_meter - 789.0 / 18.0).abs() < 1e-12);
    assert_eq!(response.nearest_room.as_deref(), Some("157"));
    assert!(response.has_route.is_none());

    let sessions = state.sessions.read().await;
    let session = sessions.get(&session_id).unwrap();
    assert!(session.last_location.is_some());
}

#[tokio::test]
async fn target_installs_an_active_route() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let reply = handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9B:0E", -55)]), Some("PROXIMITY"), Some("147")),
    )
    .await;

    let Outbound::Location(response) = reply else {
        panic!("expected location reply");
    };
    assert_eq!(response.has_route, Some(true));
    let path = response.path.expect("path present");
    assert!(path.len() >= 2);

    let sessions = state.sessions.read().await;
    let session = sessions.get(&session_id).unwrap();
    assert_eq!(session.active_route.as_deref(), Some(path.as_slice()));
}

#[tokio::test]
async fn absent_target_clears_the_route() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9B:0E", -55)]), Some("PROXIMITY"), Some("147")),
    )
    .await;
    assert!(state.sessions.read().await.get(&session_id).unwrap().has_active_route());

    let reply = handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9B:0E", -55)]), Some("PROXIMITY"), None),
    )
    .await;

    let Outbound::Location(response) = reply else {
        panic!("expected location reply");
    };
    assert!(response.has_route.is_none());
    assert!(!state.sessions.read().await.get(&session_id).unwrap().has_active_route());
}

#[tokio::test]
async fn empty_target_behaves_like_absent() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9B:0E", -55)]), Some("PROXIMITY"), Some("147")),
    )
    .await;
    handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9B:0E", -55)]), Some("PROXIMITY"), Some("")),
    )
    .await;

    assert!(!state.sessions.read().await.get(&session_id).unwrap().has_active_route());
}

#[tokio::test]
async fn unknown_target_reports_route_error_in_band() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let reply = handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9C:72", -55)]), Some("PROXIMITY"), Some("room-999")),
    )
    .await;

    let Outbound::Location(response) = reply else {
        panic!("route failure must not fail the location reply");
    };
    assert_eq!(response.status, "ok");
    assert_eq!(response.has_route, Some(false));
    assert!(response.route_error.unwrap().contains("room-999"));
    assert!(!state.sessions.read().await.get(&session_id).unwrap().has_active_route());
}

#[tokio::test]
async fn positioning_error_is_an_error_reply_and_state_is_untouched() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let reply = handle_message(&state, session_id, location_request(Vec::new(), None, None)).await;
    assert!(matches!(reply, Outbound::Error { .. }));

    let sessions = state.sessions.read().await;
    assert!(sessions.get(&session_id).unwrap().last_location.is_none());
}

#[tokio::test]
async fn invalid_mode_on_location_falls_back_silently() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    // Default is HYBRID; one beacon dispatches to proximity.
    let reply = handle_message(
        &state,
        session_id,
        location_request(readings(&[("08:92:72:87:9C:72", -55)]), Some("warp"), None),
    )
    .await;

    let Outbound::Location(response) = reply else {
        panic!("invalid mode on location must not error");
    };
    assert_eq!(response.mode, Mode::Proximity);
}

// =============================================================================
// setMode
// =============================================================================

#[tokio::test]
async fn set_mode_is_case_insensitive_and_process_wide() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let reply = handle_message(
        &state,
        session_id,
        Inbound::SetMode { mode: Some("weighted".to_string()) },
    )
    .await;

    let Outbound::ModeChanged { status, mode, .. } = reply else {
        panic!("expected modeChanged");
    };
    assert_eq!(status, "ok");
    assert_eq!(mode, Mode::Weighted);
    assert_eq!(state.default_mode.load(), Mode::Weighted);
}

#[tokio::test]
async fn set_mode_twice_is_idempotent() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let first = handle_message(&state, session_id, Inbound::SetMode { mode: Some("HYBRID".into()) }).await;
    let second = handle_message(&state, session_id, Inbound::SetMode { mode: Some("HYBRID".into()) }).await;

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
    assert_eq!(state.default_mode.load(), Mode::Hybrid);
}

#[tokio::test]
async fn set_mode_rejects_missing_and_unknown() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let reply = handle_message(&state, session_id, Inbound::SetMode { mode: None }).await;
    assert!(matches!(reply, Outbound::Error { .. }));

    let reply = handle_message(&state, session_id, Inbound::SetMode { mode: Some("warp".into()) }).await;
    let Outbound::Error { message, .. } = reply else {
        panic!("expected error");
    };
    assert!(message.contains("warp"));
    assert!(message.contains("PROXIMITY"));
}

// =============================================================================
// ping / rooms
// =============================================================================

#[tokio::test]
async fn ping_reports_connected_sessions() {
    let state = test_helpers::test_app_state();
    let first = open_session(&state).await;
    let _second = open_session(&state).await;

    let reply = handle_message(&state, first, Inbound::Ping).await;
    let Outbound::Pong { timestamp, connected_users } = reply else {
        panic!("expected pong");
    };
    assert_eq!(connected_users, 2);
    assert!(timestamp > 0);
}

#[tokio::test]
async fn rooms_lists_routable_destinations() {
    let state = test_helpers::test_app_state();
    let session_id = open_session(&state).await;

    let reply = handle_message(&state, session_id, Inbound::Rooms).await;
    let Outbound::Rooms { rooms } = reply else {
        panic!("expected rooms");
    };
    assert!(rooms.iter().any(|r| r.id == "room-147"));
    assert!(rooms.iter().any(|r| r.id == "entrance"));
    assert!(!rooms.iter().any(|r| r.id.starts_with("corridor-")));
}
