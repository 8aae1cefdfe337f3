use super::*;
use crate::state::test_helpers;

async fn connected_state() -> (AppState, Uuid) {
    let state = test_helpers::test_app_state();
    let session_id = services::session::open_session(&state).await;
    (state, session_id)
}

#[tokio::test]
async fn invalid_json_yields_error_reply() {
    let (state, session_id) = connected_state().await;
    let reply = process_inbound_text(&state, session_id, "{not json").await;
    assert!(matches!(reply, Outbound::Error { .. }));
}

#[tokio::test]
async fn unknown_message_type_yields_error_reply() {
    let (state, session_id) = connected_state().await;
    let reply = process_inbound_text(&state, session_id, r#"{"type":"teleport"}"#).await;
    assert!(matches!(reply, Outbound::Error { .. }));
}

#[tokio::test]
async fn missing_type_field_yields_error_reply() {
    let (state, session_id) = connected_state().await;
    let reply = process_inbound_text(&state, session_id, r#"{"beacons":[]}"#).await;
    assert!(matches!(reply, Outbound::Error { .. }));
}

#[tokio::test]
async fn ping_round_trips_through_dispatch() {
    let (state, session_id) = connected_state().await;
    let reply = process_inbound_text(&state, session_id, r#"{"type":"ping"}"#).await;
    let Outbound::Pong { connected_users, .. } = reply else {
        panic!("expected pong");
    };
    assert_eq!(connected_users, 1);
}

#[tokio::test]
async fn location_text_round_trips_through_dispatch() {
    let (state, session_id) = connected_state().await;
    let text = r#"{
        "type": "location",
        "beacons": [{"beaconId": "08:92:72:87:9C:72", "rssi": -55}],
        "mode": "PROXIMITY"
    }"#;
    let reply = process_inbound_text(&state, session_id, text).await;
    let Outbound::Location(response) = reply else {
        panic!("expected location reply");
    };
    assert!((response.x - 789.0).abs() < f64::EPSILON);
    assert_eq!(response.nearest_room.as_deref(), Some("157"));
}

#[tokio::test]
async fn mobile_format_beacon_keys_are_accepted_end_to_end() {
    let (state, session_id) = connected_state().await;
    // macAddress key, reversed byte order, rssi as string.
    let text = r#"{
        "type": "location",
        "beacons": [{"macAddress": "D6:8D:87:72:92:08", "rssi": "-60"}],
        "mode": "PROXIMITY"
    }"#;
    let reply = process_inbound_text(&state, session_id, text).await;
    let Outbound::Location(response) = reply else {
        panic!("expected location reply");
    };
    assert_eq!(response.nearest_room.as_deref(), Some("yemekhane"));
}

#[tokio::test]
async fn a_failed_message_does_not_poison_the_session() {
    let (state, session_id) = connected_state().await;

    let reply = process_inbound_text(&state, session_id, r#"{"type":"location","beacons":[]}"#).await;
    assert!(matches!(reply, Outbound::Error { .. }));

    // Session still registered and serving.
    let reply = process_inbound_text(&state, session_id, r#"{"type":"ping"}"#).await;
    assert!(matches!(reply, Outbound::Pong { .. }));
}
