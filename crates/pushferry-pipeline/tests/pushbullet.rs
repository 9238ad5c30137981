#![allow(unused_crate_dependencies)]
#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pushferry_pipeline::PushbulletClient;
use pushferry_types::{MessageFilter, MessageKind, NotificationSource, NotifyError};

fn filter_since(seconds: i64) -> MessageFilter {
    MessageFilter {
        modified_since: Utc.timestamp_opt(seconds, 0).unwrap(),
        kinds: vec![MessageKind::Link, MessageKind::Note],
        active_only: true,
    }
}

#[test_log::test(tokio::test)]
async fn list_messages_passes_filter_and_applies_kind_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pushes"))
        .and(header("Access-Token", "o.secret"))
        .and(query_param("modified_after", "1700000000"))
        .and(query_param("active", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pushes": [
                {
                    "iden": "p-link",
                    "type": "link",
                    "url": "magnet:?xt=urn:btih:abc",
                    "target_device_iden": "dev-1",
                    "modified": 1700000100.0
                },
                {
                    "iden": "p-note",
                    "type": "note",
                    "body": "magnet:?xt=urn:btih:def",
                    "modified": 1700000200.5
                },
                {
                    "iden": "p-file",
                    "type": "file",
                    "file_url": "https://dl.pushbulletusercontent.com/x/y.torrent",
                    "modified": 1700000300.0
                },
                {
                    "iden": "p-mirror",
                    "type": "mirror",
                    "modified": 1700000400.0
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = PushbulletClient::with_base_url("o.secret", &server.uri()).unwrap();
    let messages = client.list_messages(&filter_since(1_700_000_000)).await.unwrap();

    // The file push is excluded by the kind filter and the mirror push has
    // no model at all.
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, "p-link");
    assert_eq!(messages[0].kind, MessageKind::Link);
    assert_eq!(messages[0].url.as_deref(), Some("magnet:?xt=urn:btih:abc"));
    assert_eq!(messages[0].target_device_id.as_deref(), Some("dev-1"));
    assert_eq!(messages[1].id, "p-note");
    assert_eq!(messages[1].kind, MessageKind::Note);
    assert_eq!(messages[1].body, "magnet:?xt=urn:btih:def");
    assert_eq!(messages[1].modified_at.timestamp_millis(), 1_700_000_200_500);
}

#[test_log::test(tokio::test)]
async fn list_messages_maps_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pushes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = PushbulletClient::with_base_url("o.revoked", &server.uri()).unwrap();
    let err = client.list_messages(&filter_since(0)).await.unwrap_err();
    assert!(matches!(err, NotifyError::Unauthorized));
}

#[test_log::test(tokio::test)]
async fn post_message_sends_a_note_to_the_device() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pushes"))
        .and(header("Access-Token", "o.secret"))
        .and(body_partial_json(json!({
            "type": "note",
            "device_iden": "dev-1",
            "title": "Torrent added",
            "body": "Added \"ubuntu.iso\""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"iden": "p-new"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = PushbulletClient::with_base_url("o.secret", &server.uri()).unwrap();
    client
        .post_message("dev-1", "Torrent added", "Added \"ubuntu.iso\"")
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn list_devices_skips_inactive_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "iden": "d-old", "nickname": "pushferry", "active": false },
                { "iden": "d-new", "nickname": "pushferry", "active": true }
            ]
        })))
        .mount(&server)
        .await;

    let client = PushbulletClient::with_base_url("o.secret", &server.uri()).unwrap();
    let devices = client.list_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "d-new");
    assert_eq!(devices[0].nickname, "pushferry");
}

#[test_log::test(tokio::test)]
async fn create_device_returns_the_new_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/devices"))
        .and(body_partial_json(json!({"nickname": "pushferry"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "iden": "d-created",
            "nickname": "pushferry",
            "active": true
        })))
        .mount(&server)
        .await;

    let client = PushbulletClient::with_base_url("o.secret", &server.uri()).unwrap();
    let device = client.create_device("pushferry").await.unwrap();
    assert_eq!(device.id, "d-created");
    assert_eq!(device.nickname, "pushferry");
}

#[test_log::test(tokio::test)]
async fn server_errors_map_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PushbulletClient::with_base_url("o.secret", &server.uri()).unwrap();
    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, NotifyError::ServerError(_)));
}
