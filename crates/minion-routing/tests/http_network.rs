//! `HttpNetwork` against a real HTTP server on a loopback port that plays
//! both the master and every peer minion.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

use minion_db::Database;
use minion_routing::{
    Confidence, DeliveryStatus, HttpNetwork, MinionNode, Network, NetworkConfig, NetworkError,
};
use minion_types::models::Message;

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

async fn register_minion(State(seen): State<Seen>, Json(body): Json<Value>) -> StatusCode {
    seen.lock().unwrap().push(("register".into(), body));
    StatusCode::OK
}

async fn retrieve_owner(State(seen): State<Seen>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    seen.lock().unwrap().push(("lookup".into(), body));
    match username.as_str() {
        "bob" => Json(json!({ "receiverMinionUrlIdentifier": "beta-id" })).into_response(),
        "gopher" => Json(json!({ "ReceiverMinionUrlIdentifier": "gamma-id" })).into_response(),
        "carol" => Json(json!({ "receiverMinionUrlIdentifier": "down" })).into_response(),
        "garbled" => (StatusCode::OK, "not json").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn receive(Path(id): Path<String>, State(seen): State<Seen>, Json(body): Json<Value>) -> StatusCode {
    seen.lock().unwrap().push((format!("receive {id}"), body));
    if id == "down" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Starts the remote side and returns a network pointed at it.
async fn remote() -> (HttpNetwork, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/registerMinion", post(register_minion))
        .route("/retrieveMinionUrlIdentifier", post(retrieve_owner))
        .route("/{id}/receive", post(receive))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let network = HttpNetwork::new(NetworkConfig {
        master_url: format!("http://{addr}"),
        peer_url_template: format!("http://{addr}/{{id}}/receive"),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    (network, seen)
}

fn message(to: &str) -> Message {
    Message {
        sender_name: "alice".into(),
        receiver_name: to.into(),
        sender_minion_url_identifier: "alpha-id".into(),
        receiver_minion_url_identifier: "beta-id".into(),
        content: "over the wire".into(),
        created_at: None,
    }
}

#[tokio::test]
async fn register_minion_posts_name_and_identifier() {
    let (net, seen) = remote().await;

    net.register_minion("alpha", "alpha-id").await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "register");
    assert_eq!(seen[0].1, json!({ "name": "alpha", "urlIdentifier": "alpha-id" }));
}

#[tokio::test]
async fn lookup_owner_reads_identifier() {
    let (net, seen) = remote().await;

    assert_eq!(net.lookup_owner("bob").await.unwrap(), "beta-id");
    assert_eq!(net.lookup_owner("gopher").await.unwrap(), "gamma-id");
    assert_eq!(seen.lock().unwrap()[0].1, json!({ "username": "bob" }));
}

#[tokio::test]
async fn lookup_owner_failures_classify_as_timeout() {
    let (net, _seen) = remote().await;

    let missing = net.lookup_owner("nobody").await.unwrap_err();
    assert!(matches!(missing, NetworkError::Status(404)));
    assert_eq!(missing.classify(), DeliveryStatus::Timeout);

    let garbled = net.lookup_owner("garbled").await.unwrap_err();
    assert!(matches!(garbled, NetworkError::Transport(_)));
    assert_eq!(garbled.classify(), DeliveryStatus::Timeout);
}

#[tokio::test]
async fn deliver_posts_message_to_peer() {
    let (net, seen) = remote().await;

    net.deliver("beta-id", &message("bob")).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "receive beta-id");
    assert_eq!(seen[0].1["receiverName"], "bob");
    assert_eq!(seen[0].1["senderMinionUrlIdentifier"], "alpha-id");
}

#[tokio::test]
async fn deliver_non_200_is_status_error() {
    let (net, _seen) = remote().await;

    let err = net.deliver("down", &message("carol")).await.unwrap_err();
    assert!(matches!(err, NetworkError::Status(503)));
    assert_eq!(err.classify(), DeliveryStatus::Timeout);
}

#[tokio::test]
async fn node_routes_through_master_and_peer() {
    let (net, seen) = remote().await;
    let db = Arc::new(Database::open_in_memory().unwrap());
    let node = MinionNode::with_shared_store(db.clone(), net, "alpha", "alpha-id");

    let report = node.send("alice", "bob", "hello").await.unwrap();
    assert_eq!(report.status, DeliveryStatus::Success);
    assert_eq!(report.resolution.confidence, Confidence::Master);
    let stored = db.get_latest_message("alice", "bob").unwrap().unwrap();
    assert_eq!(stored.receiver_minion_url_identifier, "beta-id");

    let report = node.send("alice", "carol", "hello?").await.unwrap();
    assert_eq!(report.status, DeliveryStatus::Timeout);
    let stored = db.get_latest_message("alice", "carol").unwrap().unwrap();
    assert_eq!(stored.receiver_minion_url_identifier, "");

    let calls: Vec<String> = seen.lock().unwrap().iter().map(|(c, _)| c.clone()).collect();
    assert_eq!(calls, vec!["lookup", "receive beta-id", "lookup", "receive down"]);
}
