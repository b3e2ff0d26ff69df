use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::get;

use super::*;
use crate::error::NetworkCause;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Exchange {
    method: Method,
    body: Vec<u8>,
}

#[derive(Clone)]
struct MockState {
    exchanges: Arc<Mutex<Vec<Exchange>>>,
    status: StatusCode,
    reply: Vec<u8>,
}

struct MockServer {
    addr: SocketAddr,
    exchanges: Arc<Mutex<Vec<Exchange>>>,
}

impl MockServer {
    fn config(&self) -> HttpConfig {
        HttpConfig::new("127.0.0.1", self.addr.port())
    }

    fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.lock().expect("mock mutex should lock").clone()
    }
}

async fn handle(State(state): State<MockState>, method: Method, body: Bytes) -> (StatusCode, Vec<u8>) {
    state
        .exchanges
        .lock()
        .expect("mock mutex should lock")
        .push(Exchange { method, body: body.to_vec() });
    (state.status, state.reply.clone())
}

async fn spawn_mock(status: StatusCode, reply: &[u8]) -> MockServer {
    let exchanges = Arc::new(Mutex::new(Vec::new()));
    let state = MockState { exchanges: exchanges.clone(), status, reply: reply.to_vec() };
    let app = Router::new()
        .route("/apiw1", get(handle).post(handle))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    MockServer { addr, exchanges }
}

async fn unused_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    listener.local_addr().expect("probe addr").port()
}

#[tokio::test]
async fn is_connected_tracks_lifecycle() {
    let mut conn = HttpConnection::new(HttpConfig::default());
    assert!(!conn.is_connected());
    assert_eq!(conn.state(), ConnectionState::Disconnected);

    conn.connect().await.unwrap();
    assert!(conn.is_connected());
    assert_eq!(conn.state(), ConnectionState::Connected);

    conn.close().await.unwrap();
    assert!(!conn.is_connected());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn connect_completes_after_yielding() {
    let mut conn = HttpConnection::new(HttpConfig::default());
    let mut pending = conn.connect();
    assert!(futures_util::poll!(pending.as_mut()).is_pending());
    pending.await.unwrap();
    assert!(conn.is_connected());
}

#[tokio::test]
async fn connect_twice_is_a_no_op() {
    let mut conn = HttpConnection::new(HttpConfig::default());
    conn.connect().await.unwrap();
    conn.write(&[1, 2, 3]).await.unwrap();

    conn.connect().await.unwrap();
    assert!(conn.is_connected());
    assert_eq!(conn.buffered_len(), 3);
}

#[tokio::test]
async fn write_and_read_before_connect_fail() {
    let mut conn = HttpConnection::new(HttpConfig::default());
    assert!(matches!(conn.write(&[1, 2, 3, 4]).await, Err(TransportError::NotConnected)));
    assert!(matches!(conn.read().await, Err(TransportError::NotConnected)));
}

#[tokio::test]
async fn read_without_writes_fetches_and_returns_body_verbatim() {
    let mock = spawn_mock(StatusCode::OK, &[0xDE, 0xAD, 0xBE, 0xEF, 0x01]).await;
    let mut conn = HttpConnection::new(mock.config());
    conn.connect().await.unwrap();

    let reply = conn.read().await.unwrap();
    assert_eq!(reply, vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01]);
    assert_eq!(mock.exchanges(), vec![Exchange { method: Method::GET, body: Vec::new() }]);
}

#[tokio::test]
async fn writes_are_concatenated_into_one_post_body() {
    let mock = spawn_mock(StatusCode::OK, b"ack").await;
    let mut conn = HttpConnection::new(mock.config());
    conn.connect().await.unwrap();

    conn.write(&[0x01, 0x02]).await.unwrap();
    conn.write(&[]).await.unwrap();
    conn.write(&[0x03, 0x04, 0x05]).await.unwrap();
    assert_eq!(conn.buffered_len(), 5);

    let reply = conn.read().await.unwrap();
    assert_eq!(reply, b"ack".to_vec());
    assert_eq!(conn.buffered_len(), 0);
    assert_eq!(
        mock.exchanges(),
        vec![Exchange { method: Method::POST, body: vec![0x01, 0x02, 0x03, 0x04, 0x05] }]
    );
}

#[tokio::test]
async fn each_read_is_a_separate_exchange() {
    let mock = spawn_mock(StatusCode::OK, &[0x00]).await;
    let mut conn = HttpConnection::new(mock.config());
    conn.connect().await.unwrap();

    conn.write(&[0xAA]).await.unwrap();
    conn.read().await.unwrap();
    conn.read().await.unwrap();

    let exchanges = mock.exchanges();
    assert_eq!(exchanges.len(), 2);
    assert_eq!(exchanges[0], Exchange { method: Method::POST, body: vec![0xAA] });
    assert_eq!(exchanges[1], Exchange { method: Method::GET, body: Vec::new() });
}

#[tokio::test]
async fn binary_bodies_round_trip_untouched() {
    let all_bytes: Vec<u8> = (0..=255).collect();
    let mock = spawn_mock(StatusCode::OK, &all_bytes).await;
    let mut conn = HttpConnection::new(mock.config());
    conn.connect().await.unwrap();

    conn.write(&all_bytes).await.unwrap();
    let reply = conn.read().await.unwrap();
    assert_eq!(reply, all_bytes);
    assert_eq!(mock.exchanges()[0].body, all_bytes);
}

#[tokio::test]
async fn non_success_status_yields_remote_error_with_body() {
    let mock = spawn_mock(StatusCode::NOT_FOUND, b"auth key not found").await;
    let mut conn = HttpConnection::new(mock.config());
    conn.connect().await.unwrap();
    conn.write(&[0x01, 0x02, 0x03, 0x04]).await.unwrap();

    let err = conn.read().await.unwrap_err();
    match err {
        TransportError::Remote { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, b"auth key not found".to_vec());
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert_eq!(conn.buffered_len(), 0);
    assert!(conn.is_connected());
}

#[tokio::test]
async fn server_error_with_empty_body_is_remote_error() {
    let mock = spawn_mock(StatusCode::INTERNAL_SERVER_ERROR, &[]).await;
    let mut conn = HttpConnection::new(mock.config());
    conn.connect().await.unwrap();

    let err = conn.read().await.unwrap_err();
    assert!(matches!(err, TransportError::Remote { status: 500, ref body } if body.is_empty()));
}

#[tokio::test]
async fn refused_exchange_is_network_error_and_drops_queued_bytes() {
    let port = unused_port().await;
    let mut conn = HttpConnection::new(HttpConfig::new("127.0.0.1", port));
    conn.connect().await.unwrap();
    conn.write(&[0x01, 0x02, 0x03, 0x04]).await.unwrap();

    let err = conn.read().await.unwrap_err();
    assert!(matches!(err, TransportError::Network(NetworkCause::Http(_))));
    assert!(err.is_network());
    assert_eq!(conn.buffered_len(), 0);
}

#[tokio::test]
async fn close_twice_succeeds() {
    let mut conn = HttpConnection::new(HttpConfig::default());
    conn.connect().await.unwrap();
    conn.close().await.unwrap();
    conn.close().await.unwrap();
    assert!(!conn.is_connected());
}

#[tokio::test]
async fn close_on_never_connected_instance_succeeds() {
    let mut conn = HttpConnection::new(HttpConfig::default());
    conn.close().await.unwrap();
    assert!(!conn.is_connected());
}

#[tokio::test]
async fn reconnect_after_close_starts_with_empty_queue() {
    let mock = spawn_mock(StatusCode::OK, &[0x07]).await;
    let mut conn = HttpConnection::new(mock.config());
    conn.connect().await.unwrap();
    conn.write(&[0x01, 0x02]).await.unwrap();
    conn.close().await.unwrap();
    assert!(matches!(conn.read().await, Err(TransportError::NotConnected)));

    conn.connect().await.unwrap();
    assert_eq!(conn.buffered_len(), 0);
    assert_eq!(conn.read().await.unwrap(), vec![0x07]);
    assert_eq!(mock.exchanges(), vec![Exchange { method: Method::GET, body: Vec::new() }]);
}

#[tokio::test]
async fn usable_through_the_connection_trait_object() {
    let mock = spawn_mock(StatusCode::OK, &[0x42]).await;
    let mut conn: Box<dyn Connection> = Box::new(HttpConnection::new(mock.config()));
    conn.connect().await.unwrap();
    conn.write(&[0x10, 0x20, 0x30, 0x40]).await.unwrap();
    assert_eq!(conn.read().await.unwrap(), vec![0x42]);
    conn.close().await.unwrap();
    assert!(!conn.is_connected());
}
