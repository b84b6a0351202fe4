use {
    axum::{
        Router,
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::put,
    },
    com::{Client, ClientConfig, ComError, SnapshotSink},
    std::{
        sync::{Arc, Mutex},
        time::Duration,
    },
    tokio::net::TcpListener,
};

#[derive(Debug, Clone)]
struct Received {
    headers: HeaderMap,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Received>>>;

async fn spawn_endpoint(status: StatusCode, delay: Duration) -> (String, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route(
            "/c/snapshot",
            put(
                move |State(log): State<Log>, headers: HeaderMap, body: Bytes| async move {
                    tokio::time::sleep(delay).await;
                    log.lock().unwrap().push(Received { headers, body });
                    status
                },
            ),
        )
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/c/snapshot"), log)
}

fn config(endpoint: &str) -> ClientConfig {
    ClientConfig::default()
        .with_endpoint(endpoint)
        .with_fingerprint("cam-01")
        .with_token("secret")
}

#[tokio::test]
async fn test_put_sends_identification_headers() {
    let (endpoint, log) = spawn_endpoint(StatusCode::NO_CONTENT, Duration::ZERO).await;
    let client = Client::new(config(&endpoint)).unwrap();

    let status = client
        .upload(Bytes::from_static(b"\xFF\xD8jpeg\xFF\xD9"))
        .await
        .unwrap();
    assert_eq!(status, 204);

    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let headers = &received[0].headers;
    assert_eq!(headers["accept"], "*/*");
    assert_eq!(headers["content-type"], "image/jpg");
    assert_eq!(headers["fingerprint"], "cam-01");
    assert_eq!(headers["token"], "secret");
    assert_eq!(&received[0].body[..], b"\xFF\xD8jpeg\xFF\xD9");
}

#[tokio::test]
async fn test_error_status_is_returned() {
    let (endpoint, _log) = spawn_endpoint(StatusCode::SERVICE_UNAVAILABLE, Duration::ZERO).await;
    let client = Client::new(config(&endpoint)).unwrap();
    let status = SnapshotSink::put(&client, Bytes::from_static(b"x")).await.unwrap();
    assert_eq!(status, 503);
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let (endpoint, _log) = spawn_endpoint(StatusCode::OK, Duration::from_secs(5)).await;
    let client =
        Client::new(config(&endpoint).with_timeout(Duration::from_millis(200))).unwrap();
    let result = client.upload(Bytes::from_static(b"x")).await;
    assert!(matches!(result, Err(ComError::Timeout)), "{result:?}");
}

#[tokio::test]
async fn test_refused_connection_is_an_error() {
    // bind and drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(config(&format!("http://{addr}/c/snapshot"))).unwrap();
    let result = client.upload(Bytes::from_static(b"x")).await;
    assert!(
        matches!(result, Err(ComError::Connection(_))),
        "{result:?}"
    );
}

#[test]
fn test_invalid_token_is_rejected() {
    let result = Client::new(config("http://127.0.0.1:1/").with_token("bad\ntoken"));
    assert!(matches!(result, Err(ComError::InvalidHeader(_))));
}

#[test]
fn test_config_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert!(!config.accept_invalid_certs());
    assert!(config.token().is_empty());
}
