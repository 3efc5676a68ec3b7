//! End-to-end behaviour of the mock server over HTTP.

use mock::{MockOptions, MockServer};
use orbit_http::HttpTransport;
use serde_json::{json, Map};
use transport::{build_request, MockRoute, RouteTable, Transport};

const WIRE: &str = "2.0.0-alpha.1";

fn table() -> RouteTable {
    RouteTable::new(
        WIRE,
        "hash",
        vec![
            MockRoute {
                dispatch_key: "checkWallet".to_string(),
                endpoint: "checkWallet".to_string(),
                response: r#"{"Response":{"exists":true},"Result":200}"#.to_string(),
                required_params: vec!["Address".to_string(), "Blockchain".to_string()],
            },
            MockRoute {
                dispatch_key: "getBlockCount".to_string(),
                endpoint: "getBlockCount".to_string(),
                response: r#"{"Response":{"Blocks":1024},"Result":200}"#.to_string(),
                required_params: vec!["Blockchain".to_string()],
            },
        ],
    )
}

#[tokio::test]
async fn serves_example_responses_over_http() {
    let handle = MockServer::start_local(table(), MockOptions::default()).await.expect("start");
    let transport = HttpTransport::new(handle.url());

    let params = json!({"Blockchain": "MainNet", "Address": "ab"}).as_object().cloned().expect("map");
    let envelope = transport.send(&build_request("checkWallet", WIRE, params)).await.expect("send");
    assert!(envelope.is_success());
    assert_eq!(envelope.response["exists"], true);

    let unknown = transport.send(&build_request("getNothing", WIRE, Map::new())).await.expect("send");
    assert_eq!(unknown.result, 404);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn raw_text_is_byte_identical_to_the_table() {
    let handle = MockServer::start_local(table(), MockOptions::default()).await.expect("start");
    let client = reqwest::Client::new();

    let text = client
        .post(handle.url())
        .json(&json!({"Operation": "getBlockCount", "Version": WIRE}))
        .send()
        .await
        .expect("post")
        .text()
        .await
        .expect("body");
    assert_eq!(text, r#"{"Response":{"Blocks":1024},"Result":200}"#);

    let health = client
        .get(format!("{}health", handle.url()))
        .send()
        .await
        .expect("get")
        .text()
        .await
        .expect("body");
    assert_eq!(health, r#"{"status":"ok"}"#);

    let preflight = client
        .request(reqwest::Method::OPTIONS, handle.url())
        .send()
        .await
        .expect("options");
    assert!(preflight.headers().contains_key("access-control-allow-origin"));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn strict_mode_rejects_foreign_versions() {
    let handle =
        MockServer::start_local(table(), MockOptions { strict: true }).await.expect("start");
    let transport = HttpTransport::new(handle.url());

    let params = json!({"Blockchain": "MainNet"}).as_object().cloned().expect("map");
    let envelope = transport.send(&build_request("getBlockCount", "1.0.0", params)).await.expect("send");
    assert_eq!(envelope.result, 400);

    handle.shutdown().await.expect("shutdown");
}
