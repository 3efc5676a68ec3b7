//! Consumer-side usage of the transport API with an in-memory backend.

use serde_json::{json, Map, Value};
use transport::{build_request, selector_of, DynTransport, Envelope, Transport, TransportError};

struct EchoTransport;

#[async_trait::async_trait]
impl Transport for EchoTransport {
    async fn send(&self, request: &Value) -> Result<Envelope, TransportError> {
        match selector_of(request) {
            Some("fail") => Err(TransportError::Http("connection refused".to_string())),
            Some("echo") => Ok(Envelope::ok(request.clone())),
            Some(other) => Ok(Envelope::error(404, format!("Unknown operation: {}", other))),
            None => Ok(Envelope::error(400, "Missing operation")),
        }
    }

    fn endpoint(&self) -> &str { "memory://" }
}

#[tokio::test]
async fn consumer_can_call_transport() {
    let t: DynTransport = std::sync::Arc::new(EchoTransport);
    let envelope = t.send(&build_request("echo", "1", Map::new())).await.expect("ok");
    assert!(envelope.is_success());
    assert_eq!(envelope.response["Operation"], "echo");
}

#[tokio::test]
async fn non_200_is_an_envelope_not_an_error() {
    let envelope = EchoTransport.send(&json!({"Operation": "nope"})).await.expect("delivered");
    assert_eq!(envelope.result, 404);
    assert_eq!(envelope.error_message().as_deref(), Some("Unknown operation: nope"));
}

#[tokio::test]
async fn consumer_sees_delivery_error() {
    let err = EchoTransport.send(&json!({"Operation": "fail"})).await.expect_err("should err");
    match err {
        TransportError::Http(msg) => assert!(msg.contains("refused")),
        _ => panic!("unexpected error variant"),
    }
}
