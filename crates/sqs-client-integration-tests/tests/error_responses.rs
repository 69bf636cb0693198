//! Service error decoding over real HTTP exchanges.

mod common;

use common::{client_for, error_response};
use sqs_client::{ClientConfig, SqsError};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn failing_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_forbidden_with_error_document() {
    let server = failing_server(ResponseTemplate::new(403).set_body_string(
        "<ErrorResponse><Error><Type>Sender</Type><Code>InvalidParameterValue</Code>\
         <Message>bad</Message></Error><RequestId>abc</RequestId></ErrorResponse>",
    ))
    .await;
    let client = client_for(&server, ClientConfig::default());

    let error = client.list_queues(None).await.unwrap_err();

    assert_eq!(error.to_string(), "bad");
    match error {
        SqsError::Service(e) => {
            assert_eq!(e.status_code, 403);
            assert_eq!(e.status_text, "Forbidden");
            assert_eq!(e.error_type, "Sender");
            assert_eq!(e.code, "InvalidParameterValue");
            assert_eq!(e.message, "bad");
            assert_eq!(e.request_id, "abc");
        }
        other => panic!("Expected Service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_with_garbage_body() {
    let server = failing_server(
        ResponseTemplate::new(500).set_body_string("<html><h1>500 Internal Server Error"),
    )
    .await;
    let client = client_for(&server, ClientConfig::default());

    let error = client.create_queue("q1", None).await.unwrap_err();

    assert_eq!(error.status_code(), Some(500));
    match error {
        SqsError::Service(e) => {
            assert_eq!(e.status_text, "Internal Server Error");
            assert!(e.error_type.is_empty());
            assert!(e.code.is_empty());
            assert!(e.message.is_empty());
            assert!(e.request_id.is_empty());
        }
        other => panic!("Expected Service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unavailable_with_empty_body() {
    let server = failing_server(ResponseTemplate::new(503)).await;
    let client = client_for(&server, ClientConfig::default());

    let error = client.list_queues(None).await.unwrap_err();

    match error {
        SqsError::Service(e) => {
            assert_eq!(e.status_code, 503);
            assert_eq!(e.status_text, "Service Unavailable");
        }
        other => panic!("Expected Service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_on_queue_operation() {
    let server = MockServer::start().await;
    Mock::given(query_param("Action", "SendMessage"))
        .respond_with(error_response(
            400,
            "InvalidMessageContents",
            "The message contains characters outside the allowed set.",
        ))
        .mount(&server)
        .await;
    let client = client_for(&server, ClientConfig::default());

    let queue = client
        .queue_from_url(&format!("{}/000000000000/orders", server.uri()))
        .unwrap();
    let error = queue.send_message("\u{1}").await.unwrap_err();

    match error {
        SqsError::Service(e) => {
            assert_eq!(e.code, "InvalidMessageContents");
            assert_eq!(e.request_id, "req-error");
        }
        other => panic!("Expected Service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_truncated_success_body_is_decode_error() {
    let server = failing_server(
        ResponseTemplate::new(200).set_body_string("<SendMessageResponse><SendMessageResult>"),
    )
    .await;
    let client = client_for(&server, ClientConfig::default());

    let queue = client
        .queue_from_url(&format!("{}/000000000000/orders", server.uri()))
        .unwrap();
    let error = queue.send_message("hi").await.unwrap_err();

    assert!(matches!(error, SqsError::Decode { ref action, .. } if action.as_str() == "SendMessage"));
    assert_eq!(error.status_code(), None);
}
