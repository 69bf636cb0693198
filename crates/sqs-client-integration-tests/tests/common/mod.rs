//! Common test utilities for sqs-client integration tests
//!
//! This module provides:
//! - An in-memory queue service served through a wiremock responder
//! - Server-side signature verification
//! - Helpers for building clients against a mock server

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqs_client::{Client, ClientConfig, Credentials, Region};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ACCESS_KEY: &str = "AKIDEXAMPLE";
pub const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";
pub const ACCOUNT_ID: &str = "000000000000";

// ============================================================================
// Request Inspection
// ============================================================================

/// Parameters of a request, from the query string or the form body
pub fn request_params(request: &Request) -> Vec<(String, String)> {
    let pairs: Vec<(String, String)> = if request.method.as_str() == "POST" {
        url::form_urlencoded::parse(&request.body)
            .into_owned()
            .collect()
    } else {
        request.url.query_pairs().into_owned().collect()
    };
    pairs
}

/// First value of `key` in `params`
pub fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Recompute the signature of `request` and compare it with the one sent
pub fn verify_signature(request: &Request, secret: &str) -> bool {
    let params = request_params(request);
    let Some(sent) = param(&params, "Signature") else {
        return false;
    };

    let mut pairs: Vec<String> = params
        .iter()
        .filter(|(k, _)| k != "Signature")
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    pairs.sort();

    let host = request
        .headers
        .get("host")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let payload = format!(
        "{}\n{}\n{}\n{}",
        request.method.as_str(),
        host,
        request.url.path(),
        pairs.join("&")
    );

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes()) == sent
}

pub fn error_response(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_string(format!(
        "<ErrorResponse><Error><Type>Sender</Type><Code>{}</Code><Message>{}</Message></Error>\
         <RequestId>req-error</RequestId></ErrorResponse>",
        code, message
    ))
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn ok_response(action: &str, result: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<{0}Response xmlns=\"http://queue.amazonaws.com/doc/2009-02-01/\">{1}\
         <ResponseMetadata><RequestId>req-{0}</RequestId></ResponseMetadata></{0}Response>",
        action, result
    ))
}

// ============================================================================
// In-Memory Queue Service
// ============================================================================

#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    body: String,
}

#[derive(Debug, Default)]
struct ServiceState {
    queues: BTreeMap<String, VecDeque<StoredMessage>>,
    in_flight: HashMap<String, (String, StoredMessage)>,
    actions: Vec<String>,
    next_id: u64,
}

/// Queue service that keeps its queues in memory and rejects badly signed
/// requests with 403
#[derive(Clone)]
pub struct InMemoryQueueService {
    base_url: String,
    secret: String,
    state: Arc<Mutex<ServiceState>>,
}

impl InMemoryQueueService {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret: secret.into(),
            state: Arc::new(Mutex::new(ServiceState::default())),
        }
    }

    /// Actions received so far, in order
    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    /// Names of the queues that currently exist
    pub fn queue_names(&self) -> Vec<String> {
        self.state.lock().unwrap().queues.keys().cloned().collect()
    }

    fn queue_url(&self, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, ACCOUNT_ID, name)
    }

    fn handle(&self, request: &Request) -> ResponseTemplate {
        if !verify_signature(request, &self.secret) {
            return error_response(
                403,
                "SignatureDoesNotMatch",
                "The request signature we calculated does not match the signature you provided.",
            );
        }

        let params = request_params(request);
        let action = param(&params, "Action").unwrap_or_default().to_string();
        let queue_name = request
            .url
            .path()
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let mut state = self.state.lock().unwrap();
        state.actions.push(action.clone());

        match action.as_str() {
            "CreateQueue" => {
                let name = param(&params, "QueueName").unwrap_or_default();
                state.queues.entry(name.to_string()).or_default();
                ok_response(
                    "CreateQueue",
                    &format!(
                        "<CreateQueueResult><QueueUrl>{}</QueueUrl></CreateQueueResult>",
                        self.queue_url(name)
                    ),
                )
            }
            "ListQueues" => {
                let prefix = param(&params, "QueueNamePrefix").unwrap_or_default();
                let urls: String = state
                    .queues
                    .keys()
                    .filter(|name| name.starts_with(prefix))
                    .map(|name| format!("<QueueUrl>{}</QueueUrl>", self.queue_url(name)))
                    .collect();
                ok_response(
                    "ListQueues",
                    &format!("<ListQueuesResult>{}</ListQueuesResult>", urls),
                )
            }
            _ if !state.queues.contains_key(&queue_name) => error_response(
                400,
                "AWS.SimpleQueueService.NonExistentQueue",
                "The specified queue does not exist.",
            ),
            "DeleteQueue" => {
                state.queues.remove(&queue_name);
                ok_response("DeleteQueue", "")
            }
            "SendMessage" => {
                state.next_id += 1;
                let message = StoredMessage {
                    id: format!("mid-{}", state.next_id),
                    body: param(&params, "MessageBody").unwrap_or_default().to_string(),
                };
                let id = message.id.clone();
                if let Some(queue) = state.queues.get_mut(&queue_name) {
                    queue.push_back(message);
                }
                ok_response(
                    "SendMessage",
                    &format!(
                        "<SendMessageResult><MessageId>{}</MessageId></SendMessageResult>",
                        id
                    ),
                )
            }
            "ReceiveMessage" => {
                let message = state
                    .queues
                    .get_mut(&queue_name)
                    .and_then(|queue| queue.pop_front());
                let result = match message {
                    Some(message) => {
                        let receipt = format!("rh-{}", message.id);
                        let xml = format!(
                            "<Message><MessageId>{}</MessageId><ReceiptHandle>{}</ReceiptHandle>\
                             <Body>{}</Body></Message>",
                            message.id,
                            receipt,
                            escape_xml(&message.body)
                        );
                        state
                            .in_flight
                            .insert(receipt, (queue_name.clone(), message));
                        xml
                    }
                    None => String::new(),
                };
                ok_response(
                    "ReceiveMessage",
                    &format!("<ReceiveMessageResult>{}</ReceiveMessageResult>", result),
                )
            }
            "DeleteMessage" => {
                let receipt = param(&params, "ReceiptHandle").unwrap_or_default();
                match state.in_flight.remove(receipt) {
                    Some(_) => ok_response("DeleteMessage", ""),
                    None => error_response(
                        400,
                        "ReceiptHandleIsInvalid",
                        "The receipt handle is not valid.",
                    ),
                }
            }
            "ChangeMessageVisibility" => {
                let receipt = param(&params, "ReceiptHandle").unwrap_or_default();
                let timeout = param(&params, "VisibilityTimeout").unwrap_or_default();
                if timeout == "0" {
                    if let Some((queue, message)) = state.in_flight.remove(receipt) {
                        if let Some(queue) = state.queues.get_mut(&queue) {
                            queue.push_front(message);
                        }
                    }
                }
                ok_response("ChangeMessageVisibility", "")
            }
            "GetQueueAttributes" => {
                let count = state.queues.get(&queue_name).map(VecDeque::len).unwrap_or(0);
                ok_response(
                    "GetQueueAttributes",
                    &format!(
                        "<GetQueueAttributesResult><Attribute><Name>ApproximateNumberOfMessages\
                         </Name><Value>{}</Value></Attribute></GetQueueAttributesResult>",
                        count
                    ),
                )
            }
            other => error_response(
                400,
                "InvalidAction",
                &format!("The action {} is not valid for this endpoint.", other),
            ),
        }
    }
}

impl Respond for InMemoryQueueService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.handle(request)
    }
}

// ============================================================================
// Client Helpers
// ============================================================================

/// Start a mock server backed by an in-memory queue service
pub async fn start_queue_service() -> (MockServer, InMemoryQueueService) {
    let server = MockServer::start().await;
    let service = InMemoryQueueService::new(server.uri(), SECRET_KEY);

    Mock::given(any())
        .respond_with(service.clone())
        .mount(&server)
        .await;

    (server, service)
}

/// Client for `server` signing with the test credentials
pub fn client_for(server: &MockServer, config: ClientConfig) -> Client {
    Client::with_config(
        Credentials::new(ACCESS_KEY, SECRET_KEY),
        Region::custom("local", server.uri()),
        config,
    )
    .unwrap()
}
