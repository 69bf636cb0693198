//! XML response decoding.
//!
//! Response bodies are parsed into a small element tree and typed responses
//! pick their fields out of it by path, relative to the document root:
//!
//! ```text
//! <SendMessageResponse>            <- root
//!   <SendMessageResult>
//!     <MessageId>...</MessageId>   <- "SendMessageResult/MessageId"
//!   </SendMessageResult>
//!   <ResponseMetadata>
//!     <RequestId>...</RequestId>   <- "ResponseMetadata/RequestId"
//!   </ResponseMetadata>
//! </SendMessageResponse>
//! ```

use crate::error::ServiceError;
use crate::message::{AttributeValue, Message, MessageId, QueueAttributes, ReceiptHandle};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;

/// XML could not be parsed or lacks a required element
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct XmlError {
    message: String,
}

impl XmlError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn missing(path: &str) -> Self {
        Self::new(format!("missing element {}", path))
    }
}

// ============================================================================
// Element Tree
// ============================================================================

/// Parsed XML element with its text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if root.is_some() {
                        return Err(XmlError::new("multiple root elements"));
                    }
                    stack.push(Self::named(e.local_name().as_ref()));
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::named(e.local_name().as_ref());
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => return Err(XmlError::new("multiple root elements")),
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| XmlError::new(format!("XML parsing error: {}", e)))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None if is_whitespace(&text) => {}
                        None => return Err(XmlError::new("text outside of root element")),
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::End(_)) => {
                    let mut finished = stack
                        .pop()
                        .ok_or_else(|| XmlError::new("unexpected closing tag"))?;
                    // Indentation between child elements is not content
                    if !finished.children.is_empty() && is_whitespace(&finished.text) {
                        finished.text.clear();
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(finished),
                        None => root = Some(finished),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XmlError::new(format!("XML parsing error: {}", e))),
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::new("unexpected end of document"));
        }
        root.ok_or_else(|| XmlError::new("document has no root element"))
    }

    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text_content(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// All elements at `path` (segments separated by `/`) below this element
    pub fn elements(&self, path: &str) -> Vec<&XmlElement> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(move |element| {
                    element.children.iter().filter(move |c| c.name == segment)
                })
                .collect();
        }
        current
    }

    /// First element at `path`
    pub fn element(&self, path: &str) -> Option<&XmlElement> {
        self.elements(path).into_iter().next()
    }

    /// Text of the first element at `path`
    pub fn text(&self, path: &str) -> Option<&str> {
        self.element(path).map(|e| e.text.as_str())
    }

    /// Text of every element at `path`
    pub fn texts(&self, path: &str) -> Vec<&str> {
        self.elements(path)
            .into_iter()
            .map(|e| e.text.as_str())
            .collect()
    }

    /// Text at `path`, or an error naming the missing element
    pub fn required_text(&self, path: &str) -> Result<&str, XmlError> {
        self.text(path).ok_or_else(|| XmlError::missing(path))
    }
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_whitespace())
}

// ============================================================================
// Typed Responses
// ============================================================================

/// Decoding of a typed response from a parsed document
pub trait FromXml: Sized {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError>;
}

/// Parse `body` and decode it as `T`
pub fn decode<T: FromXml>(body: &str) -> Result<T, XmlError> {
    let root = XmlElement::parse(body)?;
    T::from_xml(&root)
}

/// Protocol metadata present on every response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub request_id: String,
}

impl FromXml for ResponseMetadata {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        let request_id = root
            .text("ResponseMetadata/RequestId")
            .or_else(|| root.text("RequestId"))
            .unwrap_or_default()
            .to_string();
        Ok(Self { request_id })
    }
}

/// Response with no payload beyond metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyResponse {
    pub metadata: ResponseMetadata,
}

impl FromXml for EmptyResponse {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        Ok(Self {
            metadata: ResponseMetadata::from_xml(root)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQueuesResponse {
    pub queue_urls: Vec<String>,
    pub metadata: ResponseMetadata,
}

impl FromXml for ListQueuesResponse {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        Ok(Self {
            queue_urls: root
                .texts("ListQueuesResult/QueueUrl")
                .into_iter()
                .map(str::to_string)
                .collect(),
            metadata: ResponseMetadata::from_xml(root)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateQueueResponse {
    pub queue_url: String,
    pub metadata: ResponseMetadata,
}

impl FromXml for CreateQueueResponse {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        Ok(Self {
            queue_url: root.required_text("CreateQueueResult/QueueUrl")?.to_string(),
            metadata: ResponseMetadata::from_xml(root)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageResponse {
    pub message_id: MessageId,
    pub md5_of_message_body: Option<String>,
    pub metadata: ResponseMetadata,
}

impl FromXml for SendMessageResponse {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        Ok(Self {
            message_id: MessageId::new(root.required_text("SendMessageResult/MessageId")?),
            md5_of_message_body: root
                .text("SendMessageResult/MD5OfMessageBody")
                .map(str::to_string),
            metadata: ResponseMetadata::from_xml(root)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveMessageResponse {
    pub messages: Vec<Message>,
    pub metadata: ResponseMetadata,
}

impl FromXml for ReceiveMessageResponse {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        let messages = root
            .elements("ReceiveMessageResult/Message")
            .into_iter()
            .map(|message| -> Result<Message, XmlError> {
                Ok(Message {
                    id: MessageId::new(message.required_text("MessageId")?),
                    receipt_handle: ReceiptHandle::new(
                        message.text("ReceiptHandle").unwrap_or_default(),
                    ),
                    body: message.text("Body").unwrap_or_default().to_string(),
                    md5_of_body: message.text("MD5OfBody").map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            messages,
            metadata: ResponseMetadata::from_xml(root)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetQueueAttributesResponse {
    pub attributes: QueueAttributes,
    pub metadata: ResponseMetadata,
}

impl FromXml for GetQueueAttributesResponse {
    fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        let values = root
            .elements("GetQueueAttributesResult/Attribute")
            .into_iter()
            .map(|attribute| -> Result<AttributeValue, XmlError> {
                Ok(AttributeValue {
                    name: attribute.required_text("Name")?.to_string(),
                    value: attribute.text("Value").unwrap_or_default().to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            attributes: QueueAttributes::new(values),
            metadata: ResponseMetadata::from_xml(root)?,
        })
    }
}

// ============================================================================
// Error Documents
// ============================================================================

/// Build a [`ServiceError`] from a non-200 response.
///
/// Status code and text are always set. The service fields are filled from
/// the error document when it parses; otherwise they stay empty.
pub fn build_service_error(status_code: u16, status_text: &str, body: &str) -> ServiceError {
    let mut error = ServiceError::from_status(status_code, status_text);

    let root = match XmlElement::parse(body) {
        Ok(root) => root,
        Err(_) => return error,
    };

    let field = |name: &str| {
        root.text(&format!("Error/{}", name))
            .or_else(|| root.text(name))
            .unwrap_or_default()
            .to_string()
    };

    error.error_type = field("Type");
    error.code = field("Code");
    error.message = field("Message");
    error.request_id = root
        .text("RequestId")
        .or_else(|| root.text("Error/RequestId"))
        .or_else(|| root.text("ResponseMetadata/RequestId"))
        .unwrap_or_default()
        .to_string();

    error
}
