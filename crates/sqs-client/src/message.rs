//! Message and attribute types exchanged with the queue service.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

// ============================================================================
// Identifiers
// ============================================================================

/// Service-assigned message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token identifying one receipt of a message, used to delete it or change
/// its visibility
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Messages
// ============================================================================

/// A message received from a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub receipt_handle: ReceiptHandle,
    pub body: String,
    /// MD5 digest of the body as reported by the service
    pub md5_of_body: Option<String>,
}

// ============================================================================
// Queue Attributes
// ============================================================================

/// Named queue attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Attribute {
    All,
    ApproximateNumberOfMessages,
    ApproximateNumberOfMessagesNotVisible,
    VisibilityTimeout,
    CreatedTimestamp,
    LastModifiedTimestamp,
    Policy,
    MaximumMessageSize,
    MessageRetentionPeriod,
    QueueArn,
}

impl Attribute {
    /// Every attribute, in declaration order
    pub const VARIANTS: [Attribute; 10] = [
        Self::All,
        Self::ApproximateNumberOfMessages,
        Self::ApproximateNumberOfMessagesNotVisible,
        Self::VisibilityTimeout,
        Self::CreatedTimestamp,
        Self::LastModifiedTimestamp,
        Self::Policy,
        Self::MaximumMessageSize,
        Self::MessageRetentionPeriod,
        Self::QueueArn,
    ];

    /// Wire name of the attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::ApproximateNumberOfMessages => "ApproximateNumberOfMessages",
            Self::ApproximateNumberOfMessagesNotVisible => "ApproximateNumberOfMessagesNotVisible",
            Self::VisibilityTimeout => "VisibilityTimeout",
            Self::CreatedTimestamp => "CreatedTimestamp",
            Self::LastModifiedTimestamp => "LastModifiedTimestamp",
            Self::Policy => "Policy",
            Self::MaximumMessageSize => "MaximumMessageSize",
            Self::MessageRetentionPeriod => "MessageRetentionPeriod",
            Self::QueueArn => "QueueArn",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|attr| attr.as_str() == s)
            .ok_or_else(|| format!("unknown queue attribute '{}'", s))
    }
}

/// One attribute as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeValue {
    pub name: String,
    pub value: String,
}

/// Attributes returned by GetQueueAttributes, in response order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueueAttributes {
    values: Vec<AttributeValue>,
}

impl QueueAttributes {
    pub fn new(values: Vec<AttributeValue>) -> Self {
        Self { values }
    }

    /// Value of the attribute with the given wire name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// Value of a typed attribute
    pub fn value_of(&self, attribute: Attribute) -> Option<&str> {
        self.get(attribute.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Permissions
// ============================================================================

/// Queue action that can be granted to another account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PermissionAction {
    /// Every action (`*`)
    All,
    SendMessage,
    ReceiveMessage,
    DeleteMessage,
    ChangeMessageVisibility,
    GetQueueAttributes,
}

impl PermissionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "*",
            Self::SendMessage => "SendMessage",
            Self::ReceiveMessage => "ReceiveMessage",
            Self::DeleteMessage => "DeleteMessage",
            Self::ChangeMessageVisibility => "ChangeMessageVisibility",
            Self::GetQueueAttributes => "GetQueueAttributes",
        }
    }
}

impl FromStr for PermissionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" | "All" => Ok(Self::All),
            "SendMessage" => Ok(Self::SendMessage),
            "ReceiveMessage" => Ok(Self::ReceiveMessage),
            "DeleteMessage" => Ok(Self::DeleteMessage),
            "ChangeMessageVisibility" => Ok(Self::ChangeMessageVisibility),
            "GetQueueAttributes" => Ok(Self::GetQueueAttributes),
            _ => Err(format!("unknown permission action '{}'", s)),
        }
    }
}

/// Grant of one action to one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub account_id: String,
    pub action: PermissionAction,
}

impl Permission {
    pub fn new(account_id: impl Into<String>, action: PermissionAction) -> Self {
        Self {
            account_id: account_id.into(),
            action,
        }
    }
}
