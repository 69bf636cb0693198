//! # SQS Client
//!
//! Client for hosted message queues speaking the signed query protocol
//! (API version `2009-02-01`).
//!
//! This library provides:
//! - Queue lifecycle: create, list, look up by name, delete
//! - Message exchange: send, receive, delete, change visibility
//! - Queue attributes and cross-account permissions
//! - Signature version 2 request signing
//!
//! ## Module Organization
//!
//! - [`credentials`] - Credentials and regions
//! - [`params`] - Request parameters and their canonical form
//! - [`signer`] - HMAC-SHA256 request signing
//! - [`request`] - Signed request construction
//! - [`response`] - XML response decoding
//! - [`client`] - Client and account-level operations
//! - [`queue`] - Queue handle and per-queue operations
//! - [`message`] - Messages, attributes and permissions
//! - [`error`] - Error types

// Module declarations
pub mod client;
pub mod credentials;
pub mod error;
pub mod message;
pub mod params;
pub mod queue;
pub mod request;
pub mod response;
pub mod signer;

// Re-export commonly used types at crate root for convenience
pub use client::{Client, ClientConfig, CreateQueueOptions};
pub use credentials::{Credentials, Region, SecretKey};
pub use error::{ConfigurationError, ServiceError, SqsError};
pub use message::{
    Attribute, AttributeValue, Message, MessageId, Permission, PermissionAction, QueueAttributes,
    ReceiptHandle,
};
pub use params::{Params, SignedParams};
pub use queue::Queue;
pub use request::{PreparedRequest, RequestBuilder, RequestStyle, API_VERSION};
pub use signer::Signer;
