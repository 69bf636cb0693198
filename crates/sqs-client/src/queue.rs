//! Queue handle and the per-queue operations.

use crate::client::Client;
use crate::error::SqsError;
use crate::message::{Attribute, Message, MessageId, Permission, QueueAttributes, ReceiptHandle};
use crate::params::Params;
use crate::response::{
    EmptyResponse, FromXml, GetQueueAttributesResponse, ReceiveMessageResponse,
    SendMessageResponse,
};
use std::fmt;

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

/// Handle to one queue, addressed by its resource path.
///
/// The handle borrows the [`Client`] that produced it and holds no other
/// state, so it is cheap to create and discard.
#[derive(Debug, Clone)]
pub struct Queue<'a> {
    client: &'a Client,
    path: String,
}

impl<'a> Queue<'a> {
    pub(crate) fn new(client: &'a Client, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }

    /// Queue name: the last segment of the resource path
    pub fn name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    /// Resource path, e.g. `/123456789012/orders`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full URL of the queue on the client's endpoint
    pub fn url(&self) -> String {
        self.client.region().url_for(&self.path)
    }

    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// Delete the queue and every message in it
    pub async fn delete_queue(&self) -> Result<(), SqsError> {
        self.call::<EmptyResponse>("DeleteQueue", Params::new())
            .await
            .map(|_| ())
    }

    /// Send a message and return the id the service assigned to it
    pub async fn send_message(&self, body: &str) -> Result<MessageId, SqsError> {
        let params = Params::new().with("MessageBody", body);
        let response: SendMessageResponse = self.call("SendMessage", params).await?;
        Ok(response.message_id)
    }

    /// Receive at most one message; `None` when the queue returned nothing
    pub async fn receive_message(&self) -> Result<Option<Message>, SqsError> {
        let response: ReceiveMessageResponse = self.call("ReceiveMessage", Params::new()).await?;
        Ok(response.messages.into_iter().next())
    }

    /// Fetch the named attributes, sent as `Attribute.1`, `Attribute.2`, ...
    pub async fn get_queue_attributes(
        &self,
        attributes: &[Attribute],
    ) -> Result<QueueAttributes, SqsError> {
        let params: Params = attributes
            .iter()
            .enumerate()
            .map(|(i, attribute)| (format!("Attribute.{}", i + 1), attribute.as_str()))
            .collect();

        let response: GetQueueAttributesResponse =
            self.call("GetQueueAttributes", params).await?;
        Ok(response.attributes)
    }

    /// Set one queue attribute
    pub async fn set_queue_attribute(
        &self,
        attribute: Attribute,
        value: &str,
    ) -> Result<(), SqsError> {
        let params = Params::new()
            .with("Attribute.Name", attribute.as_str())
            .with("Attribute.Value", value);
        self.call::<EmptyResponse>("SetQueueAttributes", params)
            .await
            .map(|_| ())
    }

    pub async fn delete_message(&self, receipt_handle: &ReceiptHandle) -> Result<(), SqsError> {
        let params = Params::new().with("ReceiptHandle", receipt_handle.as_str());
        self.call::<EmptyResponse>("DeleteMessage", params)
            .await
            .map(|_| ())
    }

    /// Make a received message invisible for `timeout_secs` from now
    pub async fn change_message_visibility(
        &self,
        receipt_handle: &ReceiptHandle,
        timeout_secs: u32,
    ) -> Result<(), SqsError> {
        let params = Params::new()
            .with("ReceiptHandle", receipt_handle.as_str())
            .with("VisibilityTimeout", timeout_secs.to_string());
        self.call::<EmptyResponse>("ChangeMessageVisibility", params)
            .await
            .map(|_| ())
    }

    /// Grant actions on this queue to other accounts under `label`
    pub async fn add_permission(
        &self,
        label: &str,
        permissions: &[Permission],
    ) -> Result<(), SqsError> {
        let mut params = Params::new().with("Label", label);
        for (i, permission) in permissions.iter().enumerate() {
            params.set(format!("AWSAccountId.{}", i + 1), permission.account_id.as_str());
            params.set(format!("ActionName.{}", i + 1), permission.action.as_str());
        }

        self.call::<EmptyResponse>("AddPermission", params)
            .await
            .map(|_| ())
    }

    /// Revoke the grants made under `label`
    pub async fn remove_permission(&self, label: &str) -> Result<(), SqsError> {
        let params = Params::new().with("Label", label);
        self.call::<EmptyResponse>("RemovePermission", params)
            .await
            .map(|_| ())
    }

    async fn call<T: FromXml>(
        &self,
        action: &str,
        params: Params,
    ) -> Result<T, SqsError> {
        self.client.execute(action, &self.path, params).await
    }
}

impl fmt::Display for Queue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
