//! Queue service client and the account-level operations.
//!
//! A [`Client`] owns the credentials, the region and an HTTP client. Every
//! operation issues exactly one signed request and waits for its response;
//! nothing is retried.

use crate::credentials::{Credentials, Region};
use crate::error::SqsError;
use crate::params::Params;
use crate::queue::Queue;
use crate::request::{Clock, RequestBuilder, RequestStyle};
use crate::response::{
    build_service_error, CreateQueueResponse, FromXml, ListQueuesResponse, ResponseMetadata,
    XmlElement,
};
use crate::signer::Signer;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Configuration for the queue client.
///
/// # Examples
///
/// ```
/// use sqs_client::{ClientConfig, RequestStyle};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(10))
///     .with_request_style(RequestStyle::Post);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// GET query string or POST form body
    pub request_style: RequestStyle,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            request_style: RequestStyle::Get,
            user_agent: format!("sqs-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the request timeout.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set how parameters are sent.
    pub fn with_request_style(mut self, style: RequestStyle) -> Self {
        self.request_style = style;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Options for [`Client::create_queue`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateQueueOptions {
    /// Visibility timeout in seconds applied to messages of the new queue
    pub default_visibility_timeout: Option<u32>,
}

impl CreateQueueOptions {
    pub fn with_default_visibility_timeout(mut self, seconds: u32) -> Self {
        self.default_visibility_timeout = Some(seconds);
        self
    }
}

/// Client for one account in one region.
///
/// # Examples
///
/// ```no_run
/// use sqs_client::{Client, Credentials, Region};
///
/// # async fn example() -> Result<(), sqs_client::SqsError> {
/// let client = Client::new(Credentials::from_env()?, Region::from_name("eu-west-1")?)?;
///
/// let queue = client.create_queue("orders", None).await?;
/// queue.send_message("hello").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    region: Region,
    config: ClientConfig,
    requests: RequestBuilder,
    http: reqwest::Client,
}

impl Client {
    /// Create a client with the default configuration
    pub fn new(credentials: Credentials, region: Region) -> Result<Self, SqsError> {
        Self::with_config(credentials, region, ClientConfig::default())
    }

    /// Create a client with an explicit configuration
    pub fn with_config(
        credentials: Credentials,
        region: Region,
        config: ClientConfig,
    ) -> Result<Self, SqsError> {
        let mut http = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            http = http.timeout(timeout);
        }

        let requests =
            RequestBuilder::new(Signer::new(credentials)).with_style(config.request_style);

        Ok(Self {
            region,
            config,
            requests,
            http: http.build()?,
        })
    }

    /// Replace the clock used to timestamp requests
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.requests = self.requests.with_clock(clock);
        self
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========================================================================
    // Account Operations
    // ========================================================================

    /// List the queues of the account, optionally restricted to names
    /// starting with `prefix`.
    pub async fn list_queues(&self, prefix: Option<&str>) -> Result<Vec<Queue<'_>>, SqsError> {
        let mut params = Params::new();
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            params.set("QueueNamePrefix", prefix);
        }

        let response: ListQueuesResponse = self.execute("ListQueues", "/", params).await?;
        response
            .queue_urls
            .iter()
            .map(|url| self.queue_from_url(url))
            .collect()
    }

    /// Create a queue, or return the existing queue of the same name if its
    /// attributes match.
    pub async fn create_queue(
        &self,
        name: &str,
        options: Option<CreateQueueOptions>,
    ) -> Result<Queue<'_>, SqsError> {
        let mut params = Params::new().with("QueueName", name);
        if let Some(timeout) = options.and_then(|o| o.default_visibility_timeout) {
            params.set("DefaultVisibilityTimeout", timeout.to_string());
        }

        let response: CreateQueueResponse = self.execute("CreateQueue", "/", params).await?;
        self.queue_from_url(&response.queue_url)
    }

    /// Look up a queue by its exact name
    ///
    /// # Errors
    ///
    /// Returns `SqsError::QueueNotFound` when no queue has that name.
    pub async fn queue(&self, name: &str) -> Result<Queue<'_>, SqsError> {
        self.list_queues(Some(name))
            .await?
            .into_iter()
            .find(|queue| queue.name() == name)
            .ok_or_else(|| SqsError::QueueNotFound {
                name: name.to_string(),
            })
    }

    /// Handle for the queue at `url`; only the path below the endpoint is kept
    pub fn queue_from_url(&self, url: &str) -> Result<Queue<'_>, SqsError> {
        let parsed = Url::parse(url).map_err(|e| SqsError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Queue::new(self, self.region.resource_path(parsed.path())))
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Sign and send one request for `action` against `path`, then decode
    /// the response as `T`.
    pub(crate) async fn execute<T: FromXml>(
        &self,
        action: &str,
        path: &str,
        params: Params,
    ) -> Result<T, SqsError> {
        let url = self.region.url_for(path);
        let prepared = self.requests.build(action, &url, params)?;

        debug!(
            action = action,
            method = %prepared.method(),
            path = prepared.url().path(),
            "Sending request"
        );

        let (method, url, headers, body) = prepared.into_parts();
        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let error = build_service_error(status.as_u16(), &status_text(status), &body);
            warn!(
                action = action,
                status = error.status_code,
                code = %error.code,
                request_id = %error.request_id,
                "Request rejected by queue service"
            );
            return Err(error.into());
        }

        let body = response.text().await?;
        let root = XmlElement::parse(&body).map_err(|e| SqsError::decode(action, e.to_string()))?;
        let metadata =
            ResponseMetadata::from_xml(&root).map_err(|e| SqsError::decode(action, e.to_string()))?;
        let decoded = T::from_xml(&root).map_err(|e| SqsError::decode(action, e.to_string()))?;

        debug!(
            action = action,
            request_id = %metadata.request_id,
            "Request succeeded"
        );

        Ok(decoded)
    }
}

/// Reason phrase for `status`, or the bare code when none is registered
fn status_text(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => status.as_u16().to_string(),
    }
}
