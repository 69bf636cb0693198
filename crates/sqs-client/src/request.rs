//! Construction of signed requests.
//!
//! The builder injects the protocol parameters every action carries, sets the
//! `Host` header, signs, and lays the parameters out for the chosen
//! [`RequestStyle`].

use crate::error::{ConfigurationError, SqsError};
use crate::params::{Params, SignedParams};
use crate::signer::Signer;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, HOST};
use reqwest::Method;
use std::fmt;
use std::str::FromStr;
use url::Url;

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

/// Query protocol version sent with every request
pub const API_VERSION: &str = "2009-02-01";

/// Format of the `Timestamp` parameter (UTC, second precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Source of the current time for the `Timestamp` parameter
pub type Clock = fn() -> DateTime<Utc>;

/// How parameters are carried on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestStyle {
    /// Parameters in the query string
    #[default]
    Get,
    /// Parameters in a form-encoded body
    Post,
}

impl RequestStyle {
    pub fn method(&self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
        }
    }
}

impl fmt::Display for RequestStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
        }
    }
}

impl FromStr for RequestStyle {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            other => Err(ConfigurationError::Invalid {
                message: format!("unknown request style '{}', expected get or post", other),
            }),
        }
    }
}

/// A signed request ready to send.
///
/// The parts are read-only; a changed request must be built and signed again.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    params: SignedParams,
    body: Option<String>,
}

impl PreparedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL; for GET it carries the encoded parameters
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn params(&self) -> &SignedParams {
        &self.params
    }

    /// Form-encoded parameters for POST
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Method, Url, HeaderMap, Option<String>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builds signed requests for one set of credentials
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    signer: Signer,
    style: RequestStyle,
    clock: Clock,
}

impl RequestBuilder {
    pub fn new(signer: Signer) -> Self {
        Self {
            signer,
            style: RequestStyle::default(),
            clock: Utc::now,
        }
    }

    pub fn with_style(mut self, style: RequestStyle) -> Self {
        self.style = style;
        self
    }

    /// Replace the clock used for `Timestamp`
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn style(&self) -> RequestStyle {
        self.style
    }

    /// Build a signed request for `action` against `url`.
    ///
    /// `Action`, `Timestamp` and `Version` override any caller values of the
    /// same name. The URL must be absolute and name a host.
    pub fn build(
        &self,
        action: &str,
        url: &str,
        mut params: Params,
    ) -> Result<PreparedRequest, SqsError> {
        let mut url = Url::parse(url).map_err(|e| SqsError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let host = match url.host_str() {
            Some(host) => match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            },
            None => {
                return Err(SqsError::InvalidUrl {
                    url: url.to_string(),
                    message: "URL has no host".to_string(),
                })
            }
        };

        params.set("Action", action);
        params.set("Timestamp", (self.clock)().format(TIMESTAMP_FORMAT).to_string());
        params.set("Version", API_VERSION);

        let mut headers = HeaderMap::new();
        headers.insert(HOST, header_value(&host)?);

        let method = self.style.method();
        self.signer
            .sign(method.as_str(), url.path(), &mut params, &headers);
        let params = SignedParams::new(params);

        let body = match self.style {
            RequestStyle::Get => {
                url.query_pairs_mut()
                    .clear()
                    .extend_pairs(params.params().iter());
                None
            }
            RequestStyle::Post => {
                url.set_query(None);
                let body = params.form_encode();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
                headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
                Some(body)
            }
        };

        Ok(PreparedRequest {
            method,
            url,
            headers,
            params,
            body,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, SqsError> {
    HeaderValue::from_str(value).map_err(|e| {
        SqsError::Configuration(ConfigurationError::Invalid {
            message: format!("invalid header value '{}': {}", value, e),
        })
    })
}
