//! Blocking HTTP transport backed by `ureq`.

use super::{HttpRequest, Method, RawResponse, Transport};
use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Time allowed to establish the TCP/TLS connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed to receive the response headers and body.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// `ureq` agent with fixed timeouts.
///
/// Status codes are never turned into errors here; the client inspects them.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport with the standard timeouts.
    #[must_use]
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_recv_response(Some(READ_TIMEOUT))
            .timeout_recv_body(Some(READ_TIMEOUT))
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("connect_timeout", &CONNECT_TIMEOUT)
            .field("read_timeout", &READ_TIMEOUT)
            .finish_non_exhaustive()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match request.method {
            Method::Get => with_headers(self.agent.get(url), &request.headers).call(),
            Method::Delete => with_headers(self.agent.delete(url), &request.headers).call(),
            Method::Post => {
                let builder = with_headers(self.agent.post(url), &request.headers);
                match body {
                    Some(b) => builder.send(b),
                    None => builder.send_empty(),
                }
            }
            Method::Put => {
                let builder = with_headers(self.agent.put(url), &request.headers);
                match body {
                    Some(b) => builder.send(b),
                    None => builder.send_empty(),
                }
            }
        };

        let transport_error = |e: ureq::Error| Error::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(transport_error)?;

        Ok(RawResponse { status, body })
    }
}
