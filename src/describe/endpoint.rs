use super::Describer;
use crate::DescribeError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    heading: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    description: String,
}

/// Describer backed by an HTTP summarization service
///
/// Sends `{"heading": ..., "body": ...}` as JSON and expects
/// `{"description": ...}` back. The provider behind the endpoint is not
/// this crate's concern.
#[derive(Debug, Clone)]
pub struct EndpointDescriber {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl EndpointDescriber {
    pub fn new(client: Client, endpoint: Url, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }
}

#[async_trait]
impl Describer for EndpointDescriber {
    async fn summarize(&self, heading: &str, body: &str) -> Result<String, DescribeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(&SummarizeRequest { heading, body })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DescribeError::Timeout
                } else {
                    DescribeError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(DescribeError::Unavailable(format!(
                "summarizer returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let parsed: SummarizeResponse = response
            .json()
            .await
            .map_err(|e| DescribeError::Unavailable(format!("bad summarizer response: {}", e)))?;

        Ok(parsed.description.trim().to_string())
    }
}
