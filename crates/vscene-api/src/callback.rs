//! Callback delivery.
//!
//! Each target receives the terminal run payload exactly once. Deliveries
//! run after the run has already finished, so a failing target can only
//! ever lose its own notification.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vscene_models::{AnalyzeResponse, CallbackMethod, CallbackTarget};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Terminal payload sent to every callback target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub job_id: String,
    /// "completed" or "failed"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalyzeResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CallbackError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackError {
    pub kind: String,
    pub detail: String,
}

impl CallbackPayload {
    pub fn completed(job_id: String, result: AnalyzeResponse) -> Self {
        Self {
            job_id,
            status: "completed".to_string(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(job_id: String, kind: &str, detail: String) -> Self {
        Self {
            job_id,
            status: "failed".to_string(),
            result: None,
            error: Some(CallbackError {
                kind: kind.to_string(),
                detail,
            }),
        }
    }
}

/// Deliver the payload to every target, one after another.
///
/// Outcomes are logged per target and never bubble up.
pub async fn deliver_callbacks(
    client: &reqwest::Client,
    targets: &[CallbackTarget],
    payload: &CallbackPayload,
) {
    for target in targets {
        match deliver_one(client, target, payload).await {
            Ok(status) => {
                info!(
                    job_id = %payload.job_id,
                    url = %target.url,
                    method = target.method.as_str(),
                    status = status.as_u16(),
                    "Callback delivered"
                );
            }
            Err(e) => {
                warn!(
                    job_id = %payload.job_id,
                    url = %target.url,
                    method = target.method.as_str(),
                    "Callback delivery failed: {}",
                    e
                );
            }
        }
    }
}

async fn deliver_one(
    client: &reqwest::Client,
    target: &CallbackTarget,
    payload: &CallbackPayload,
) -> Result<reqwest::StatusCode, reqwest::Error> {
    // GET carries no body; POST and PUT send the payload as JSON.
    let mut request = match target.method {
        CallbackMethod::Get => client.get(&target.url),
        CallbackMethod::Post => client.post(&target.url).json(payload),
        CallbackMethod::Put => client.put(&target.url).json(payload),
    };
    request = request.timeout(CALLBACK_TIMEOUT);

    for (name, value) in &target.headers {
        request = request.header(name, value);
    }

    let response = request.send().await?;
    Ok(response.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target(url: String, method: CallbackMethod) -> CallbackTarget {
        CallbackTarget {
            url,
            method,
            headers: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn post_delivers_json_payload_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/done"))
            .and(header("X-Token", "secret"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut t = target(format!("{}/done", server.uri()), CallbackMethod::Post);
        t.headers.insert("X-Token".to_string(), "secret".to_string());

        let payload = CallbackPayload::failed("job-1".to_string(), "download_failure", "404".to_string());
        deliver_callbacks(&reqwest::Client::new(), &[t], &payload).await;
    }

    #[tokio::test]
    async fn get_sends_no_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let t = target(format!("{}/ping", server.uri()), CallbackMethod::Get);
        let payload = CallbackPayload::failed("job-2".to_string(), "validation_failure", "x".to_string());
        deliver_callbacks(&reqwest::Client::new(), &[t], &payload).await;
    }

    #[tokio::test]
    async fn one_failing_target_does_not_stop_the_rest() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/second"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let targets = vec![
            // Connection refused, nothing listens here.
            target("http://127.0.0.1:1/first".to_string(), CallbackMethod::Post),
            target(format!("{}/second", server.uri()), CallbackMethod::Put),
        ];
        let payload = CallbackPayload::failed("job-3".to_string(), "analysis_failure", "x".to_string());
        deliver_callbacks(&reqwest::Client::new(), &targets, &payload).await;
    }
}
