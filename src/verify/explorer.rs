//! Explorer verification API client.
//!
//! The service takes a JSON submission on `POST {verify_url}` and answers
//! with either a numeric request id (queued) or a status object. Queued
//! requests are followed on `GET {verify_url}/{id}`.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::verify::types::{
    StatusReply, SubmitReply, VerificationError, VerificationStatus, VerificationSubmission,
};

/// Operations the verifier needs from an explorer.
pub trait ExplorerApi {
    fn submit(
        &self,
        submission: &VerificationSubmission,
    ) -> impl Future<Output = Result<SubmitReply, VerificationError>> + Send;

    fn status(&self, request_id: u64) -> impl Future<Output = Result<StatusReply, VerificationError>> + Send;
}

/// HTTP explorer client.
///
/// A client that could not be built is kept as its error, so every call
/// reports it as a transport failure.
#[derive(Debug, Clone)]
pub struct HttpExplorer {
    client: Result<reqwest::Client, VerificationError>,
    verify_url: String,
}

impl HttpExplorer {
    /// Create a client whose every request is bounded by `request_timeout`.
    pub fn new(verify_url: &str, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                tracing::warn!(error = %e, "Explorer HTTP client could not be built");
                VerificationError::Transport(e.to_string())
            });

        Self {
            client,
            verify_url: verify_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }

    fn client(&self) -> Result<&reqwest::Client, VerificationError> {
        self.client.as_ref().map_err(Clone::clone)
    }

    async fn read_body(response: reqwest::Response) -> Result<String, VerificationError> {
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(VerificationError::Rejected {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        Ok(body)
    }
}

impl ExplorerApi for HttpExplorer {
    async fn submit(&self, submission: &VerificationSubmission) -> Result<SubmitReply, VerificationError> {
        tracing::debug!(
            url = %self.verify_url,
            address = %submission.contract_address,
            "Submitting verification request"
        );
        let response = self
            .client()?
            .post(&self.verify_url)
            .json(submission)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let body = Self::read_body(response).await?;
        parse_submit_reply(&body)
    }

    async fn status(&self, request_id: u64) -> Result<StatusReply, VerificationError> {
        let response = self
            .client()?
            .get(format!("{}/{}", self.verify_url, request_id))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| VerificationError::Decode(e.to_string()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> VerificationError {
    if e.is_timeout() {
        VerificationError::Timeout
    } else {
        VerificationError::Transport(e.to_string())
    }
}

/// Pull a message out of an error body, which may be plain text or JSON.
fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error", "result"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    if let Ok(Value::String(message)) = serde_json::from_str::<Value>(trimmed) {
        return message;
    }
    trimmed.to_string()
}

/// Interpret a successful submission body.
pub(crate) fn parse_submit_reply(body: &str) -> Result<SubmitReply, VerificationError> {
    let trimmed = body.trim();
    if let Ok(id) = trimmed.trim_matches('"').parse::<u64>() {
        return Ok(SubmitReply::Accepted(id));
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|_| VerificationError::Decode(trimmed.to_string()))?;

    if let Some(id) = value.as_u64().or_else(|| value.get("id").and_then(Value::as_u64)) {
        if value.get("status").is_none() {
            return Ok(SubmitReply::Accepted(id));
        }
    }

    let reply: StatusReply = serde_json::from_value(value.clone())
        .map_err(|_| VerificationError::Decode(trimmed.to_string()))?;
    match reply.status {
        VerificationStatus::Successful => Ok(SubmitReply::Verified),
        VerificationStatus::AlreadyVerified => Ok(SubmitReply::AlreadyVerified),
        VerificationStatus::Failed => Err(VerificationError::Failed(reply.failure_message())),
        VerificationStatus::Queued | VerificationStatus::InProgress => value
            .get("id")
            .and_then(Value::as_u64)
            .map(SubmitReply::Accepted)
            .ok_or_else(|| VerificationError::Decode(format!("queued without id: {}", trimmed))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit_reply() {
        assert_eq!(parse_submit_reply("42").unwrap(), SubmitReply::Accepted(42));
        assert_eq!(parse_submit_reply("\"7\"\n").unwrap(), SubmitReply::Accepted(7));
        assert_eq!(parse_submit_reply(r#"{"id": 9}"#).unwrap(), SubmitReply::Accepted(9));
        assert_eq!(
            parse_submit_reply(r#"{"id": 9, "status": "queued"}"#).unwrap(),
            SubmitReply::Accepted(9)
        );
        assert_eq!(
            parse_submit_reply(r#"{"status": "successful"}"#).unwrap(),
            SubmitReply::Verified
        );
        assert_eq!(
            parse_submit_reply(r#"{"status": "already_verified"}"#).unwrap(),
            SubmitReply::AlreadyVerified
        );
    }

    #[test]
    fn test_parse_submit_reply_errors() {
        assert!(matches!(
            parse_submit_reply(r#"{"status": "failed", "error": "bytecode mismatch"}"#),
            Err(VerificationError::Failed(msg)) if msg == "bytecode mismatch"
        ));
        assert!(matches!(parse_submit_reply("<html>"), Err(VerificationError::Decode(_))));
        assert!(matches!(
            parse_submit_reply(r#"{"status": "queued"}"#),
            Err(VerificationError::Decode(_))
        ));
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(extract_message(" This contract is already verified \n"), "This contract is already verified");
        assert_eq!(extract_message(r#"{"message": "Already Verified"}"#), "Already Verified");
        assert_eq!(extract_message(r#""quoted""#), "quoted");
    }

    #[test]
    fn test_url_normalized() {
        let explorer = HttpExplorer::new("http://localhost:3010/contract_verification/", Duration::from_secs(1));
        assert_eq!(explorer.verify_url(), "http://localhost:3010/contract_verification");
        assert!(explorer.client().is_ok());
    }

    #[tokio::test]
    async fn test_unbuilt_client_reports_transport() {
        let explorer = HttpExplorer {
            client: Err(VerificationError::Transport("tls backend unavailable".to_string())),
            verify_url: "http://localhost:3010/contract_verification".to_string(),
        };
        let submission = VerificationSubmission {
            contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            contract_name: "SablierMerkleFactory".to_string(),
            source_code: None,
            code_format: "solidity-standard-json-input".to_string(),
            compiler_solc_version: "0.8.26".to_string(),
            compiler_zksolc_version: None,
            optimization_used: true,
            constructor_arguments: "0x".to_string(),
        };

        assert_eq!(
            explorer.submit(&submission).await,
            Err(VerificationError::Transport("tls backend unavailable".to_string()))
        );
        assert!(matches!(explorer.status(1).await, Err(VerificationError::Transport(_))));
    }
}
