use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::ModelError;

const FENCE_OPENER: &str = "```markdown\n";
const FENCE_CLOSER: &str = "\n```";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Option<Vec<Part>>,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub model: String,
    pub contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

impl GenerateContentRequest {
    /// Single-turn request carrying one user prompt
    pub fn single_turn(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: Some(vec![Part {
                    text: Some(prompt.to_string()),
                }]),
            }],
        }
    }
}

/// Locate the first candidate's first part.
///
/// A part without text yields an empty string; anything missing above it is
/// a malformed response.
pub fn extract_text(response: &GenerateContentResponse) -> Result<String, ModelError> {
    let candidate = response
        .candidates
        .as_deref()
        .and_then(|c| c.first())
        .ok_or_else(|| ModelError::MalformedResponse("no candidates in response".to_string()))?;

    let part = candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.as_deref())
        .and_then(|p| p.first())
        .ok_or_else(|| ModelError::MalformedResponse("no content parts in candidate".to_string()))?;

    Ok(part.text.clone().unwrap_or_default())
}

/// Remove a leading "```markdown" opener line and a trailing fence closer
pub fn strip_fences(text: &str) -> &str {
    let text = text.strip_prefix(FENCE_OPENER).unwrap_or(text);
    text.strip_suffix(FENCE_CLOSER).unwrap_or(text)
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash-lite";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Override the endpoint root (proxies, local testing)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn query(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest::single_turn(&self.model, prompt);

        debug!(model = %self.model, prompt_len = prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(%status, "Gemini API error");
            return Err(ModelError::Status { status, body });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        let text = extract_text(&parsed).map_err(|e| {
            error!(body = %body, "Gemini API response structure unexpected");
            e
        })?;

        Ok(strip_fences(&text).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::single_turn("gemini-2.5-flash-lite", "hi");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gemini-2.5-flash-lite",
                "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }]
            })
        );
    }

    #[test]
    fn test_extract_first_candidate_first_part() {
        let response = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"first"},{"text":"second"}]}},
                {"content":{"parts":[{"text":"other"}]}}
            ]}"#,
        );
        assert_eq!(extract_text(&response).unwrap(), "first");
    }

    #[test]
    fn test_extract_missing_candidates_is_malformed() {
        assert!(extract_text(&parse(r#"{}"#)).unwrap_err().is_malformed());
        assert!(extract_text(&parse(r#"{"candidates":[]}"#)).unwrap_err().is_malformed());
    }

    #[test]
    fn test_extract_missing_parts_is_malformed() {
        assert!(extract_text(&parse(r#"{"candidates":[{}]}"#)).unwrap_err().is_malformed());
        assert!(extract_text(&parse(r#"{"candidates":[{"content":{}}]}"#))
            .unwrap_err()
            .is_malformed());
        assert!(extract_text(&parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#))
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn test_extract_part_without_text_is_empty() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#);
        assert_eq!(extract_text(&response).unwrap(), "");
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```markdown\n# Title\n- item\n```"), "# Title\n- item");
        assert_eq!(strip_fences("```markdown\nonly opener"), "only opener");
        assert_eq!(strip_fences("only closer\n```"), "only closer");
        assert_eq!(strip_fences("plain text"), "plain text");
        // Other fence languages are left alone
        assert_eq!(strip_fences("```rust\nfn main() {}"), "```rust\nfn main() {}");
    }

    #[test]
    fn test_strip_fences_idempotent_on_clean_text() {
        for raw in ["```markdown\n**Skills**: Rust\n```", "Nothing to strip", ""] {
            let once = strip_fences(raw);
            assert_eq!(strip_fences(once), once);
        }
    }

    /// Serve one canned HTTP response on a local port and return its base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Drain headers and body so the client never sees a reset
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if received.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_query_strips_fenced_markdown() {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"```markdown\n* 5 years\n```"}]}}]}"#,
        )
        .await;

        let client = GeminiClient::new("test-key").with_base_url(&base);
        assert_eq!(client.query("prompt").await.unwrap(), "* 5 years");
    }

    #[tokio::test]
    async fn test_query_missing_candidates_is_malformed() {
        let base = serve_once("HTTP/1.1 200 OK", r#"{"promptFeedback":{}}"#).await;

        let client = GeminiClient::new("test-key").with_base_url(&base);
        assert!(client.query("prompt").await.unwrap_err().is_malformed());
    }

    #[tokio::test]
    async fn test_query_error_status() {
        let base = serve_once("HTTP/1.1 403 Forbidden", r#"{"error":"bad key"}"#).await;

        let client = GeminiClient::new("bad").with_base_url(&base);
        match client.query("prompt").await {
            Err(ModelError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
                assert!(body.contains("bad key"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_connection_refused_is_transport() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new("key").with_base_url(&format!("http://{}", addr));
        assert!(matches!(
            client.query("prompt").await,
            Err(ModelError::Transport(_))
        ));
    }

    #[test]
    fn test_builder_overrides() {
        let client = GeminiClient::new("k")
            .with_model("gemini-2.5-pro")
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.model(), "gemini-2.5-pro");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
