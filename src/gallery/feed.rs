//! Wire types for the remote gallery feed and the submission endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Network failure or non-2xx status
    #[error("feed request failed: {0}")]
    Request(String),
    /// Response body did not parse
    #[error("feed payload malformed: {0}")]
    Parse(#[from] serde_json::Error),
    /// Submission accepted but no processed image came back
    #[error("submission rejected: {0}")]
    Submission(String),
}

/// One entry of `GET <endpoint>/all`. Only `url` is consumed; the endpoint
/// sends more fields and serde drops them.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    pub url: String,
}

/// Body of `POST <endpoint>/`.
#[derive(Debug, Serialize)]
pub struct SubmissionRequest<'a> {
    pub image_base64: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmissionReply {
    rembg_url: Option<String>,
}

/// Parse the feed payload: a JSON array of objects carrying at least `url`.
pub fn parse_feed(json: &str) -> Result<Vec<FeedEntry>, FeedError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse the submission reply and extract the processed image URL.
pub fn parse_submission_reply(json: &str) -> Result<String, FeedError> {
    let reply: SubmissionReply = serde_json::from_str(json)?;
    reply
        .rembg_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| FeedError::Submission("no image url in reply".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_parses_and_ignores_extra_fields() {
        let json = r#"[
            {"url": "https://cdn.example/a.png", "created_at": "2024-12-01"},
            {"url": "https://cdn.example/b.png"}
        ]"#;
        let entries = parse_feed(json).expect("valid feed");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://cdn.example/a.png");
    }

    #[test]
    fn empty_feed_is_valid() {
        assert!(parse_feed("[]").expect("empty feed").is_empty());
    }

    #[test]
    fn malformed_feed_is_a_parse_error() {
        assert!(matches!(parse_feed("{oops"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn submission_reply_yields_the_processed_url() {
        let url = parse_submission_reply(r#"{"rembg_url": "https://cdn.example/c.png"}"#)
            .expect("valid reply");
        assert_eq!(url, "https://cdn.example/c.png");
    }

    #[test]
    fn submission_reply_without_url_is_an_error() {
        assert!(matches!(
            parse_submission_reply("{}"),
            Err(FeedError::Submission(_))
        ));
        assert!(matches!(
            parse_submission_reply(r#"{"rembg_url": ""}"#),
            Err(FeedError::Submission(_))
        ));
    }

    #[test]
    fn submission_request_serializes_the_expected_shape() {
        let body = serde_json::to_string(&SubmissionRequest { image_base64: "abc123" })
            .expect("serializable");
        assert_eq!(body, r#"{"image_base64":"abc123"}"#);
    }
}
