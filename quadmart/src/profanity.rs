//! Profanity screening. The model is an external text -> boolean
//! classifier reached over HTTP; it is advisory, so transport failures
//! fail open rather than blocking writes.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

#[async_trait]
pub(crate) trait ProfanityClassifier: Send + Sync {
    async fn is_profane(&self, text: &str) -> bool;
}

/// Client for the hosted classifier: POST `{"text": ...}`, read
/// `{"profane": bool}`.
pub(crate) struct HttpProfanityClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpProfanityClassifier {
    pub(crate) fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClassifierResponse {
    profane: bool,
}

#[async_trait]
impl ProfanityClassifier for HttpProfanityClassifier {
    async fn is_profane(&self, text: &str) -> bool {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .and_then(|response| response.error_for_status());
        match response {
            Ok(response) => match response.json::<ClassifierResponse>().await {
                Ok(body) => body.profane,
                Err(err) => {
                    warn!("profanity classifier returned malformed body: {err}");
                    false
                }
            },
            Err(err) => {
                warn!("profanity classifier unavailable: {err}");
                false
            }
        }
    }
}

/// Used when no classifier endpoint is configured.
pub(crate) struct PermissiveClassifier;

#[async_trait]
impl ProfanityClassifier for PermissiveClassifier {
    async fn is_profane(&self, _text: &str) -> bool {
        false
    }
}
