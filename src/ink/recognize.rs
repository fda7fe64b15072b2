use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::RecognizeError;

use super::gesture::GestureRecorder;

/// Handwriting service endpoint; the `itc` parameter selects the Japanese
/// handwriting model.
const RECOGNITION_URL: &str =
    "https://inputtools.google.com/request?itc=ja-t-i0-handwrit&app=handwriting";

/// Ink payloads can get large; the recognition client gets more room than an
/// ordinary API call. No automatic retry, the user retries manually.
const RECOGNITION_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_LANGUAGE: &str = "ja";
const GUIDE_WIDTH: u32 = 300;
const GUIDE_HEIGHT: u32 = 300;

/// Transport seam for the recognition exchange: takes the request body,
/// returns the raw JSON reply.
#[async_trait]
pub trait RecognitionTransport: Send + Sync {
    async fn send(&self, payload: Value) -> Result<Value, RecognizeError>;
}

/// Production transport over reqwest.
pub struct HttpRecognitionTransport {
    client: Client,
    endpoint: String,
}

impl HttpRecognitionTransport {
    pub fn new() -> Result<Self, RecognizeError> {
        Self::with_endpoint(RECOGNITION_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, RecognizeError> {
        let client = Client::builder()
            .timeout(RECOGNITION_TIMEOUT)
            .build()
            .map_err(|err| RecognizeError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RecognitionTransport for HttpRecognitionTransport {
    async fn send(&self, payload: Value) -> Result<Value, RecognizeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| RecognizeError::Transport(err.to_string()))?;
        response
            .json()
            .await
            .map_err(|err| RecognizeError::Transport(err.to_string()))
    }
}

/// Converts a recorded gesture into text via the external handwriting
/// service.
pub struct InkRecognizer {
    transport: Arc<dyn RecognitionTransport>,
    language: String,
    guide_width: u32,
    guide_height: u32,
}

impl InkRecognizer {
    pub fn new(transport: Arc<dyn RecognitionTransport>) -> Self {
        Self {
            transport,
            language: DEFAULT_LANGUAGE.to_string(),
            guide_width: GUIDE_WIDTH,
            guide_height: GUIDE_HEIGHT,
        }
    }

    /// Sends the recorded gesture for transcription and returns the top
    /// candidate.
    ///
    /// Fails with [`RecognizeError::EmptyGesture`] before any network call if
    /// nothing was drawn. On success the gesture is cleared; on a reply with
    /// no usable candidate it is preserved so the user can retry without
    /// redrawing.
    pub async fn recognize(
        &self,
        recorder: &mut GestureRecorder,
    ) -> Result<String, RecognizeError> {
        if recorder.is_empty() {
            return Err(RecognizeError::EmptyGesture);
        }

        let payload = json!({
            "input_type": 0,
            "requests": [{
                "language": self.language,
                "writing_guide": {
                    "width": self.guide_width,
                    "height": self.guide_height,
                },
                "ink": recorder.ink(),
            }],
        });

        let reply = self.transport.send(payload).await?;

        // Reply shape: ["SUCCESS", [[input, [candidates, ...], ...]]] — the
        // best guess sits at [1][0][1][0].
        let candidate = reply
            .get(1)
            .and_then(|results| results.get(0))
            .and_then(|first| first.get(1))
            .and_then(|candidates| candidates.get(0))
            .and_then(Value::as_str);

        match candidate {
            Some(text) if !text.is_empty() => {
                recorder.clear();
                Ok(text.to_string())
            }
            _ => {
                warn!("recognition reply had no usable candidate");
                Err(RecognizeError::Failed)
            }
        }
    }
}
