pub mod languages;
pub mod providers;

use crate::config::SpeechConfig;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SpeechError {
    /// The service responded but produced no transcript.
    Unintelligible,
    /// Transport failure or an error response from the service.
    ServiceError(String),
    ConfigError(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::Unintelligible => {
                write!(f, "Sorry, I couldn't understand the audio")
            }
            SpeechError::ServiceError(msg) => {
                write!(f, "Speech recognition API error: {}", msg)
            }
            SpeechError::ConfigError(msg) => {
                write!(f, "Speech configuration error: {}", msg)
            }
        }
    }
}

impl Error for SpeechError {}

/// Audio in, text out. The locale code selects the recognition grammar;
/// the mime type is whatever the browser produced for the capture.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        locale_code: &str,
    ) -> Result<String, SpeechError>;
}

pub struct SpeechManager {
    transcriber: Box<dyn Transcriber + Send + Sync>,
}

impl SpeechManager {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let transcriber: Box<dyn Transcriber + Send + Sync> = match config.backend.as_str() {
            "google" => Box::new(providers::google::GoogleSpeechProvider::new(config)?),
            _ => {
                return Err(SpeechError::ConfigError(format!(
                    "Unsupported speech backend: {}",
                    config.backend
                )))
            }
        };

        Ok(Self { transcriber })
    }

    pub async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        locale_code: &str,
    ) -> Result<String, SpeechError> {
        self.transcriber.transcribe(audio, mime_type, locale_code).await
    }
}
