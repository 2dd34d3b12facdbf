use crate::config::SpeechConfig;
use crate::speech::{SpeechError, Transcriber};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_URL: &str = "http://www.google.com/speech-api/v2/recognize";

/// Google full-duplex speech API backend. Captured audio is posted as-is
/// with the locale code; the response is newline-delimited JSON where the
/// first non-empty `result` carries the transcript alternatives.
pub struct GoogleSpeechProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Deserialize, Debug)]
struct RecognizeLine {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Deserialize, Debug)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Deserialize, Debug)]
struct Alternative {
    transcript: Option<String>,
}

impl GoogleSpeechProvider {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_key = config.api_key.clone().ok_or_else(|| {
            SpeechError::ConfigError(
                "API key is required for the google speech backend".to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SpeechError::ServiceError(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// Scans the line-delimited response for the first transcript. Leading
    /// lines with an empty `result` array are routine and skipped.
    fn parse_transcript(body: &str) -> Result<String, SpeechError> {
        for line in body.lines().filter(|line| !line.trim().is_empty()) {
            let parsed: RecognizeLine = match serde_json::from_str(line) {
                Ok(parsed) => parsed,
                Err(_) => continue,
            };

            for result in parsed.result {
                if let Some(transcript) = result
                    .alternative
                    .into_iter()
                    .find_map(|alternative| alternative.transcript)
                {
                    let transcript = transcript.trim().to_string();
                    if !transcript.is_empty() {
                        return Ok(transcript);
                    }
                }
            }
        }

        Err(SpeechError::Unintelligible)
    }
}

#[async_trait]
impl Transcriber for GoogleSpeechProvider {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        locale_code: &str,
    ) -> Result<String, SpeechError> {
        debug!(
            "Transcribing {} bytes of {} audio in {}",
            audio.len(),
            mime_type,
            locale_code
        );

        let response = self
            .client
            .post(&self.api_url)
            .query(&[
                ("client", "chromium"),
                ("lang", locale_code),
                ("key", self.api_key.as_str()),
            ])
            .header(reqwest::header::CONTENT_TYPE, mime_type.to_string())
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| SpeechError::ServiceError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SpeechError::ServiceError(format!(
                "service responded with status code: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SpeechError::ServiceError(e.to_string()))?;

        Self::parse_transcript(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_empty_result_lines() {
        let body = "{\"result\":[]}\n{\"result\":[{\"alternative\":[{\"transcript\":\"show all orders\",\"confidence\":0.9}],\"final\":true}],\"result_index\":0}";
        assert_eq!(
            GoogleSpeechProvider::parse_transcript(body).unwrap(),
            "show all orders"
        );
    }

    #[test]
    fn no_alternatives_is_unintelligible() {
        let body = "{\"result\":[]}\n{\"result\":[]}";
        assert!(matches!(
            GoogleSpeechProvider::parse_transcript(body),
            Err(SpeechError::Unintelligible)
        ));
    }

    #[test]
    fn blank_body_is_unintelligible() {
        assert!(matches!(
            GoogleSpeechProvider::parse_transcript(""),
            Err(SpeechError::Unintelligible)
        ));
    }
}
