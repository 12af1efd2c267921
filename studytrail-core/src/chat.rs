//! HTTP client for the generative-language chat endpoint
//!
//! The analytics core never sends raw records to the provider: prompts are
//! built from pre-aggregated, size-bounded summaries so they stay within
//! provider limits. The client exposes a single operation — send a prompt,
//! receive text — with typed failures for provider refusals and truncated
//! output.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::types::{AggregatedGroup, ProgressPoint, Subject, TopicAnalysis};

/// Topics included in an insight prompt.
const PROMPT_TOPIC_LIMIT: usize = 5;
/// Trailing progress points included in an insight prompt.
const PROMPT_SERIES_LIMIT: usize = 8;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// HTTP client for the chat endpoint
pub struct ChatClient {
    config: ChatConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a new chat client from configuration
    ///
    /// Returns an error if the configuration is missing required fields.
    pub fn new(config: ChatConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.endpoint.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    /// Send a prompt and return the reply text.
    ///
    /// Fails with [`Error::SafetyRejected`] when the provider declines to
    /// answer (safety filter or rate limiting) and [`Error::Truncated`] when
    /// the reply hit the output token ceiling.
    pub async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.config.model,
            self.config.api_key.as_deref().unwrap_or_default()
        );

        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig { max_output_tokens },
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            max_output_tokens,
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Chat(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(Error::SafetyRejected("rate limited by provider".to_string()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Chat(format!("API error ({}): {}", status, error_text)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Chat(format!("failed to parse response: {}", e)))?;

        extract_completion(parsed, max_output_tokens)
    }
}

/// Pull the reply text out of a provider response, mapping refusals and
/// truncation to their typed errors.
fn extract_completion(response: GenerateResponse, max_output_tokens: u32) -> Result<String> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(Error::SafetyRejected(format!(
                "prompt blocked: {}",
                reason
            )));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::Chat("response contained no candidates".to_string()))?;

    match candidate.finish_reason.as_deref() {
        Some("SAFETY") => {
            return Err(Error::SafetyRejected("reply blocked by safety filter".to_string()))
        }
        Some("MAX_TOKENS") => {
            return Err(Error::Truncated {
                max_tokens: max_output_tokens,
            })
        }
        _ => {}
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(Error::Chat("response contained no text".to_string()));
    }

    Ok(text)
}

/// Build the size-bounded insight prompt from pre-aggregated summaries.
///
/// Raw records never appear here: the prompt carries subject aggregates, the
/// top-ranked weak topics, and the tail of the progress series only.
pub fn build_insight_prompt(
    subject_groups: &BTreeMap<Subject, AggregatedGroup>,
    topics: &[TopicAnalysis],
    series: &[ProgressPoint],
) -> String {
    let mut prompt = String::from(
        "You are a study coach. Based on the aggregate statistics below, \
         give the student 3 short, specific recommendations.\n\nSubject accuracy:\n",
    );

    for (subject, group) in subject_groups {
        prompt.push_str(&format!(
            "- {}: {:.1}% over {} questions in {} sessions\n",
            subject.display_name(),
            group.accuracy,
            group.total_questions,
            group.attempts
        ));
    }

    if !topics.is_empty() {
        prompt.push_str("\nWeak topics (most concerning first):\n");
        for topic in topics.iter().take(PROMPT_TOPIC_LIMIT) {
            prompt.push_str(&format!(
                "- {} ({} concern, {:.1}% average, trend {})\n",
                topic.topic,
                topic.concern_level,
                topic.average_accuracy,
                topic.trend
            ));
        }
    }

    if !series.is_empty() {
        prompt.push_str("\nRecent progress:\n");
        let tail_start = series.len().saturating_sub(PROMPT_SERIES_LIMIT);
        for point in &series[tail_start..] {
            prompt.push_str(&format!(
                "- {}: {:.1}% accuracy over {} questions\n",
                point.bucket, point.group.accuracy, point.group.total_questions
            ));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConcernLevel, Trend};

    fn response_from_json(body: &str) -> GenerateResponse {
        serde_json::from_str(body).expect("valid response JSON")
    }

    #[test]
    fn test_extract_completion_happy_path() {
        let response = response_from_json(
            r#"{"candidates": [{"content": {"parts": [{"text": "Focus on optics."}]},
                "finishReason": "STOP"}]}"#,
        );
        let text = extract_completion(response, 256).unwrap();
        assert_eq!(text, "Focus on optics.");
    }

    #[test]
    fn test_extract_completion_safety_rejection() {
        let response = response_from_json(
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
        );
        match extract_completion(response, 256) {
            Err(Error::SafetyRejected(_)) => {}
            other => panic!("expected SafetyRejected, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_extract_completion_blocked_prompt() {
        let response = response_from_json(
            r#"{"candidates": [], "promptFeedback": {"blockReason": "OTHER"}}"#,
        );
        assert!(matches!(
            extract_completion(response, 256),
            Err(Error::SafetyRejected(_))
        ));
    }

    #[test]
    fn test_extract_completion_truncated() {
        let response = response_from_json(
            r#"{"candidates": [{"content": {"parts": [{"text": "partial"}]},
                "finishReason": "MAX_TOKENS"}]}"#,
        );
        assert!(matches!(
            extract_completion(response, 128),
            Err(Error::Truncated { max_tokens: 128 })
        ));
    }

    #[test]
    fn test_extract_completion_empty_response() {
        let response = response_from_json(r#"{"candidates": []}"#);
        assert!(matches!(extract_completion(response, 256), Err(Error::Chat(_))));
    }

    fn sample_topic(name: &str) -> TopicAnalysis {
        TopicAnalysis {
            topic: name.to_string(),
            subjects: vec![Subject::Physics],
            total_sessions: 3,
            average_accuracy: 45.0,
            consistency_score: 60.0,
            trend: Trend::Declining,
            concern_level: ConcernLevel::High,
            concern_score: 51.7,
            insights: vec![],
        }
    }

    #[test]
    fn test_prompt_is_bounded_and_aggregate_only() {
        let mut groups = BTreeMap::new();
        groups.insert(
            Subject::Physics,
            AggregatedGroup {
                total_questions: 300,
                total_correct: 180,
                total_wrong: 120,
                accuracy: 60.0,
                attempts: 12,
            },
        );

        let topics: Vec<TopicAnalysis> =
            (0..20).map(|i| sample_topic(&format!("topic {}", i))).collect();
        let series: Vec<ProgressPoint> = (1..=30)
            .map(|day| ProgressPoint {
                bucket: format!("2025-01-{:02}", day),
                group: AggregatedGroup::default(),
                total_minutes: 0.0,
            })
            .collect();

        let prompt = build_insight_prompt(&groups, &topics, &series);

        assert!(prompt.contains("Physics: 60.0%"));
        // Bounded: only the top topics and the series tail make it in
        assert!(prompt.contains("topic 4"));
        assert!(!prompt.contains("topic 5"));
        assert!(prompt.contains("2025-01-30"));
        assert!(!prompt.contains("2025-01-22"));
    }
}
