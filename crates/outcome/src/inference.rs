//! Primary extraction path: ask a chat-completion model for the price.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::OutcomeError;

const SYSTEM_PROMPT: &str = "You review a finished phone negotiation transcript. \
Reply with only the final agreed price as a plain number, or the word none \
if no price was agreed.";

/// What the primary extraction path concluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceAnswer {
    Price(f64),
    /// The model affirmatively said no price was agreed.
    None,
}

/// Seam for the primary extractor so tests can substitute a stub.
#[async_trait]
pub trait PriceInference: Send + Sync {
    async fn final_price(&self, transcript: &str) -> Result<PriceAnswer, OutcomeError>;
}

/// Chat-completions client for the primary extraction path.
pub struct ChatInference {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatInference {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl PriceInference for ChatInference {
    async fn final_price(&self, transcript: &str) -> Result<PriceAnswer, OutcomeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: transcript,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;
        let answer = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_owned())
            .ok_or_else(|| OutcomeError::Malformed("response had no choices".into()))?;
        debug!(answer = %answer, "price inference answered");
        parse_answer(&answer)
    }
}

/// Interpret the model's one-line answer: the first numeric token is the
/// price, a negative number or a none-like word means no agreement.
pub(crate) fn parse_answer(answer: &str) -> Result<PriceAnswer, OutcomeError> {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static NUMBER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern"));

    if let Some(m) = NUMBER.find(answer) {
        let value: f64 = m
            .as_str()
            .parse()
            .map_err(|_| OutcomeError::Malformed(format!("unparseable number in {answer:?}")))?;
        if value < 0.0 {
            return Ok(PriceAnswer::None);
        }
        return Ok(PriceAnswer::Price(value));
    }

    let lowered = answer.to_lowercase();
    if lowered.contains("none") || lowered.contains("no agreement") || lowered.contains("n/a") {
        return Ok(PriceAnswer::None);
    }

    Err(OutcomeError::Malformed(format!(
        "answer carried no price or refusal: {answer:?}"
    )))
}
