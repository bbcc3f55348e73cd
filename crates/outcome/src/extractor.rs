//! Orchestrates the primary and fallback extraction paths.

use std::sync::Arc;

use tracing::{info, warn};

use haggle_core::{render_transcript, NegotiationOutcome, TranscriptEntry};

use crate::inference::{PriceAnswer, PriceInference};
use crate::patterns::last_price_mention;

/// Turns a finished transcript into a negotiation outcome.
///
/// The primary inference path is consulted first when configured; the
/// pattern scan covers a missing or failing primary. A primary that
/// ERRORS and a fallback that finds nothing is an extraction failure
/// rather than a clean no-agreement, since the transcript was never
/// successfully read.
pub struct OutcomeExtractor {
    inference: Option<Arc<dyn PriceInference>>,
}

impl OutcomeExtractor {
    pub fn new(inference: Option<Arc<dyn PriceInference>>) -> Self {
        Self { inference }
    }

    /// Extractor that only runs the deterministic pattern scan.
    pub fn fallback_only() -> Self {
        Self { inference: None }
    }

    pub async fn extract(&self, entries: &[TranscriptEntry]) -> NegotiationOutcome {
        if entries.is_empty() {
            return NegotiationOutcome::no_agreement();
        }

        let rendered = render_transcript(entries);

        let mut primary_errored = false;
        if let Some(inference) = &self.inference {
            match inference.final_price(&rendered).await {
                Ok(PriceAnswer::Price(price)) => {
                    info!(price, "primary extraction found agreed price");
                    return NegotiationOutcome::agreed(price);
                }
                Ok(PriceAnswer::None) => {
                    info!("primary extraction found no agreement");
                    return NegotiationOutcome::no_agreement();
                }
                Err(e) => {
                    warn!(error = %e, "primary extraction failed, falling back to pattern scan");
                    primary_errored = true;
                }
            }
        }

        match last_price_mention(&rendered) {
            Some(price) => {
                info!(price, "pattern scan found agreed price");
                NegotiationOutcome::agreed(price)
            }
            None if primary_errored => NegotiationOutcome::extraction_failed(),
            None => NegotiationOutcome::no_agreement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use haggle_core::{CallStatus, TurnRole};

    use crate::OutcomeError;

    struct StubInference(Result<PriceAnswer, &'static str>);

    #[async_trait]
    impl PriceInference for StubInference {
        async fn final_price(&self, _transcript: &str) -> Result<PriceAnswer, OutcomeError> {
            self.0.map_err(|m| OutcomeError::Request(m.into()))
        }
    }

    fn entries(lines: &[(TurnRole, &str)]) -> Vec<TranscriptEntry> {
        lines
            .iter()
            .enumerate()
            .map(|(i, (role, text))| TranscriptEntry::new(i as u64, *role, *text))
            .collect()
    }

    #[tokio::test]
    async fn empty_transcript_is_no_agreement() {
        let outcome = OutcomeExtractor::fallback_only().extract(&[]).await;
        assert_eq!(outcome.status, CallStatus::NoAgreement);
    }

    #[tokio::test]
    async fn fallback_finds_single_quote() {
        let entries = entries(&[
            (TurnRole::Technician, "I can do it for $150"),
            (TurnRole::Caller, "deal"),
        ]);
        let outcome = OutcomeExtractor::fallback_only().extract(&entries).await;
        assert_eq!(outcome.status, CallStatus::Agreed);
        assert_eq!(outcome.agreed_price, Some(150.0));
    }

    #[tokio::test]
    async fn fallback_prefers_last_mention() {
        let entries = entries(&[
            (TurnRole::Technician, "it'll be $200"),
            (TurnRole::Caller, "too high"),
            (TurnRole::Technician, "fine, $175, final offer"),
            (TurnRole::Caller, "deal"),
        ]);
        let outcome = OutcomeExtractor::fallback_only().extract(&entries).await;
        assert_eq!(outcome.agreed_price, Some(175.0));
    }

    #[tokio::test]
    async fn primary_answer_wins_over_pattern_scan() {
        let extractor =
            OutcomeExtractor::new(Some(Arc::new(StubInference(Ok(PriceAnswer::Price(210.0))))));
        let entries = entries(&[(TurnRole::Technician, "between $200 and $220 somewhere")]);
        let outcome = extractor.extract(&entries).await;
        assert_eq!(outcome.agreed_price, Some(210.0));
    }

    #[tokio::test]
    async fn primary_none_skips_fallback() {
        let extractor = OutcomeExtractor::new(Some(Arc::new(StubInference(Ok(PriceAnswer::None)))));
        let entries = entries(&[(TurnRole::Technician, "the quote was $500 last week")]);
        let outcome = extractor.extract(&entries).await;
        assert_eq!(outcome.status, CallStatus::NoAgreement);
    }

    #[tokio::test]
    async fn primary_error_falls_back_to_patterns() {
        let extractor = OutcomeExtractor::new(Some(Arc::new(StubInference(Err("timeout")))));
        let entries = entries(&[(TurnRole::Technician, "we agreed on 250")]);
        let outcome = extractor.extract(&entries).await;
        assert_eq!(outcome.agreed_price, Some(250.0));
    }

    #[tokio::test]
    async fn primary_error_and_fallback_miss_is_extraction_failed() {
        let extractor = OutcomeExtractor::new(Some(Arc::new(StubInference(Err("timeout")))));
        let entries = entries(&[(TurnRole::Caller, "thanks anyway, goodbye")]);
        let outcome = extractor.extract(&entries).await;
        assert_eq!(outcome.status, CallStatus::ExtractionFailed);
    }

    #[tokio::test]
    async fn no_primary_and_fallback_miss_is_no_agreement() {
        let entries = entries(&[(TurnRole::Caller, "thanks anyway, goodbye")]);
        let outcome = OutcomeExtractor::fallback_only().extract(&entries).await;
        assert_eq!(outcome.status, CallStatus::NoAgreement);
    }
}
