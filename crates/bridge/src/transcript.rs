//! Transcript aggregation over heterogeneous realtime events.
//!
//! Several event shapes can carry the same finished AI turn (a
//! transcript-done, a text-done, the response summary, the committed
//! conversation item), so caller turns are deduplicated by exact text
//! across the whole call. Technician turns arrive once per utterance and
//! are kept verbatim, repeats included.

use tracing::debug;

use haggle_core::{render_transcript, TranscriptEntry, TurnRole};
use haggle_transport::RealtimeServerEvent;

#[derive(Default)]
pub struct TranscriptLog {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn. Blank text is discarded, and caller turns whose
    /// exact text was already recorded are dropped as duplicates.
    /// Returns whether the turn was recorded.
    pub fn push(&mut self, role: TurnRole, text: impl Into<String>) -> bool {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        if role == TurnRole::Caller
            && self
                .entries
                .iter()
                .any(|e| e.role == TurnRole::Caller && e.text == trimmed)
        {
            return false;
        }
        let seq = self.entries.len() as u64;
        debug!(seq, %role, "transcript turn recorded");
        self.entries.push(TranscriptEntry::new(seq, role, trimmed));
        true
    }

    /// Fold one realtime event into the log. Events that carry no
    /// finished turn are ignored.
    pub fn observe(&mut self, event: &RealtimeServerEvent) {
        match event {
            RealtimeServerEvent::InputTranscriptionCompleted { transcript } => {
                self.push(TurnRole::Technician, transcript.as_str());
            }
            RealtimeServerEvent::AudioTranscriptDone { transcript } => {
                self.push(TurnRole::Caller, transcript.as_str());
            }
            RealtimeServerEvent::TextDone { text } => {
                self.push(TurnRole::Caller, text.as_str());
            }
            RealtimeServerEvent::ResponseDone { response } => {
                for item in &response.output {
                    if item.kind == "message" {
                        if let Some(text) = item.readable_text() {
                            self.push(TurnRole::Caller, text);
                        }
                    }
                }
            }
            RealtimeServerEvent::ItemCreated { item } => {
                if item.role.as_deref() == Some("assistant") {
                    if let Some(text) = item.readable_text() {
                        self.push(TurnRole::Caller, text);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.entries.clone()
    }

    pub fn render(&self) -> String {
        render_transcript(&self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haggle_transport::RealtimeServerEvent;

    fn event(raw: &str) -> RealtimeServerEvent {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn entries_keep_arrival_order_with_sequence_numbers() {
        let mut log = TranscriptLog::new();
        log.observe(&event(
            r#"{"type":"conversation.item.input_audio_transcription.completed","transcript":"I can do it for $150"}"#,
        ));
        log.observe(&event(
            r#"{"type":"response.audio_transcript.done","transcript":"deal"}"#,
        ));

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 0);
        assert_eq!(entries[0].role, TurnRole::Technician);
        assert_eq!(entries[1].seq, 1);
        assert_eq!(
            log.render(),
            "technician: I can do it for $150\ncaller: deal"
        );
    }

    #[test]
    fn same_caller_turn_across_event_shapes_is_recorded_once() {
        let mut log = TranscriptLog::new();
        log.observe(&event(
            r#"{"type":"response.audio_transcript.done","transcript":"how about 175"}"#,
        ));
        log.observe(&event(
            r#"{"type":"conversation.item.created","item":{"type":"message","role":"assistant","content":[{"type":"audio","transcript":"how about 175"}]}}"#,
        ));
        log.observe(&event(
            r#"{"type":"response.done","response":{"output":[{"type":"message","role":"assistant","content":[{"type":"audio","transcript":"how about 175"}]}]}}"#,
        ));

        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].text, "how about 175");
    }

    #[test]
    fn repeated_technician_turns_are_kept() {
        let mut log = TranscriptLog::new();
        for _ in 0..2 {
            log.observe(&event(
                r#"{"type":"conversation.item.input_audio_transcription.completed","transcript":"hello?"}"#,
            ));
        }
        assert_eq!(log.entries().len(), 2);
    }

    #[test]
    fn blank_turns_are_discarded() {
        let mut log = TranscriptLog::new();
        log.observe(&event(
            r#"{"type":"conversation.item.input_audio_transcription.completed","transcript":"  "}"#,
        ));
        log.observe(&event(r#"{"type":"response.text.done","text":""}"#));
        assert!(log.is_empty());
    }

    #[test]
    fn audio_deltas_and_unknown_events_do_not_touch_the_log() {
        let mut log = TranscriptLog::new();
        log.observe(&event(
            r#"{"type":"response.output_audio.delta","delta":"AAAA"}"#,
        ));
        // Interim transcript deltas are not finished turns.
        log.observe(&event(
            r#"{"type":"response.audio_transcript.delta","delta":"how ab"}"#,
        ));
        log.observe(&event(r#"{"type":"session.updated"}"#));
        log.observe(&event(r#"{"type":"input_audio_buffer.speech_started"}"#));
        assert!(log.is_empty());
    }

    #[test]
    fn non_assistant_items_are_ignored() {
        let mut log = TranscriptLog::new();
        log.observe(&event(
            r#"{"type":"conversation.item.created","item":{"type":"message","role":"user","content":[{"type":"input_text","text":"hi"}]}}"#,
        ));
        assert!(log.is_empty());
    }
}
