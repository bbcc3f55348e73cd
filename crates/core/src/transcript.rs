//! Transcript entries aggregated over the life of a call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a transcript turn.
///
/// The caller is our side of the conversation (the automated voice);
/// the technician is the human on the telephony leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Caller,
    Technician,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::Caller => write!(f, "caller"),
            TurnRole::Technician => write!(f, "technician"),
        }
    }
}

/// One finalized conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Arrival order, starting at zero. Assigned by the aggregator and
    /// never reused within a call.
    pub seq: u64,
    pub role: TurnRole,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(seq: u64, role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            seq,
            role,
            text: text.into(),
        }
    }
}

/// Render entries as role-tagged lines, one turn per line.
pub fn render_transcript(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}: {}", e.role, e.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_role_tagged_lines_in_order() {
        let entries = vec![
            TranscriptEntry::new(0, TurnRole::Technician, "I can do it for $150"),
            TranscriptEntry::new(1, TurnRole::Caller, "deal"),
        ];
        assert_eq!(
            render_transcript(&entries),
            "technician: I can do it for $150\ncaller: deal"
        );
    }

    #[test]
    fn empty_transcript_renders_empty() {
        assert_eq!(render_transcript(&[]), "");
    }
}
