//! JSON event framing for the realtime AI leg.
//!
//! Events are discriminated by a dotted `type` field. Only the events
//! the bridge acts on are modelled; everything else lands in `Unknown`
//! and is skipped without failing the stream.

use serde::{Deserialize, Serialize};

/// Events we send to the AI engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RealtimeClientEvent {
    /// Configure the session before any audio flows.
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },

    /// One chunk of caller audio, base64 PCM16 at the session rate.
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioAppend { audio: String },

    /// Ask the engine to speak first.
    #[serde(rename = "response.create")]
    ResponseCreate,
}

/// The `session` object sent in `session.update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    pub voice: String,
    pub instructions: String,
    pub turn_detection: TurnDetection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<TranscriptionConfig>,
    pub audio: AudioDirections,
}

impl SessionConfig {
    /// Session configured for server-side turn detection with PCM audio
    /// at `sample_rate` on both directions.
    pub fn new(
        voice: impl Into<String>,
        instructions: impl Into<String>,
        sample_rate: u32,
        transcription_model: Option<String>,
    ) -> Self {
        Self {
            voice: voice.into(),
            instructions: instructions.into(),
            turn_detection: TurnDetection {
                kind: "server_vad".to_owned(),
            },
            input_audio_transcription: transcription_model
                .map(|model| TranscriptionConfig { model }),
            audio: AudioDirections {
                input: AudioLeg::pcm(sample_rate),
                output: AudioLeg::pcm(sample_rate),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionConfig {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioDirections {
    pub input: AudioLeg,
    pub output: AudioLeg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioLeg {
    pub format: WireFormat,
}

impl AudioLeg {
    fn pcm(rate: u32) -> Self {
        Self {
            format: WireFormat {
                kind: "audio/pcm".to_owned(),
                rate,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireFormat {
    #[serde(rename = "type")]
    pub kind: String,
    pub rate: u32,
}

/// Events the AI engine sends us.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum RealtimeServerEvent {
    /// One chunk of synthesized speech, base64 PCM16.
    #[serde(rename = "response.output_audio.delta")]
    OutputAudioDelta { delta: String },

    /// Finalized transcription of what the human said.
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    InputTranscriptionCompleted {
        #[serde(default)]
        transcript: String,
    },

    /// Finalized transcript of one spoken response.
    #[serde(rename = "response.audio_transcript.done")]
    AudioTranscriptDone {
        #[serde(default)]
        transcript: String,
    },

    /// Finalized text of one text-only response.
    #[serde(rename = "response.text.done")]
    TextDone {
        #[serde(default)]
        text: String,
    },

    /// End of a full response; carries every output item it produced.
    #[serde(rename = "response.done")]
    ResponseDone {
        #[serde(default)]
        response: ResponsePayload,
    },

    /// A conversation item was committed to the session.
    #[serde(rename = "conversation.item.created")]
    ItemCreated { item: MessageItem },

    /// The human started talking over the agent.
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted,

    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped,

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        error: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponsePayload {
    #[serde(default)]
    pub output: Vec<MessageItem>,
}

/// A message item, both as a `response.done` output entry and as the
/// body of `conversation.item.created`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl MessageItem {
    /// Concatenated readable text across the item's content parts.
    pub fn readable_text(&self) -> Option<String> {
        let mut pieces = Vec::new();
        for part in &self.content {
            let piece = match part.kind.as_str() {
                "text" | "input_text" | "output_text" => part.text.as_deref(),
                "audio" | "input_audio" | "output_audio" => part.transcript.as_deref(),
                _ => None,
            };
            if let Some(p) = piece {
                if !p.trim().is_empty() {
                    pieces.push(p.trim());
                }
            }
        }
        if pieces.is_empty() {
            None
        } else {
            Some(pieces.join(" "))
        }
    }
}
