//! JSON framing for the telephony media stream.
//!
//! Frames are discriminated by an `event` field. Inbound traffic is
//! `connected`, `start`, `media`, `mark` and `stop`; outbound traffic is
//! `media` (audio toward the caller) and `clear` (flush buffered audio
//! on barge-in). Field names on the wire are camelCase.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelephonyMessage {
    Connected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protocol: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    Start {
        #[serde(
            rename = "streamSid",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        stream_sid: Option<String>,
        start: StartFrame,
    },
    Media {
        #[serde(
            rename = "streamSid",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        stream_sid: Option<String>,
        media: MediaFrame,
    },
    Mark {
        #[serde(
            rename = "streamSid",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        stream_sid: Option<String>,
        mark: MarkFrame,
    },
    Stop {
        #[serde(
            rename = "streamSid",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        stream_sid: Option<String>,
    },
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },
    /// Any event type this side does not handle (`dtmf`, vendor
    /// extensions). Parsed and ignored rather than treated as an error.
    #[serde(other)]
    Unknown,
}

impl TelephonyMessage {
    /// Outbound audio toward the caller.
    pub fn media(stream_sid: &str, payload: String) -> Self {
        TelephonyMessage::Media {
            stream_sid: Some(stream_sid.to_owned()),
            media: MediaFrame {
                payload,
                timestamp: None,
                chunk: None,
            },
        }
    }

    /// Outbound request to drop any audio still queued for playback.
    pub fn clear(stream_sid: &str) -> Self {
        TelephonyMessage::Clear {
            stream_sid: stream_sid.to_owned(),
        }
    }
}

/// Body of the `start` frame that opens a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartFrame {
    #[serde(rename = "streamSid")]
    pub stream_sid: String,
    #[serde(rename = "callSid", default, skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
    /// Free-form parameters set when the call was initiated; carries the
    /// key the negotiation context is fetched under.
    #[serde(rename = "customParameters", default)]
    pub custom_parameters: HashMap<String, String>,
}

impl StartFrame {
    /// The context store key, when the initiator supplied one.
    pub fn context_key(&self) -> Option<&str> {
        self.custom_parameters.get("provider_id").map(String::as_str)
    }
}

/// Body of a `media` frame. The payload is base64 mu-law audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFrame {
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkFrame {
    pub name: String,
}
