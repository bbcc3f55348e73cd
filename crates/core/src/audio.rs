//! Audio frame descriptions for the two sides of the bridge.

use serde::{Deserialize, Serialize};

/// Byte-level encoding of an audio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoding {
    /// ITU-T G.711 mu-law, one byte per sample.
    PcmMulaw,
    /// Signed 16-bit little-endian PCM, two bytes per sample.
    Pcm16,
}

impl AudioEncoding {
    /// Bytes occupied by a single sample.
    pub fn sample_width(self) -> usize {
        match self {
            AudioEncoding::PcmMulaw => 1,
            AudioEncoding::Pcm16 => 2,
        }
    }
}

/// Encoding plus rate for a stream of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub encoding: AudioEncoding,
    pub sample_rate: u32,
    pub channels: u8,
}

impl AudioFormat {
    /// The telephony leg: 8 kHz mono mu-law.
    pub const TELEPHONY: AudioFormat = AudioFormat {
        encoding: AudioEncoding::PcmMulaw,
        sample_rate: 8_000,
        channels: 1,
    };

    /// The realtime AI leg: 24 kHz mono PCM16.
    pub const REALTIME: AudioFormat = AudioFormat {
        encoding: AudioEncoding::Pcm16,
        sample_rate: 24_000,
        channels: 1,
    };
}

/// A single chunk of audio as it moves through the bridge.
///
/// Frames carry their format so a transcoder can reject payloads that
/// arrive on the wrong leg instead of corrupting the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl AudioFrame {
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self { bytes, format }
    }

    pub fn telephony(bytes: Vec<u8>) -> Self {
        Self::new(bytes, AudioFormat::TELEPHONY)
    }

    pub fn realtime(bytes: Vec<u8>) -> Self {
        Self::new(bytes, AudioFormat::REALTIME)
    }

    /// Number of samples in the frame.
    pub fn sample_count(&self) -> usize {
        self.bytes.len() / self.format.encoding.sample_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_respects_encoding_width() {
        let mulaw = AudioFrame::telephony(vec![0u8; 160]);
        assert_eq!(mulaw.sample_count(), 160);

        let pcm = AudioFrame::realtime(vec![0u8; 960]);
        assert_eq!(pcm.sample_count(), 480);
    }

    #[test]
    fn leg_formats_are_fixed() {
        assert_eq!(AudioFormat::TELEPHONY.sample_rate, 8_000);
        assert_eq!(AudioFormat::TELEPHONY.encoding, AudioEncoding::PcmMulaw);
        assert_eq!(AudioFormat::REALTIME.sample_rate, 24_000);
        assert_eq!(AudioFormat::REALTIME.encoding, AudioEncoding::Pcm16);
    }
}
