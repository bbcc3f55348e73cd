//! Audio transcoding between the telephony and realtime legs.
//!
//! Inbound: base64 mu-law 8 kHz -> linear PCM -> 24 kHz PCM16 -> base64.
//! Outbound: the reverse. Each direction owns a [`StreamResampler`] that
//! carries interpolation state across frames, so arbitrary frame sizes
//! resample exactly as one continuous signal would.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use haggle_core::{AudioFormat, AudioFrame};

use crate::TransportError;

const BIAS: i32 = 0x84;
const CLIP: i32 = 32_635;

/// Decode one G.711 mu-law byte to a linear 16-bit sample.
pub fn ulaw_to_linear(byte: u8) -> i16 {
    let b = !byte;
    let sign = b & 0x80 != 0;
    let exponent = (b >> 4) & 0x07;
    let mantissa = (b & 0x0f) as i32;
    let magnitude = (((mantissa << 3) + BIAS) << exponent) - BIAS;
    if sign {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

/// Encode a linear 16-bit sample as one G.711 mu-law byte.
pub fn linear_to_ulaw(sample: i16) -> u8 {
    let mut value = sample as i32;
    let sign: u8 = if value < 0 {
        value = -value;
        0x80
    } else {
        0
    };
    if value > CLIP {
        value = CLIP;
    }
    value += BIAS;

    let mut exponent: u8 = 7;
    let mut mask = 0x4000;
    while exponent > 0 && value & mask == 0 {
        exponent -= 1;
        mask >>= 1;
    }
    let mantissa = ((value >> (exponent + 3)) & 0x0f) as u8;
    !(sign | (exponent << 4) | mantissa)
}

pub fn decode_ulaw(bytes: &[u8]) -> Vec<i16> {
    bytes.iter().map(|&b| ulaw_to_linear(b)).collect()
}

pub fn encode_ulaw(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| linear_to_ulaw(s)).collect()
}

fn pcm16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

fn bytes_to_pcm16(bytes: &[u8]) -> Result<Vec<i16>, TransportError> {
    if bytes.len() % 2 != 0 {
        return Err(TransportError::Media(format!(
            "pcm payload has odd length {}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Linear-interpolation resampler whose state persists across frames.
///
/// Output sample `k` is taken at input time `k * from / to`, with both
/// counters kept for the lifetime of the stream. The last input sample
/// of each frame is retained so interpolation can straddle the frame
/// boundary. Feeding a signal split into frames of any sizes therefore
/// yields exactly the samples the unsplit signal would.
#[derive(Debug)]
pub struct StreamResampler {
    from: u32,
    to: u32,
    /// Input samples consumed so far, across all frames.
    consumed: u64,
    /// Output samples produced so far, across all frames.
    produced: u64,
    /// Last sample of the previous frame, if any.
    prev: Option<i16>,
}

impl StreamResampler {
    pub fn new(from: u32, to: u32) -> Self {
        Self {
            from,
            to,
            consumed: 0,
            produced: 0,
            prev: None,
        }
    }

    pub fn process(&mut self, input: &[i16]) -> Vec<i16> {
        if input.is_empty() {
            return Vec::new();
        }

        let prev = self.prev;
        let carried = u64::from(prev.is_some());
        // Absolute input-time index of the first sample we can read.
        let base = self.consumed - carried;
        let ext_len = input.len() as u64 + carried;
        let last = base + ext_len - 1;
        let at = move |abs: u64| -> i16 {
            let rel = abs - base;
            if carried == 1 && rel == 0 {
                prev.unwrap_or(0)
            } else {
                input[(rel - carried) as usize]
            }
        };

        let ratio = f64::from(self.from) / f64::from(self.to);
        let mut out = Vec::with_capacity(
            (input.len() * self.to as usize) / self.from as usize + 2,
        );
        loop {
            let t = self.produced as f64 * ratio;
            if t > last as f64 {
                break;
            }
            let i0 = t as u64;
            let frac = t - i0 as f64;
            let s0 = f64::from(at(i0));
            let s1 = f64::from(at((i0 + 1).min(last)));
            let v = s0 + (s1 - s0) * frac;
            out.push(v.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16);
            self.produced += 1;
        }

        self.consumed += input.len() as u64;
        self.prev = input.last().copied();
        out
    }
}

/// Inbound pipeline: telephony mu-law frames to realtime PCM16.
pub struct TelephonyToAi {
    resampler: StreamResampler,
}

impl TelephonyToAi {
    pub fn new() -> Self {
        Self {
            resampler: StreamResampler::new(
                AudioFormat::TELEPHONY.sample_rate,
                AudioFormat::REALTIME.sample_rate,
            ),
        }
    }

    pub fn transcode(&mut self, frame: &AudioFrame) -> Result<AudioFrame, TransportError> {
        if frame.format != AudioFormat::TELEPHONY {
            return Err(TransportError::Media(format!(
                "expected telephony frame, got {:?}",
                frame.format
            )));
        }
        let pcm = decode_ulaw(&frame.bytes);
        let upsampled = self.resampler.process(&pcm);
        Ok(AudioFrame::realtime(pcm16_to_bytes(&upsampled)))
    }

    /// Transcode one base64 wire payload to a base64 payload for the AI leg.
    pub fn transcode_payload(&mut self, payload: &str) -> Result<String, TransportError> {
        let frame = AudioFrame::telephony(BASE64.decode(payload)?);
        let out = self.transcode(&frame)?;
        Ok(BASE64.encode(out.bytes))
    }
}

impl Default for TelephonyToAi {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbound pipeline: realtime PCM16 deltas to telephony mu-law frames.
pub struct AiToTelephony {
    resampler: StreamResampler,
}

impl AiToTelephony {
    pub fn new() -> Self {
        Self {
            resampler: StreamResampler::new(
                AudioFormat::REALTIME.sample_rate,
                AudioFormat::TELEPHONY.sample_rate,
            ),
        }
    }

    pub fn transcode(&mut self, frame: &AudioFrame) -> Result<AudioFrame, TransportError> {
        if frame.format != AudioFormat::REALTIME {
            return Err(TransportError::Media(format!(
                "expected realtime frame, got {:?}",
                frame.format
            )));
        }
        let pcm = bytes_to_pcm16(&frame.bytes)?;
        let downsampled = self.resampler.process(&pcm);
        Ok(AudioFrame::telephony(encode_ulaw(&downsampled)))
    }

    /// Transcode one base64 audio delta to a base64 telephony payload.
    pub fn transcode_payload(&mut self, delta: &str) -> Result<String, TransportError> {
        let frame = AudioFrame::realtime(BASE64.decode(delta)?);
        let out = self.transcode(&frame)?;
        Ok(BASE64.encode(out.bytes))
    }
}

impl Default for AiToTelephony {
    fn default() -> Self {
        Self::new()
    }
}
