//! Interleaved sample buffer owned by a single conversion

use ndarray::{Array2, ArrayView2, s};
use crate::error::{SpcError, Result};

/// Interleaved f32 samples in [-1.0, 1.0].
///
/// `samples.len()` is always a multiple of `channels`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(SpcError::resample("Channel count must be at least 1"));
        }
        if sample_rate == 0 {
            return Err(SpcError::resample("Sample rate cannot be 0"));
        }
        if samples.len() % channels as usize != 0 {
            return Err(SpcError::resample(format!(
                "Sample count {} is not a multiple of {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self { samples, channels, sample_rate })
    }

    /// Empty buffer with room for `frames` frames.
    pub fn with_capacity(frames: usize, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples: Vec::with_capacity(frames * channels as usize),
            channels,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn extend_interleaved(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    /// Planar copy, one `Vec` per channel.
    pub fn to_planar(&self) -> Vec<Vec<f32>> {
        let channels = self.channels as usize;
        (0..channels)
            .map(|ch| self.samples.iter().skip(ch).step_by(channels).copied().collect())
            .collect()
    }

    /// Rebuild an interleaved buffer from planar channels of equal length.
    pub fn from_planar(planar: &[Vec<f32>], sample_rate: u32) -> Result<Self> {
        let channels = planar.len();
        if channels == 0 {
            return Err(SpcError::resample("No channels to interleave"));
        }
        let frames = planar[0].len();
        if planar.iter().any(|ch| ch.len() != frames) {
            return Err(SpcError::resample("Planar channels differ in length"));
        }

        let mut samples = Vec::with_capacity(frames * channels);
        for i in 0..frames {
            for ch in planar {
                samples.push(ch[i]);
            }
        }
        Self::new(samples, channels as u16, sample_rate)
    }

    /// Map the buffer onto `target_channels`.
    ///
    /// Mono is copied to every output channel. Otherwise the leading
    /// `target_channels` channels are kept (front left/right for a stereo
    /// target). A source with fewer channels than the target repeats its last
    /// channel.
    pub fn remix(self, target_channels: u16) -> Result<Self> {
        if target_channels == 0 {
            return Err(SpcError::resample("Target channel count must be at least 1"));
        }
        if self.channels == target_channels {
            return Ok(self);
        }

        let frames = self.frames();
        let src_channels = self.channels as usize;
        let dst_channels = target_channels as usize;

        let view = ArrayView2::from_shape((frames, src_channels), self.samples.as_slice())
            .map_err(|e| SpcError::resample(format!("Invalid buffer shape: {}", e)))?;
        let mut out = Array2::<f32>::zeros((frames, dst_channels));

        if src_channels >= dst_channels {
            out.assign(&view.slice(s![.., ..dst_channels]));
        } else {
            for ch in 0..dst_channels {
                out.column_mut(ch).assign(&view.column(ch.min(src_channels - 1)));
            }
        }

        Ok(Self {
            samples: out.into_raw_vec(),
            channels: target_channels,
            sample_rate: self.sample_rate,
        })
    }

    /// Quantize to signed 16-bit, clamping out-of-range and non-finite values.
    pub fn to_pcm16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&s| {
                let s = if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 };
                (s * 32767.0) as i16
            })
            .collect()
    }
}
