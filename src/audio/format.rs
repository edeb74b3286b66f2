//! Stream descriptors and the fixed conversion target

use std::fmt;

/// Sample encoding of a stream, independent of its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleSubformat {
    Pcm16,
    Pcm24,
    Pcm32,
    Float32,
    Float64,
    Other,
}

impl SampleSubformat {
    pub fn name(&self) -> &'static str {
        match self {
            SampleSubformat::Pcm16 => "pcm16",
            SampleSubformat::Pcm24 => "pcm24",
            SampleSubformat::Pcm32 => "pcm32",
            SampleSubformat::Float32 => "float32",
            SampleSubformat::Float64 => "float64",
            SampleSubformat::Other => "other",
        }
    }

    /// Lossless subformats declare an exact frame count, so a short decode is corruption.
    pub fn is_lossless(&self) -> bool {
        !matches!(self, SampleSubformat::Other)
    }
}

impl fmt::Display for SampleSubformat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Wav,
    Flac,
    Ogg,
    Mp3,
    Other,
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Wav => "wav",
            ContainerKind::Flac => "flac",
            ContainerKind::Ogg => "ogg",
            ContainerKind::Mp3 => "mp3",
            ContainerKind::Other => "other",
        }
    }
}

/// Metadata of a source stream as read by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioStreamDescriptor {
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_count: u64,
    pub subformat: SampleSubformat,
    pub container: ContainerKind,
}

impl AudioStreamDescriptor {
    /// True when rate, channels, subformat and container all equal the target.
    pub fn matches(&self, target: &ConversionTarget) -> bool {
        self.sample_rate == target.sample_rate
            && self.channels == target.channels
            && self.subformat == target.subformat
            && self.container == target.container
    }
}

impl fmt::Display for AudioStreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}Hz {}ch {} frames",
            self.container.name(),
            self.subformat,
            self.sample_rate,
            self.channels,
            self.frame_count
        )
    }
}

/// Format every converted file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionTarget {
    pub sample_rate: u32,
    pub channels: u16,
    pub subformat: SampleSubformat,
    pub container: ContainerKind,
}

impl ConversionTarget {
    pub const DEFAULT: ConversionTarget = ConversionTarget {
        sample_rate: 48000,
        channels: 2,
        subformat: SampleSubformat::Pcm16,
        container: ContainerKind::Wav,
    };

    pub fn to_wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

impl Default for ConversionTarget {
    fn default() -> Self {
        Self::DEFAULT
    }
}
