//! Audio Module
//!
//! Stream inspection and decoding, the interleaved sample buffer, resampling
//! and PCM16 WAV output.

pub mod buffer;
pub mod converter;
pub mod format;
pub mod inspect;
pub mod wav;

pub use buffer::SampleBuffer;
pub use converter::{LinearResampler, Resample, ResamplerKind, SincResampler};
pub use format::{AudioStreamDescriptor, ContainerKind, ConversionTarget, SampleSubformat};
pub use inspect::{FormatInspector, InspectedSource};
pub use wav::write_pcm16;
