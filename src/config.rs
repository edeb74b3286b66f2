//! Configuration management for conversion runs

use crate::audio::{ConversionTarget, ResamplerKind};
use crate::error::{SpcError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Extensions the batch walker picks up. Matching is case-sensitive.
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".wav", ".flac", ".ogg", ".mp3"];

/// Marker appended to converted file names and to the mirrored directory.
pub const DEFAULT_SUFFIX: &str = "-SPC";

/// When a source may be copied instead of converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassThroughPolicy {
    /// Any PCM16 source is copied, whatever its rate and channel count.
    #[default]
    BitDepthOnly,
    /// Only sources that already match the target in every respect are copied.
    ExactTarget,
}

#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub target: ConversionTarget,
    pub allowed_extensions: Vec<String>,
    pub suffix: String,
    pub recursive: bool,
    pub sort_entries: bool,
    pub jobs: usize,
    pub pass_through: PassThroughPolicy,
    pub resampler: ResamplerKind,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            target: ConversionTarget::default(),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            suffix: DEFAULT_SUFFIX.to_string(),
            recursive: true,
            sort_entries: true,
            jobs: 1,
            pass_through: PassThroughPolicy::default(),
            resampler: ResamplerKind::default(),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "spconverter", about = "Convert audio files to 16-bit 48 kHz stereo WAV", version, author)]
pub struct Args {
    #[arg(help = "Input audio file or directory")]
    pub input: PathBuf,

    #[arg(long = "no-recursive", help = "Only convert files directly inside the input directory")]
    pub no_recursive: bool,

    #[arg(short = 'j', long = "jobs", default_value = "1", help = "Number of files converted in parallel")]
    pub jobs: usize,

    #[arg(long = "strict", help = "Only copy 16-bit sources that already match the target rate, channels and container")]
    pub strict: bool,

    #[arg(long = "fast-resample", help = "Use linear interpolation instead of sinc resampling")]
    pub fast_resample: bool,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,
}

impl ConverterConfig {
    /// Create config from command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Self {
            recursive: !args.no_recursive,
            jobs: args.jobs,
            pass_through: if args.strict {
                PassThroughPolicy::ExactTarget
            } else {
                PassThroughPolicy::BitDepthOnly
            },
            resampler: if args.fast_resample {
                ResamplerKind::Linear
            } else {
                ResamplerKind::Sinc
            },
            ..Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.sample_rate == 0 {
            return Err(SpcError::config("Target sample rate must be greater than 0"));
        }
        if self.target.sample_rate > 192000 {
            return Err(SpcError::config("Target sample rate cannot exceed 192000 Hz"));
        }
        if self.target.channels == 0 {
            return Err(SpcError::config("Target channel count must be greater than 0"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(SpcError::config("Extension allow-list cannot be empty"));
        }
        if let Some(ext) = self.allowed_extensions.iter().find(|e| !e.starts_with('.') || e.len() < 2) {
            return Err(SpcError::config(format!("Invalid extension '{}', expected e.g. \".wav\"", ext)));
        }

        if self.suffix.is_empty() {
            return Err(SpcError::config("Output suffix cannot be empty"));
        }
        if self.suffix.contains(std::path::MAIN_SEPARATOR) || self.suffix.contains('/') {
            return Err(SpcError::config("Output suffix cannot contain a path separator"));
        }

        if self.jobs == 0 {
            return Err(SpcError::config("Job count must be greater than 0"));
        }
        if self.jobs > num_cpus::get() * 2 {
            return Err(SpcError::config("Job count cannot exceed 2x logical CPU cores"));
        }

        Ok(())
    }

    /// Case-sensitive check of `path`'s extension against the allow-list.
    pub fn is_allowed(&self, path: &std::path::Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.strip_prefix('.') == Some(ext)),
            None => false,
        }
    }
}
