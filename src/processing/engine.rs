//! Conversion engine: pass-through or decode, remix, resample and encode

use std::fmt;
use std::path::Path;
use std::time::Instant;

use crate::audio::{
    write_pcm16, AudioStreamDescriptor, ConversionTarget, FormatInspector, Resample, SampleSubformat,
};
use crate::config::{ConverterConfig, PassThroughPolicy};
use crate::error::{SpcError, Result};
use crate::processing::FileTask;

/// Result of converting one [`FileTask`].
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    /// The source already satisfied the pass-through policy and was copied.
    Copied,
    /// The source was decoded, resampled and written at the target format.
    Converted,
    Failed(SpcError),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ConversionOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&SpcError> {
        match self {
            ConversionOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionOutcome::Copied => write!(f, "copied"),
            ConversionOutcome::Converted => write!(f, "converted"),
            ConversionOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

pub struct ConversionEngine {
    target: ConversionTarget,
    pass_through: PassThroughPolicy,
    inspector: FormatInspector,
    resampler: Box<dyn Resample>,
}

impl fmt::Debug for ConversionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEngine")
            .field("target", &self.target)
            .field("pass_through", &self.pass_through)
            .field("resampler", &self.resampler.name())
            .finish()
    }
}

impl ConversionEngine {
    pub fn new(target: ConversionTarget, pass_through: PassThroughPolicy, resampler: Box<dyn Resample>) -> Self {
        Self {
            target,
            pass_through,
            inspector: FormatInspector::new(),
            resampler,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.target, config.pass_through, config.resampler.build())
    }

    /// Convert one task. Errors never escape: they become [`ConversionOutcome::Failed`].
    pub fn convert(&self, task: &FileTask) -> ConversionOutcome {
        let start = Instant::now();
        match self.try_convert(&task.source, &task.destination) {
            Ok(outcome) => {
                log::debug!(
                    "{} -> {} ({}, {:.1}ms)",
                    task.source.display(),
                    task.destination.display(),
                    outcome,
                    start.elapsed().as_secs_f64() * 1000.0
                );
                outcome
            }
            Err(e) => {
                log::error!("{}", e);
                ConversionOutcome::Failed(e)
            }
        }
    }

    /// Whether a source with this descriptor is copied instead of converted.
    pub fn should_pass_through(&self, descriptor: &AudioStreamDescriptor) -> bool {
        match self.pass_through {
            PassThroughPolicy::BitDepthOnly => descriptor.subformat == SampleSubformat::Pcm16,
            PassThroughPolicy::ExactTarget => descriptor.matches(&self.target),
        }
    }

    fn try_convert(&self, source: &Path, destination: &Path) -> Result<ConversionOutcome> {
        let inspected = self.inspector.inspect(source)?;
        let descriptor = *inspected.descriptor();

        if self.should_pass_through(&descriptor) {
            drop(inspected);
            if descriptor.sample_rate != self.target.sample_rate || descriptor.channels != self.target.channels {
                log::warn!(
                    "{} is already 16-bit, copying as-is at {}Hz/{}ch",
                    source.display(),
                    descriptor.sample_rate,
                    descriptor.channels
                );
            } else {
                log::info!("{} is already 16-bit, copying", source.display());
            }
            copy_file(source, destination)?;
            return Ok(ConversionOutcome::Copied);
        }

        log::debug!("Decoding {} ({})", source.display(), descriptor);
        let buffer = inspected.decode_all()?;

        if buffer.channels() != self.target.channels {
            log::debug!(
                "Remixing {} from {} to {} channels",
                source.display(),
                buffer.channels(),
                self.target.channels
            );
        }
        let buffer = buffer.remix(self.target.channels)?;
        let buffer = self.resampler.resample(buffer, self.target.sample_rate)?;

        write_pcm16(destination, &buffer, &self.target)?;
        Ok(ConversionOutcome::Converted)
    }
}

/// Byte-for-byte copy. A failed copy leaves no destination behind.
fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Err(e) = std::fs::copy(source, destination) {
        if destination.exists() && destination != source {
            if let Err(cleanup) = std::fs::remove_file(destination) {
                log::warn!("Cannot remove partial copy {}: {}", destination.display(), cleanup);
            }
        }
        return Err(SpcError::write(destination, format!("copy failed: {}", e)));
    }
    Ok(())
}
