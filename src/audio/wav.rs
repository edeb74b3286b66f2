//! PCM16 WAV output

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use hound::WavWriter;
use crate::audio::{ConversionTarget, SampleBuffer};
use crate::error::{SpcError, Result};

/// Write `buffer` to `path` as a 16-bit WAV declared with `target`'s rate and
/// channel count.
///
/// The buffer must already be at the target layout. A failed write removes
/// whatever was created at `path`.
pub fn write_pcm16<P: AsRef<Path>>(path: P, buffer: &SampleBuffer, target: &ConversionTarget) -> Result<()> {
    let path = path.as_ref();

    if buffer.channels() != target.channels || buffer.sample_rate() != target.sample_rate {
        return Err(SpcError::write(
            path,
            format!(
                "buffer is {}Hz/{}ch but target is {}Hz/{}ch",
                buffer.sample_rate(),
                buffer.channels(),
                target.sample_rate,
                target.channels
            ),
        ));
    }

    let result = write_samples(path, buffer, target);
    if result.is_err() && path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("Cannot remove partial output {}: {}", path.display(), e);
        }
    }
    result
}

fn write_samples(path: &Path, buffer: &SampleBuffer, target: &ConversionTarget) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| SpcError::write(path, format!("cannot create output file: {}", e)))?;

    let mut writer = WavWriter::new(BufWriter::new(file), target.to_wav_spec())
        .map_err(|e| SpcError::write(path, format!("cannot create WAV writer: {}", e)))?;

    for sample in buffer.to_pcm16() {
        writer
            .write_sample(sample)
            .map_err(|e| SpcError::write(path, format!("failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| SpcError::write(path, format!("failed to finalize WAV: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_pcm16() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        let buffer = SampleBuffer::new(vec![0.0, 0.5, -0.5, 1.0], 2, 48000).unwrap();

        write_pcm16(&path, &buffer, &ConversionTarget::default()).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, -16383, 32767]);
    }

    #[test]
    fn test_write_rejects_layout_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        let buffer = SampleBuffer::new(vec![0.0, 0.5], 1, 48000).unwrap();

        let err = write_pcm16(&path, &buffer, &ConversionTarget::default()).unwrap_err();
        assert!(matches!(err, SpcError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        let buffer = SampleBuffer::new(vec![0.0, 0.0], 2, 48000).unwrap();

        let err = write_pcm16(&path, &buffer, &ConversionTarget::default()).unwrap_err();
        assert!(matches!(err, SpcError::Write { .. }));
    }
}
