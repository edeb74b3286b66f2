//! Sample rate conversion

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use crate::audio::SampleBuffer;
use crate::error::{SpcError, Result};

/// Resample service used by the conversion engine.
///
/// Implementations take ownership of the buffer so they may work in place,
/// and must return the buffer untouched when the rates already agree.
pub trait Resample: Send + Sync {
    fn resample(&self, buffer: SampleBuffer, target_rate: u32) -> Result<SampleBuffer>;

    fn name(&self) -> &'static str;
}

/// Which resampler backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResamplerKind {
    #[default]
    Sinc,
    Linear,
}

impl ResamplerKind {
    pub fn build(self) -> Box<dyn Resample> {
        match self {
            ResamplerKind::Sinc => Box::new(SincResampler::default()),
            ResamplerKind::Linear => Box::new(LinearResampler),
        }
    }
}

/// Frame count after converting `frames` from `source_rate` to `target_rate`.
pub fn resampled_len(frames: usize, source_rate: u32, target_rate: u32) -> usize {
    ((frames as u128 * target_rate as u128 + source_rate as u128 - 1) / source_rate as u128) as usize
}

/// Linear interpolation, cheap and deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearResampler;

impl LinearResampler {
    fn resample_channel(data: &[f32], new_length: usize, ratio: f64) -> Vec<f32> {
        let old_length = data.len();
        let mut new_data = Vec::with_capacity(new_length);

        for i in 0..new_length {
            let old_pos = i as f64 / ratio;
            let old_index = old_pos.floor() as usize;
            let fraction = old_pos - old_index as f64;

            new_data.push(if old_index >= old_length - 1 {
                data[old_length - 1]
            } else {
                data[old_index] + (data[old_index + 1] - data[old_index]) * fraction as f32
            });
        }

        new_data
    }
}

impl Resample for LinearResampler {
    fn resample(&self, buffer: SampleBuffer, target_rate: u32) -> Result<SampleBuffer> {
        if target_rate == 0 {
            return Err(SpcError::resample("Target sample rate cannot be 0"));
        }
        if buffer.sample_rate() == target_rate {
            return Ok(buffer);
        }
        if buffer.is_empty() {
            return Ok(SampleBuffer::with_capacity(0, buffer.channels(), target_rate));
        }

        let ratio = target_rate as f64 / buffer.sample_rate() as f64;
        let new_length = resampled_len(buffer.frames(), buffer.sample_rate(), target_rate);

        let planar: Vec<Vec<f32>> = buffer
            .to_planar()
            .iter()
            .map(|channel| Self::resample_channel(channel, new_length, ratio))
            .collect();

        SampleBuffer::from_planar(&planar, target_rate)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Band-limited sinc interpolation backed by rubato.
#[derive(Debug, Clone, Copy)]
pub struct SincResampler {
    pub chunk_size: usize,
    pub sinc_len: usize,
}

impl Default for SincResampler {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            sinc_len: 256,
        }
    }
}

impl SincResampler {
    fn parameters(&self) -> SincInterpolationParameters {
        SincInterpolationParameters {
            sinc_len: self.sinc_len,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        }
    }
}

impl Resample for SincResampler {
    fn resample(&self, buffer: SampleBuffer, target_rate: u32) -> Result<SampleBuffer> {
        if target_rate == 0 {
            return Err(SpcError::resample("Target sample rate cannot be 0"));
        }
        if buffer.sample_rate() == target_rate {
            return Ok(buffer);
        }
        if buffer.is_empty() {
            return Ok(SampleBuffer::with_capacity(0, buffer.channels(), target_rate));
        }

        let channels = buffer.channels() as usize;
        let source_frames = buffer.frames();
        let expected = resampled_len(source_frames, buffer.sample_rate(), target_rate);
        let ratio = target_rate as f64 / buffer.sample_rate() as f64;

        let mut resampler = SincFixedIn::<f32>::new(
            ratio,
            1.0,
            self.parameters(),
            self.chunk_size,
            channels,
        )
        .map_err(|e| SpcError::resample(format!("Cannot create resampler: {}", e)))?;

        let input = buffer.to_planar();
        drop(buffer);

        // The output carries `delay` frames of filter latency up front; the
        // planar buffers hold the larger of input and output lengths.
        let delay = resampler.output_delay();
        let capacity = expected.max(source_frames) + delay;
        let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(capacity); channels];

        let mut pos = 0;
        while source_frames - pos >= resampler.input_frames_next() {
            let end = pos + resampler.input_frames_next();
            let chunk: Vec<&[f32]> = input.iter().map(|ch| &ch[pos..end]).collect();
            let out = resampler
                .process(&chunk, None)
                .map_err(|e| SpcError::resample(e.to_string()))?;
            append_planar(&mut output, out);
            pos = end;
        }

        if pos < source_frames {
            let tail: Vec<&[f32]> = input.iter().map(|ch| &ch[pos..]).collect();
            let out = resampler
                .process_partial(Some(tail.as_slice()), None)
                .map_err(|e| SpcError::resample(e.to_string()))?;
            append_planar(&mut output, out);
        }

        // Flush the filter until the delayed tail has been produced.
        while output[0].len() < expected + delay {
            let out = resampler
                .process_partial::<&[f32]>(None, None)
                .map_err(|e| SpcError::resample(e.to_string()))?;
            if out[0].is_empty() {
                break;
            }
            append_planar(&mut output, out);
        }

        for channel in output.iter_mut() {
            let start = delay.min(channel.len());
            channel.drain(..start);
            channel.resize(expected, 0.0);
        }

        SampleBuffer::from_planar(&output, target_rate)
    }

    fn name(&self) -> &'static str {
        "sinc"
    }
}

fn append_planar(output: &mut [Vec<f32>], chunk: Vec<Vec<f32>>) {
    for (dst, src) in output.iter_mut().zip(chunk) {
        dst.extend_from_slice(&src);
    }
}
