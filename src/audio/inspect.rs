//! Format inspection and full-stream decoding

use std::fs::File;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer as DecodedBuffer;
use symphonia::core::codecs::{
    CodecParameters, CodecType, DecoderOptions, CODEC_TYPE_FLAC, CODEC_TYPE_MP1, CODEC_TYPE_MP2, CODEC_TYPE_MP3, CODEC_TYPE_NULL,
    CODEC_TYPE_PCM_ALAW, CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE, CODEC_TYPE_PCM_F64BE,
    CODEC_TYPE_PCM_F64LE, CODEC_TYPE_PCM_MULAW, CODEC_TYPE_PCM_S16BE, CODEC_TYPE_PCM_S16LE,
    CODEC_TYPE_PCM_S24BE, CODEC_TYPE_PCM_S24LE, CODEC_TYPE_PCM_S32BE, CODEC_TYPE_PCM_S32LE,
    CODEC_TYPE_PCM_S8, CODEC_TYPE_PCM_U8, CODEC_TYPE_VORBIS,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::{AudioStreamDescriptor, ContainerKind, SampleBuffer, SampleSubformat};
use crate::error::{SpcError, Result};

/// Upper bound on the frames reserved before decoding. The declared frame
/// count comes from the file header and is not trusted beyond this.
const MAX_RESERVED_FRAMES: u64 = 1 << 22;

/// Reads container metadata without decoding sample data.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatInspector;

impl FormatInspector {
    pub fn new() -> Self {
        Self
    }

    /// Open `path` and read its stream descriptor.
    ///
    /// The returned source keeps the file open until it is dropped.
    pub fn inspect<P: AsRef<Path>>(&self, path: P) -> Result<InspectedSource> {
        let path = path.as_ref();

        let file = File::open(path)
            .map_err(|e| SpcError::open(path, format!("cannot open file: {}", e)))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| SpcError::open(path, format!("unrecognized container: {}", e)))?;
        let reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| SpcError::open(path, "no audio track"))?;
        let params = track.codec_params.clone();
        let track_id = track.id;

        let descriptor = describe(path, &params)?;
        log::debug!("Inspected {}: {}", path.display(), descriptor);

        Ok(InspectedSource {
            path: path.to_path_buf(),
            descriptor,
            reader,
            params,
            track_id,
        })
    }
}

fn describe(path: &Path, params: &CodecParameters) -> Result<AudioStreamDescriptor> {
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| SpcError::open(path, "stream does not declare a sample rate"))?;
    let channels = params
        .channels
        .map(|c| c.count() as u16)
        .filter(|&c| c > 0)
        .ok_or_else(|| SpcError::open(path, "stream does not declare its channels"))?;

    Ok(AudioStreamDescriptor {
        sample_rate,
        channels,
        frame_count: params.n_frames.unwrap_or(0),
        subformat: subformat_of(params.codec, params.bits_per_sample),
        container: container_of(params.codec),
    })
}

fn subformat_of(codec: CodecType, bits_per_sample: Option<u32>) -> SampleSubformat {
    match codec {
        CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S16BE => SampleSubformat::Pcm16,
        CODEC_TYPE_PCM_S24LE | CODEC_TYPE_PCM_S24BE => SampleSubformat::Pcm24,
        CODEC_TYPE_PCM_S32LE | CODEC_TYPE_PCM_S32BE => SampleSubformat::Pcm32,
        CODEC_TYPE_PCM_F32LE | CODEC_TYPE_PCM_F32BE => SampleSubformat::Float32,
        CODEC_TYPE_PCM_F64LE | CODEC_TYPE_PCM_F64BE => SampleSubformat::Float64,
        // FLAC is integer PCM at its declared width
        CODEC_TYPE_FLAC => match bits_per_sample {
            Some(16) => SampleSubformat::Pcm16,
            Some(24) => SampleSubformat::Pcm24,
            Some(32) => SampleSubformat::Pcm32,
            _ => SampleSubformat::Other,
        },
        _ => SampleSubformat::Other,
    }
}

fn container_of(codec: CodecType) -> ContainerKind {
    match codec {
        CODEC_TYPE_FLAC => ContainerKind::Flac,
        CODEC_TYPE_VORBIS => ContainerKind::Ogg,
        CODEC_TYPE_MP1 | CODEC_TYPE_MP2 | CODEC_TYPE_MP3 => ContainerKind::Mp3,
        CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S16BE | CODEC_TYPE_PCM_S24LE
        | CODEC_TYPE_PCM_S24BE | CODEC_TYPE_PCM_S32LE | CODEC_TYPE_PCM_S32BE
        | CODEC_TYPE_PCM_F32LE | CODEC_TYPE_PCM_F32BE | CODEC_TYPE_PCM_F64LE
        | CODEC_TYPE_PCM_F64BE | CODEC_TYPE_PCM_U8 | CODEC_TYPE_PCM_S8 | CODEC_TYPE_PCM_ALAW
        | CODEC_TYPE_PCM_MULAW => ContainerKind::Wav,
        _ => ContainerKind::Other,
    }
}

/// An opened, inspected source. Dropping it closes the file.
pub struct InspectedSource {
    path: PathBuf,
    descriptor: AudioStreamDescriptor,
    reader: Box<dyn FormatReader>,
    params: CodecParameters,
    track_id: u32,
}

impl std::fmt::Debug for InspectedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectedSource")
            .field("path", &self.path)
            .field("descriptor", &self.descriptor)
            .field("track_id", &self.track_id)
            .finish()
    }
}

impl InspectedSource {
    pub fn descriptor(&self) -> &AudioStreamDescriptor {
        &self.descriptor
    }

    /// Decode the whole stream into an interleaved buffer at the source rate
    /// and channel count.
    ///
    /// Lossless sources that end before their declared frame count are
    /// reported as truncated.
    pub fn decode_all(mut self) -> Result<SampleBuffer> {
        let descriptor = self.descriptor;
        let path = self.path.clone();

        let mut decoder = symphonia::default::get_codecs()
            .make(&self.params, &DecoderOptions::default())
            .map_err(|e| SpcError::decode(&path, format!("no decoder for stream: {}", e)))?;

        let mut buffer = SampleBuffer::with_capacity(
            descriptor.frame_count.min(MAX_RESERVED_FRAMES) as usize,
            descriptor.channels,
            descriptor.sample_rate,
        );

        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err)) if err.kind() == IoErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(SpcError::decode(&path, e.to_string())),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) if !descriptor.subformat.is_lossless() => {
                    log::warn!("Skipping corrupt packet in {}: {}", path.display(), msg);
                    continue;
                }
                Err(SymphoniaError::IoError(err)) if err.kind() == IoErrorKind::UnexpectedEof => break,
                Err(e) => return Err(SpcError::decode(&path, e.to_string())),
            };

            let spec = *decoded.spec();
            if spec.channels.count() != descriptor.channels as usize {
                return Err(SpcError::decode(
                    &path,
                    format!(
                        "channel layout changed mid-stream: {} -> {}",
                        descriptor.channels,
                        spec.channels.count()
                    ),
                ));
            }

            let mut scratch = DecodedBuffer::<f32>::new(decoded.capacity() as u64, spec);
            scratch.copy_interleaved_ref(decoded);
            buffer.extend_interleaved(scratch.samples());
        }

        let decoded_frames = buffer.frames() as u64;
        if descriptor.subformat.is_lossless() && decoded_frames < descriptor.frame_count {
            return Err(SpcError::decode(
                &path,
                format!(
                    "truncated stream: decoded {} of {} frames",
                    decoded_frames, descriptor.frame_count
                ),
            ));
        }

        log::debug!("Decoded {} frames from {}", decoded_frames, path.display());
        Ok(buffer)
    }
}
