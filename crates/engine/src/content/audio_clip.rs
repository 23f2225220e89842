use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as DecodeError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::images::{open_error, AssetError};

/// Interleaved samples normalized to `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioClip {
    /// Decodes a whole track (WAV, MP3, OGG Vorbis or FLAC) into memory.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let file = File::open(path).map_err(|source| open_error(path, source))?;
        let unsupported = |reason: String| AssetError::UnsupportedAudio {
            path: path.to_path_buf(),
            reason,
        };

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|extension| extension.to_str()) {
            hint.with_extension(extension);
        }
        let stream = MediaSourceStream::new(Box::new(file), Default::default());
        let detected = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|error| unsupported(error.to_string()))?;
        let mut format = detected.format;

        let (track_id, params) = format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .map(|track| (track.id, track.codec_params.clone()))
            .ok_or_else(|| unsupported("no decodable audio track".to_string()))?;
        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|error| unsupported(error.to_string()))?;

        let mut sample_rate = params.sample_rate.unwrap_or(0);
        let mut channels = params
            .channels
            .map(|channels| channels.count() as u16)
            .unwrap_or(0);
        let mut samples = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(DecodeError::IoError(error)) if error.kind() == io::ErrorKind::UnexpectedEof => {
                    break
                }
                Err(DecodeError::ResetRequired) => break,
                Err(error) => return Err(unsupported(error.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // A corrupt packet is skipped, the rest of the track still plays.
                Err(DecodeError::DecodeError(_)) => continue,
                Err(error) => return Err(unsupported(error.to_string())),
            };
            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channels = spec.channels.count() as u16;
            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buffer.samples());
        }

        if channels == 0 || sample_rate == 0 {
            return Err(unsupported(
                "track declares no channels or zero sample rate".to_string(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }

    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }
}
