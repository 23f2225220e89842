use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use tracing::warn;

use crate::content::{AssetError, AudioClip};

pub struct LoopingAudio {
    _stream: cpal::Stream,
}

impl LoopingAudio {
    pub fn start(clip: AudioClip) -> Result<Self, AssetError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AssetError::AudioOutput("no output audio device available".to_string()))?;
        let supported = device
            .default_output_config()
            .map_err(|error| AssetError::AudioOutput(error.to_string()))?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.config();
        let cursor = LoopCursor::new(Arc::new(clip), config.sample_rate.0);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, cursor)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, cursor)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, cursor)?,
            other => {
                return Err(AssetError::AudioOutput(format!(
                    "unsupported output sample format {other:?}"
                )))
            }
        };
        stream
            .play()
            .map_err(|error| AssetError::AudioOutput(error.to_string()))?;
        Ok(Self { _stream: stream })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut cursor: LoopCursor,
) -> Result<cpal::Stream, AssetError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    for (channel, sample) in frame.iter_mut().enumerate() {
                        *sample = T::from_sample(cursor.sample(channel));
                    }
                    cursor.advance();
                }
            },
            |error| warn!(error = %error, "audio_stream_error"),
            None,
        )
        .map_err(|error| AssetError::AudioOutput(error.to_string()))
}

/// Nearest-frame resampling read head that wraps at the end of the clip.
#[derive(Debug, Clone)]
struct LoopCursor {
    clip: Arc<AudioClip>,
    position: f64,
    step: f64,
}

impl LoopCursor {
    fn new(clip: Arc<AudioClip>, output_rate: u32) -> Self {
        let step = clip.sample_rate as f64 / output_rate.max(1) as f64;
        Self {
            clip,
            position: 0.0,
            step,
        }
    }

    fn sample(&self, output_channel: usize) -> f32 {
        let frame_count = self.clip.frame_count();
        if frame_count == 0 {
            return 0.0;
        }
        let source_channels = self.clip.channels as usize;
        let frame = (self.position as usize).min(frame_count - 1);
        let channel = output_channel.min(source_channels - 1);
        self.clip.samples[frame * source_channels + channel]
    }

    fn advance(&mut self) {
        let frame_count = self.clip.frame_count() as f64;
        if frame_count == 0.0 {
            return;
        }
        self.position += self.step;
        while self.position >= frame_count {
            self.position -= frame_count;
        }
    }
}
