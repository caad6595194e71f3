//! Local file audio source using Symphonia decoder with streaming
//!
//! Files are probed once on open (metadata and codec setup only) and then
//! decoded packet by packet as the output stream asks for samples.
//!
//! Every format Symphonia decodes is normalised to interleaved stereo f32:
//! - mono is duplicated to both channels
//! - multi-channel audio keeps its first two channels
//!
//! When the file's sample rate differs from the device rate, audio goes
//! through a rubato sinc resampler on the way into the ring buffer.

use std::collections::VecDeque;
use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::{debug, warn};

use crate::error::{AudioError, Result};

/// Output channels of every decoded source
pub const STEREO: usize = 2;

/// Frames per resampler chunk
const RESAMPLE_CHUNK_FRAMES: usize = 1024;

/// Opened container plus the audio track to decode
struct OpenedFile {
    format_reader: Box<dyn FormatReader>,
    track_id: u32,
    sample_rate: u32,
    n_frames: Option<u64>,
    time_base: Option<TimeBase>,
}

fn open_file(path: &Path) -> Result<OpenedFile> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint format detection with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let track_id = track.id;
    let n_frames = track.codec_params.n_frames;
    let time_base = track.codec_params.time_base;

    Ok(OpenedFile {
        format_reader,
        track_id,
        sample_rate,
        n_frames,
        time_base,
    })
}

/// Duration from container metadata, if the container declares it
fn declared_duration(opened: &OpenedFile) -> Option<f64> {
    let frames = opened.n_frames?;

    Some(match opened.time_base {
        Some(time_base) => {
            let time = time_base.calc_time(frames);
            time.seconds as f64 + time.frac
        }
        None => frames as f64 / f64::from(opened.sample_rate),
    })
}

/// Duration by walking every packet (for containers without a frame count)
fn scanned_duration(opened: &mut OpenedFile) -> f64 {
    let mut ticks: u64 = 0;

    loop {
        match opened.format_reader.next_packet() {
            Ok(packet) if packet.track_id() == opened.track_id => ticks += packet.dur(),
            Ok(_) => {}
            Err(_) => break,
        }
    }

    match opened.time_base {
        Some(time_base) => {
            let time = time_base.calc_time(ticks);
            time.seconds as f64 + time.frac
        }
        None => ticks as f64 / f64::from(opened.sample_rate),
    }
}

/// Read the duration of an audio file in seconds without decoding it
///
/// Uses the container's frame count when present and falls back to summing
/// packet durations.
pub fn probe_duration(path: impl AsRef<Path>) -> Result<f64> {
    let path = path.as_ref();
    let mut opened = open_file(path)?;

    let duration = match declared_duration(&opened) {
        Some(duration) => duration,
        None => scanned_duration(&mut opened),
    };

    debug!(path = %path.display(), duration, "Probed duration");
    Ok(duration)
}

/// Sample rate converter for a stereo stream of unknown length
///
/// Wraps rubato's fixed-input sinc resampler with a frame accumulator. The
/// filter delay is dropped from the start and the tail is flushed with
/// silence, so output length is `input frames * ratio`.
struct StreamResampler {
    inner: SincFixedIn<f32>,
    ratio: f64,

    // Planar frames waiting for a full chunk
    pending: [Vec<f32>; STEREO],

    // Reused chunk buffers
    chunk_in: Vec<Vec<f32>>,
    chunk_out: Vec<Vec<f32>>,

    // Leading output frames still to drop
    delay: usize,

    frames_in: u64,
    frames_out: u64,
}

impl StreamResampler {
    fn new(source_rate: u32, target_rate: u32) -> Result<Self> {
        let ratio = f64::from(target_rate) / f64::from(source_rate);
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let inner = SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_CHUNK_FRAMES, STEREO)?;
        let chunk_in = inner.input_buffer_allocate(false);
        let chunk_out = inner.output_buffer_allocate(true);
        let delay = inner.output_delay();

        Ok(Self {
            inner,
            ratio,
            pending: [Vec::new(), Vec::new()],
            chunk_in,
            chunk_out,
            delay,
            frames_in: 0,
            frames_out: 0,
        })
    }

    /// Forget all buffered audio and filter state
    fn reset(&mut self) {
        self.inner.reset();
        for channel in &mut self.pending {
            channel.clear();
        }
        self.delay = self.inner.output_delay();
        self.frames_in = 0;
        self.frames_out = 0;
    }

    /// Queue interleaved stereo input, converting every full chunk
    fn push(&mut self, stereo: &[f32], output: &mut VecDeque<f32>) -> Result<()> {
        for frame in stereo.chunks_exact(STEREO) {
            self.pending[0].push(frame[0]);
            self.pending[1].push(frame[1]);
        }
        self.frames_in += (stereo.len() / STEREO) as u64;

        while self.pending[0].len() >= self.inner.input_frames_next() {
            self.process_chunk(output, u64::MAX)?;
        }
        Ok(())
    }

    /// End of input: pad with silence until every input frame is represented
    fn flush(&mut self, output: &mut VecDeque<f32>) -> Result<()> {
        let expected = (self.frames_in as f64 * self.ratio).round() as u64;

        while self.frames_out < expected {
            let needed = self.inner.input_frames_next();
            for channel in &mut self.pending {
                if channel.len() < needed {
                    channel.resize(needed, 0.0);
                }
            }

            if self.process_chunk(output, expected)? == 0 && self.delay == 0 {
                break;
            }
        }

        for channel in &mut self.pending {
            channel.clear();
        }
        Ok(())
    }

    /// Convert one chunk; returns the number of frames appended to `output`
    fn process_chunk(&mut self, output: &mut VecDeque<f32>, limit: u64) -> Result<usize> {
        let needed = self.inner.input_frames_next();
        for (chunk, pending) in self.chunk_in.iter_mut().zip(self.pending.iter_mut()) {
            chunk.clear();
            chunk.extend(pending.drain(..needed));
        }

        let (_, produced) =
            self.inner
                .process_into_buffer(&self.chunk_in, &mut self.chunk_out, None)?;

        let skipped = self.delay.min(produced);
        self.delay -= skipped;

        let room = usize::try_from(limit.saturating_sub(self.frames_out)).unwrap_or(usize::MAX);
        let taken = (produced - skipped).min(room);
        push_planar(output, &self.chunk_out, skipped, taken);
        self.frames_out += taken as u64;

        Ok(taken)
    }
}

/// Decode buffer reused across packets
struct DecodeScratch {
    samples: SampleBuffer<f32>,
    frames: usize,
    channels: usize,
}

/// Streaming local audio source
///
/// Produces interleaved stereo f32 samples at the target sample rate.
pub struct LocalSource {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    duration: f64,

    // Resampler (if the file rate differs from the target rate)
    resampler: Option<StreamResampler>,

    // Reused per-packet buffers
    scratch: Option<DecodeScratch>,
    stereo: Vec<f32>,

    // Interleaved stereo samples ready for output
    buffer: VecDeque<f32>,

    is_eof: bool,
}

impl LocalSource {
    /// Open a file for streaming playback
    ///
    /// Only metadata is read here; packets are decoded on demand.
    pub fn open(path: impl AsRef<Path>, target_sample_rate: u32) -> Result<Self> {
        let path = path.as_ref();
        let opened = open_file(path)?;

        let duration = match declared_duration(&opened) {
            Some(duration) => duration,
            None => {
                // Walk a second reader so this one stays at the start
                let mut scan = open_file(path)?;
                scanned_duration(&mut scan)
            }
        };

        let track = opened
            .format_reader
            .tracks()
            .iter()
            .find(|t| t.id == opened.track_id)
            .ok_or(AudioError::NoAudioTrack)?;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

        let source_rate = opened.sample_rate;
        let resampler = if source_rate == target_sample_rate {
            None
        } else {
            Some(StreamResampler::new(source_rate, target_sample_rate)?)
        };

        debug!(
            path = %path.display(),
            source_rate,
            target_rate = target_sample_rate,
            duration,
            "Opened local source"
        );

        Ok(Self {
            format_reader: opened.format_reader,
            decoder,
            track_id: opened.track_id,
            duration,
            resampler,
            scratch: None,
            stereo: Vec::new(),
            buffer: VecDeque::new(),
            is_eof: false,
        })
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether every sample has been read
    pub fn is_finished(&self) -> bool {
        self.is_eof && self.buffer.is_empty()
    }

    /// Fill `output` with interleaved stereo samples
    ///
    /// Returns the number of samples written; fewer than `output.len()` only
    /// at the end of the file.
    pub fn read(&mut self, output: &mut [f32]) -> Result<usize> {
        while self.buffer.len() < output.len() && !self.is_eof {
            self.decode_next_packet()?;
        }

        let count = output.len().min(self.buffer.len());
        for (dst, src) in output.iter_mut().zip(self.buffer.drain(..count)) {
            *dst = src;
        }

        Ok(count)
    }

    /// Seek back to the first sample
    pub fn rewind(&mut self) -> Result<()> {
        self.format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts: 0,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| AudioError::Decode(e.to_string()))?;

        self.decoder.reset();
        if let Some(resampler) = self.resampler.as_mut() {
            resampler.reset();
        }
        self.buffer.clear();
        self.is_eof = false;

        Ok(())
    }

    /// Decode the next packet into the buffer
    fn decode_next_packet(&mut self) -> Result<()> {
        let packet = match self.format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return self.finish();
            }
            Err(SymphoniaError::ResetRequired) => {
                // Chained streams are not followed
                return self.finish();
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != self.track_id {
            return Ok(());
        }

        let decoded = match self.decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupt frame: skip it and keep going
                warn!(error = %e, "Skipping undecodable packet");
                return Ok(());
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let capacity = decoded.capacity();
        if decoded.frames() == 0 || channels == 0 {
            return Ok(());
        }

        // Grow only when a packet outsizes the buffer
        let fits = self
            .scratch
            .as_ref()
            .is_some_and(|s| s.frames >= capacity && s.channels == channels);
        if !fits {
            self.scratch = Some(DecodeScratch {
                samples: SampleBuffer::new(capacity as u64, spec),
                frames: capacity,
                channels,
            });
        }
        let Some(scratch) = self.scratch.as_mut() else {
            return Ok(());
        };

        scratch.samples.copy_interleaved_ref(decoded);
        to_stereo(scratch.samples.samples(), channels, &mut self.stereo);

        let stereo = std::mem::take(&mut self.stereo);
        let pushed = self.push_stereo(&stereo);
        self.stereo = stereo;
        pushed
    }

    fn push_stereo(&mut self, stereo: &[f32]) -> Result<()> {
        match self.resampler.as_mut() {
            Some(resampler) => resampler.push(stereo, &mut self.buffer),
            None => {
                self.buffer.extend(stereo.iter().copied());
                Ok(())
            }
        }
    }

    /// End of file: flush the resampler tail
    fn finish(&mut self) -> Result<()> {
        self.is_eof = true;

        match self.resampler.as_mut() {
            Some(resampler) => resampler.flush(&mut self.buffer),
            None => Ok(()),
        }
    }
}

/// Append `count` planar stereo frames, starting at `offset`, to an
/// interleaved buffer
fn push_planar(buffer: &mut VecDeque<f32>, planar: &[Vec<f32>], offset: usize, count: usize) {
    for frame in offset..offset + count {
        for channel in planar.iter().take(STEREO) {
            buffer.push_back(channel[frame]);
        }
    }
}

/// Interleaved `channels`-wide samples to interleaved stereo in `output`
fn to_stereo(samples: &[f32], channels: usize, output: &mut Vec<f32>) {
    output.clear();
    output.reserve(samples.len() / channels * STEREO);

    for frame in samples.chunks_exact(channels) {
        let left = frame[0];
        let right = if channels > 1 { frame[1] } else { frame[0] };
        output.push(left);
        output.push(right);
    }
}
