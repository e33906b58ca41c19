//! Streaming orchestrator: header parse, validation, transmit loop.

use std::io::{Read, Seek, Write};

use thiserror::Error;
use tracing::info;
use zedaudio_wave::{FrameReader, WaveError, WaveHeader};

use crate::codec::{TransmitControl, TransmitGuard};

/// Which slice of the sample data to stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackOptions {
    /// First sample (frame index) to play.
    pub start_sample: u64,
    /// How many samples to play; `None` plays to the end of the data
    /// section.
    pub sample_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub frames: u64,
    pub words: u64,
}

#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Wave(#[from] WaveError),

    #[error("transmit path: {0}")]
    Transmit(#[from] std::io::Error),
}

/// Stream `source` into `sink` until the requested sample count is
/// exhausted or the source runs dry mid-frame.
///
/// The header is parsed and the format rejected (non-PCM, malformed,
/// unplayable channel count) before the codec or the transmit path are
/// touched. The transmit line is raised for exactly the duration of the
/// word loop and dropped on every exit path. Each transmit word leaves
/// as one 4-byte little-endian unit, in frame order.
pub fn play<R, W, C>(
    source: &mut R,
    mut sink: W,
    codec: &mut C,
    opts: PlaybackOptions,
) -> Result<PlaybackStats, PlayError>
where
    R: Read + Seek,
    W: Write,
    C: TransmitControl,
{
    let header = WaveHeader::read_from(source)?;
    info!(
        channels = header.num_channels,
        sample_rate = header.sample_rate,
        bits_per_sample = header.bits_per_sample,
        block_align = header.block_align,
        data_len = header.data_len,
        "wave stream"
    );

    let total = u64::from(header.sample_count());
    let count = opts
        .sample_count
        .unwrap_or_else(|| total.saturating_sub(opts.start_sample));

    let mut frames = FrameReader::new(source, &header, opts.start_sample, count)?;

    let guard = TransmitGuard::engage(codec)?;

    let mut stats = PlaybackStats::default();
    while let Some(frame) = frames.next_frame()? {
        for &word in frame.words() {
            sink.write_all(&word.to_le_bytes())?;
            stats.words += 1;
        }
        stats.frames += 1;
    }
    sink.flush()?;

    guard.disengage()?;
    info!(frames = stats.frames, words = stats.words, "playback finished");
    Ok(stats)
}
