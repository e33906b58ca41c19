//! Sequential frame reader over a WAV sample stream.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::WaveError;
use crate::header::{WaveHeader, WAVE_HEADER_LEN};
use crate::transcode::transmit_word;

/// One frame's transmit words: one for mono, two for stereo (left first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    words: [u32; 2],
    channels: usize,
}

impl Frame {
    pub fn words(&self) -> &[u32] {
        &self.words[..self.channels]
    }
}

/// Yields up to `sample_count` transmit-ready frames from a seekable WAV
/// stream, reading `ceil(bits_per_sample / 8)` bytes per channel.
///
/// The reader owns the stream cursor: construction seeks to the computed
/// start offset unconditionally, and nothing else may reposition the
/// stream while the reader lives. A short read mid-frame ends production
/// permanently; no partial frame is ever delivered.
pub struct FrameReader<R> {
    source: R,
    channels: usize,
    bits_per_sample: u16,
    bytes_per_sample: usize,
    remaining: u64,
}

impl<R: Read + Seek> FrameReader<R> {
    /// Position `source` at `start_sample` and prepare to yield
    /// `sample_count` frames.
    ///
    /// Channel counts other than 1 or 2 are rejected before any I/O.
    pub fn new(
        mut source: R,
        header: &WaveHeader,
        start_sample: u64,
        sample_count: u64,
    ) -> Result<Self, WaveError> {
        if header.num_channels != 1 && header.num_channels != 2 {
            return Err(WaveError::UnsupportedFormat(
                "only mono and stereo streams are playable",
            ));
        }

        let start_byte = WAVE_HEADER_LEN as u64 + start_sample * u64::from(header.block_align);
        source.seek(SeekFrom::Start(start_byte))?;

        Ok(Self {
            source,
            channels: usize::from(header.num_channels),
            bits_per_sample: header.bits_per_sample,
            bytes_per_sample: header.bytes_per_sample(),
            remaining: sample_count,
        })
    }

    /// The next frame, or `None` once the requested count is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, WaveError> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let mut words = [0u32; 2];
        let mut sample = [0u8; 4];
        for word in words.iter_mut().take(self.channels) {
            let sample = &mut sample[..self.bytes_per_sample];
            if let Err(err) = read_sample(&mut self.source, sample) {
                self.remaining = 0;
                return Err(err);
            }
            *word = transmit_word(sample, self.bits_per_sample);
        }

        self.remaining -= 1;
        Ok(Some(Frame {
            words,
            channels: self.channels,
        }))
    }

    /// Frames still owed before the reader runs dry.
    pub fn frames_remaining(&self) -> u64 {
        self.remaining
    }
}

fn read_sample<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<(), WaveError> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(WaveError::ShortRead {
                    expected: buf.len(),
                    got: filled,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
