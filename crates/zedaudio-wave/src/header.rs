//! The canonical 44-byte WAV header.

use std::io::{Read, Seek, SeekFrom};

use crate::error::WaveError;

/// Byte length of the fixed header this parser accepts: the RIFF chunk
/// descriptor, a 16-byte `fmt ` sub-chunk, and the `data` sub-chunk header.
pub const WAVE_HEADER_LEN: usize = 44;

// Tag fields are byte strings compared as written (big-endian on the wire);
// every numeric field is little-endian.
const TAG_RIFF: [u8; 4] = *b"RIFF";
const TAG_WAVE: [u8; 4] = *b"WAVE";
const TAG_FMT: [u8; 4] = *b"fmt ";
const TAG_DATA: [u8; 4] = *b"data";

const PCM_FMT_CHUNK_LEN: u32 = 16;
const AUDIO_FORMAT_PCM: u16 = 1;

/// Parsed WAV stream descriptor.
///
/// Created once from the first 44 bytes of the file and read-only for the
/// rest of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveHeader {
    /// Declared RIFF chunk size: file length minus the 8-byte descriptor.
    pub chunk_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    /// Output rate in Hz, passed through to the codec unmodified.
    pub sample_rate: u32,
    pub byte_rate: u32,
    /// Bytes per frame: one sample per channel.
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Byte length of the sample data section.
    pub data_len: u32,
}

impl WaveHeader {
    /// Parse the fixed 44-byte header.
    ///
    /// Missing tags are [`WaveError::MalformedHeader`]; a layout that parses
    /// but cannot be played (compressed audio, bit depth outside 1..=32) is
    /// [`WaveError::UnsupportedFormat`]. A disagreement between the declared
    /// chunk size and the data length is reported at warn level only.
    pub fn parse(raw: &[u8; WAVE_HEADER_LEN]) -> Result<Self, WaveError> {
        if raw[0..4] != TAG_RIFF {
            return Err(WaveError::MalformedHeader("missing RIFF tag"));
        }
        if raw[8..12] != TAG_WAVE {
            return Err(WaveError::MalformedHeader("missing WAVE tag"));
        }
        if raw[12..16] != TAG_FMT {
            return Err(WaveError::MalformedHeader("missing fmt tag"));
        }
        if raw[36..40] != TAG_DATA {
            return Err(WaveError::MalformedHeader("missing data tag"));
        }

        let header = Self {
            chunk_size: le_u32(raw, 4),
            audio_format: le_u16(raw, 20),
            num_channels: le_u16(raw, 22),
            sample_rate: le_u32(raw, 24),
            byte_rate: le_u32(raw, 28),
            block_align: le_u16(raw, 32),
            bits_per_sample: le_u16(raw, 34),
            data_len: le_u32(raw, 40),
        };

        if le_u32(raw, 16) != PCM_FMT_CHUNK_LEN || header.audio_format != AUDIO_FORMAT_PCM {
            return Err(WaveError::UnsupportedFormat(
                "audio format is not uncompressed PCM",
            ));
        }
        if header.bits_per_sample == 0 || header.bits_per_sample > 32 {
            return Err(WaveError::UnsupportedFormat(
                "bits per sample outside 1..=32",
            ));
        }
        if header.block_align == 0 {
            return Err(WaveError::UnsupportedFormat("zero block align"));
        }

        // WAV files in the wild frequently get this wrong; report and
        // keep going.
        if header.data_len.wrapping_add(36) != header.chunk_size {
            tracing::warn!(
                chunk_size = header.chunk_size,
                data_len = header.data_len,
                "declared chunk size disagrees with data length"
            );
        }

        Ok(header)
    }

    /// Read and parse the header from the start of `source`.
    ///
    /// Seeks to offset 0 first; the prior cursor position is irrelevant.
    pub fn read_from<R: Read + Seek>(source: &mut R) -> Result<Self, WaveError> {
        source.seek(SeekFrom::Start(0))?;
        let mut raw = [0u8; WAVE_HEADER_LEN];
        source.read_exact(&mut raw).map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                WaveError::MalformedHeader("file shorter than the 44-byte header")
            } else {
                WaveError::Io(err)
            }
        })?;
        Self::parse(&raw)
    }

    /// Serialize back to the canonical 44-byte layout.
    pub fn to_bytes(&self) -> [u8; WAVE_HEADER_LEN] {
        let mut raw = [0u8; WAVE_HEADER_LEN];
        raw[0..4].copy_from_slice(&TAG_RIFF);
        raw[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        raw[8..12].copy_from_slice(&TAG_WAVE);
        raw[12..16].copy_from_slice(&TAG_FMT);
        raw[16..20].copy_from_slice(&PCM_FMT_CHUNK_LEN.to_le_bytes());
        raw[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        raw[22..24].copy_from_slice(&self.num_channels.to_le_bytes());
        raw[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        raw[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        raw[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        raw[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        raw[36..40].copy_from_slice(&TAG_DATA);
        raw[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        raw
    }

    /// Bytes read per channel sample: `ceil(bits_per_sample / 8)`.
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample.div_ceil(8))
    }

    /// Number of whole frames the data section declares.
    pub fn sample_count(&self) -> u32 {
        self.data_len / u32::from(self.block_align)
    }
}

fn le_u16(raw: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([raw[offset], raw[offset + 1]])
}

fn le_u32(raw: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]])
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn canonical_header() -> WaveHeader {
        WaveHeader {
            chunk_size: 36 + 8,
            audio_format: 1,
            num_channels: 2,
            sample_rate: 44_100,
            byte_rate: 44_100 * 4,
            block_align: 4,
            bits_per_sample: 16,
            data_len: 8,
        }
    }

    #[test]
    fn parse_reports_stereo_cd_format() {
        let header = WaveHeader::parse(&canonical_header().to_bytes()).unwrap();
        assert_eq!(header.sample_rate, 44_100);
        assert_eq!(header.num_channels, 2);
        assert_eq!(header.block_align, 4);
        assert_eq!(header.sample_count(), 2);
    }

    #[test]
    fn non_pcm_audio_format_is_unsupported() {
        let mut hdr = canonical_header();
        hdr.audio_format = 2;
        assert!(matches!(
            WaveHeader::parse(&hdr.to_bytes()),
            Err(WaveError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_tags_are_malformed() {
        for (offset, message) in [(0usize, "RIFF"), (8, "WAVE"), (12, "fmt"), (36, "data")] {
            let mut raw = canonical_header().to_bytes();
            raw[offset] ^= 0xFF;
            match WaveHeader::parse(&raw) {
                Err(WaveError::MalformedHeader(reason)) => {
                    assert!(reason.contains(message), "{reason} vs {message}")
                }
                other => panic!("expected MalformedHeader, got {other:?}"),
            }
        }
    }

    #[test]
    fn bit_depth_above_32_is_unsupported() {
        let mut hdr = canonical_header();
        hdr.bits_per_sample = 64;
        assert!(matches!(
            WaveHeader::parse(&hdr.to_bytes()),
            Err(WaveError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn chunk_size_mismatch_is_not_fatal() {
        let mut hdr = canonical_header();
        hdr.chunk_size = 9999;
        assert!(WaveHeader::parse(&hdr.to_bytes()).is_ok());
    }

    #[test]
    fn read_from_rewinds_the_source_first() {
        let mut cursor = Cursor::new(canonical_header().to_bytes().to_vec());
        cursor.set_position(17);
        let header = WaveHeader::read_from(&mut cursor).unwrap();
        assert_eq!(header, canonical_header());
    }

    #[test]
    fn truncated_header_is_malformed() {
        let mut cursor = Cursor::new(vec![b'R', b'I', b'F', b'F', 0, 0]);
        assert!(matches!(
            WaveHeader::read_from(&mut cursor),
            Err(WaveError::MalformedHeader(_))
        ));
    }

    #[test]
    fn odd_bit_depths_round_up_to_whole_bytes() {
        let mut hdr = canonical_header();
        hdr.bits_per_sample = 12;
        assert_eq!(hdr.bytes_per_sample(), 2);
        hdr.bits_per_sample = 24;
        assert_eq!(hdr.bytes_per_sample(), 3);
    }
}
