//! Userspace streaming front end for the zedaudio FIFO driver.
//!
//! The [`player`] module drives playback end-to-end: WAV header parse,
//! format validation, transcode, and word-by-word transmission into any
//! [`std::io::Write`] sink (the FIFO character device in production, the
//! in-process writer path or a memory buffer in tests). The [`codec`]
//! module holds the external transmit-enable boundary.

#![forbid(unsafe_code)]

pub mod codec;
pub mod player;
