//! Blocking writer path from caller buffers into the transmit register.

use std::io;
use std::sync::Arc;

use crate::error::DriverError;
use crate::flow::CancelToken;
use crate::instance::{FifoInstance, InstanceId};
use crate::regs::FIFO_TDFD;

/// Words pushed per wait/write cycle: the vacancy the writer waits for
/// before each chunk, independent of the caller's buffer size.
pub const WRITE_BURST_WORDS: usize = 64;

const WRITE_BURST_BYTES: usize = WRITE_BURST_WORDS * 4;

/// One open writer session against a resolved instance.
///
/// The staging buffer belongs to the session and is reused for every
/// burst; the write loop never allocates.
pub struct FifoWriter {
    instance: Arc<FifoInstance>,
    cancel: CancelToken,
    staging: Box<[u8; WRITE_BURST_BYTES]>,
}

impl FifoWriter {
    pub(crate) fn new(instance: Arc<FifoInstance>) -> Self {
        let cancel = instance.cancel_token();
        Self {
            instance,
            cancel,
            staging: Box::new([0; WRITE_BURST_BYTES]),
        }
    }

    /// Identifier of the instance this session resolved to.
    pub fn instance_id(&self) -> InstanceId {
        self.instance.id()
    }

    /// Token that aborts this session's blocking writes (teardown path).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Push `buf` into the transmit FIFO, blocking on vacancy as needed.
    ///
    /// Bytes are staged one bounded burst at a time and pushed to the
    /// transmit-data register one 32-bit word at a time; word order
    /// within a chunk and chunk order both follow `buf`. Returns the
    /// total bytes written. A trailing partial word cannot be pushed and
    /// yields [`DriverError::ShortWrite`] after the aligned prefix has
    /// been transmitted.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, DriverError> {
        let aligned = buf.len() - buf.len() % 4;
        let mut written = 0;

        while written < aligned {
            self.instance
                .wait_until_ready(WRITE_BURST_WORDS as u32, &self.cancel)?;

            let chunk = (aligned - written).min(WRITE_BURST_BYTES);
            self.staging[..chunk].copy_from_slice(&buf[written..written + chunk]);

            let regs = self.instance.regs();
            for word in self.staging[..chunk].chunks_exact(4) {
                regs.write(FIFO_TDFD, u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
            }

            written += chunk;
        }

        if aligned != buf.len() {
            return Err(DriverError::ShortWrite {
                written,
                requested: buf.len(),
            });
        }
        Ok(written)
    }
}

impl io::Write for FifoWriter {
    /// Accepts the word-aligned prefix of `buf`; a caller handing the
    /// device unaligned tails sees a zero-length write.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let aligned = buf.len() - buf.len() % 4;
        self.write_bytes(&buf[..aligned]).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
