//! Codec transmit-line control boundary.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// External switch for the codec's physical transmit line.
///
/// The line must be raised before the first transmit word and dropped
/// after the last, whether playback succeeds or fails.
pub trait TransmitControl {
    fn set_enabled(&mut self, enabled: bool) -> io::Result<()>;
}

/// Transmit control backed by a sysfs boolean attribute.
pub struct SysfsTransmitEnable {
    path: PathBuf,
}

impl SysfsTransmitEnable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TransmitControl for SysfsTransmitEnable {
    fn set_enabled(&mut self, enabled: bool) -> io::Result<()> {
        let mut attr = OpenOptions::new().write(true).open(&self.path)?;
        attr.write_all(if enabled { b"1" } else { b"0" })
    }
}

/// Raises the transmit line on construction and guarantees it drops
/// again on every exit path.
pub struct TransmitGuard<'a, C: TransmitControl> {
    codec: &'a mut C,
    engaged: bool,
}

impl<'a, C: TransmitControl> TransmitGuard<'a, C> {
    pub fn engage(codec: &'a mut C) -> io::Result<Self> {
        codec.set_enabled(true)?;
        Ok(Self {
            codec,
            engaged: true,
        })
    }

    /// Drop the line on the success path, surfacing any error.
    pub fn disengage(mut self) -> io::Result<()> {
        self.engaged = false;
        self.codec.set_enabled(false)
    }
}

impl<C: TransmitControl> Drop for TransmitGuard<'_, C> {
    fn drop(&mut self) {
        if self.engaged {
            if let Err(err) = self.codec.set_enabled(false) {
                tracing::warn!(%err, "failed to drop the transmit line");
            }
        }
    }
}
