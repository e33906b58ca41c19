use std::io;

use thiserror::Error;

/// Errors surfaced by the driver-side transmit path.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No registered hardware instance matches the requested identifier.
    #[error("no audio instance with id {id}")]
    NoSuchInstance { id: u32 },

    /// A blocking wait was cancelled before the FIFO reported room.
    #[error("wait for FIFO vacancy was interrupted")]
    Interrupted,

    /// Resource binding failed during instance registration.
    #[error("hardware resource error: {0}")]
    HardwareResource(&'static str),

    /// The transmit path accepted fewer bytes than requested.
    #[error("short write: accepted {written} of {requested} bytes")]
    ShortWrite { written: usize, requested: usize },
}

impl From<DriverError> for io::Error {
    fn from(err: DriverError) -> Self {
        let kind = match &err {
            DriverError::NoSuchInstance { .. } => io::ErrorKind::NotFound,
            DriverError::Interrupted => io::ErrorKind::Interrupted,
            DriverError::HardwareResource(_) => io::ErrorKind::Other,
            DriverError::ShortWrite { .. } => io::ErrorKind::WriteZero,
        };
        io::Error::new(kind, err)
    }
}
