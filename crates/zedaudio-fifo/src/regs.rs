//! Register layout and bit definitions for the AXI-FIFO transmit peripheral.

/// Interrupt status register (write-1-to-clear).
pub const FIFO_ISR: u32 = 0x0;
/// Interrupt enable register.
pub const FIFO_IER: u32 = 0x4;
/// Transmit FIFO reset; accepts [`FIFO_RESET_PULSE`].
pub const FIFO_TDFR: u32 = 0x8;
/// Transmit FIFO vacancy, in 32-bit words.
pub const FIFO_TDFV: u32 = 0xC;
/// Transmit data register (write-only FIFO push).
pub const FIFO_TDFD: u32 = 0x10;
/// Receive FIFO reset.
pub const FIFO_RDFR: u32 = 0x18;
/// Whole-stream reset.
pub const FIFO_SRR: u32 = 0x28;

/// Reset pulse value the reset registers expect (from the datasheet).
pub const FIFO_RESET_PULSE: u32 = 0xA5;

/// Transmit FIFO overrun condition.
pub const ISR_TX_OVERRUN: u32 = 1 << 28;
/// Transmit FIFO drained below its empty threshold.
pub const ISR_TX_EMPTY: u32 = 1 << 21;

/// Access to one peripheral's memory-mapped register block.
///
/// The hardware is the source of truth for occupancy and interrupt state;
/// implementations forward each call to the device with no caching. Reads
/// and writes take `&self`: register access is inherently shared between
/// the writer path and interrupt context.
pub trait FifoRegisters: Send + Sync {
    fn read(&self, offset: u32) -> u32;
    fn write(&self, offset: u32, value: u32);
}
