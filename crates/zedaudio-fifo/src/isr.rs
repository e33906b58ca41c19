//! Interrupt service routine for the transmit FIFO.

use crate::instance::FifoInstance;
use crate::regs::{FIFO_ISR, FIFO_RESET_PULSE, FIFO_TDFR, ISR_TX_EMPTY, ISR_TX_OVERRUN};

/// Acknowledgement returned to the interrupt framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqAck {
    Handled,
}

/// Service one hardware interrupt for `instance`.
///
/// Runs in interrupt context: no blocking and no allocation. Each
/// condition is guarded by its own status bit; anything left latched
/// after the known conditions is drained by the final catch-all write
/// rather than escalated.
pub fn handle_interrupt(instance: &FifoInstance) -> IrqAck {
    let regs = instance.regs();
    let mut status = regs.read(FIFO_ISR);

    if status & ISR_TX_OVERRUN != 0 {
        // Absorb the overrun here: pulse-reset the transmit path and
        // clear the condition. The producer never observes it.
        regs.write(FIFO_TDFR, FIFO_RESET_PULSE);
        regs.write(FIFO_ISR, ISR_TX_OVERRUN);
        status &= !ISR_TX_OVERRUN;
    }

    if status & ISR_TX_EMPTY != 0 {
        regs.write(FIFO_ISR, ISR_TX_EMPTY);
        instance.wake_writers();
        status &= !ISR_TX_EMPTY;
    }

    if status != 0 {
        tracing::trace!(id = instance.id(), status, "unhandled interrupt bits");
    }

    // Drain anything still latched.
    regs.write(FIFO_ISR, u32::MAX);

    IrqAck::Handled
}
