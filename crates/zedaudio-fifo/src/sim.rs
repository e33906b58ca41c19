//! Software model of the transmit-FIFO peripheral.
//!
//! Implements [`FifoRegisters`] over a bounded in-memory word queue with
//! the same latched interrupt status the real device exposes. Used by the
//! driver tests and for hardware-less bring-up of the streaming path; a
//! codec-side consumer calls [`SimFifo::drain_all`] and then delivers the
//! interrupt, standing in for the physical drain and the interrupt line.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::regs::{
    FifoRegisters, FIFO_IER, FIFO_ISR, FIFO_RESET_PULSE, FIFO_TDFD, FIFO_TDFR, FIFO_TDFV,
    ISR_TX_EMPTY, ISR_TX_OVERRUN,
};

pub struct SimFifo {
    state: Mutex<SimState>,
}

#[derive(Default)]
struct SimState {
    depth: u32,
    queue: VecDeque<u32>,
    drained: Vec<u32>,
    isr: u32,
    ier: u32,
    tx_resets: u32,
}

impl SimFifo {
    pub fn new(depth: u32) -> Self {
        Self {
            state: Mutex::new(SimState {
                depth,
                ..SimState::default()
            }),
        }
    }

    /// Codec side: consume everything queued and latch transmit-empty.
    /// Returns whether anything was consumed.
    pub fn drain_all(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.queue.is_empty() {
            return false;
        }
        while let Some(word) = state.queue.pop_front() {
            state.drained.push(word);
        }
        state.isr |= ISR_TX_EMPTY;
        true
    }

    /// Latch arbitrary status bits, as a misbehaving device would.
    pub fn latch(&self, bits: u32) {
        self.state.lock().unwrap().isr |= bits;
    }

    pub fn isr_value(&self) -> u32 {
        self.state.lock().unwrap().isr
    }

    /// Words currently sitting in the FIFO.
    pub fn queued(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Every word the simulated codec has consumed, in arrival order.
    pub fn drained(&self) -> Vec<u32> {
        self.state.lock().unwrap().drained.clone()
    }

    /// How many transmit-reset pulses the device has seen.
    pub fn tx_resets(&self) -> u32 {
        self.state.lock().unwrap().tx_resets
    }
}

impl FifoRegisters for SimFifo {
    fn read(&self, offset: u32) -> u32 {
        let state = self.state.lock().unwrap();
        match offset {
            FIFO_ISR => state.isr,
            FIFO_IER => state.ier,
            FIFO_TDFV => state.depth - state.queue.len() as u32,
            _ => 0,
        }
    }

    fn write(&self, offset: u32, value: u32) {
        let mut state = self.state.lock().unwrap();
        match offset {
            // A push to a full FIFO is dropped and latches the overrun.
            FIFO_TDFD => {
                if (state.queue.len() as u32) < state.depth {
                    state.queue.push_back(value);
                } else {
                    state.isr |= ISR_TX_OVERRUN;
                }
            }
            // Write-1-to-clear.
            FIFO_ISR => state.isr &= !value,
            FIFO_IER => state.ier = value,
            FIFO_TDFR if value == FIFO_RESET_PULSE => {
                state.queue.clear();
                state.tx_resets += 1;
            }
            _ => {}
        }
    }
}
