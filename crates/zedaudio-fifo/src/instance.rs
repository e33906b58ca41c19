//! Hardware instances and the owning driver registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::DriverError;
use crate::flow::{CancelToken, WaitQueue};
use crate::regs::{
    FifoRegisters, FIFO_IER, FIFO_RDFR, FIFO_RESET_PULSE, FIFO_SRR, FIFO_TDFR, FIFO_TDFV,
    ISR_TX_EMPTY, ISR_TX_OVERRUN,
};

/// Stable identifier of one FIFO peripheral; the device minor number in
/// the original platform binding.
pub type InstanceId = u32;

/// Resources bound to a peripheral at hardware-discovery time.
pub struct InstanceConfig {
    /// The mapped register block.
    pub regs: Arc<dyn FifoRegisters>,
    /// Configured depth of the transmit FIFO, in words.
    pub tx_fifo_depth: u32,
    /// Interrupt line the peripheral is wired to.
    pub irq_line: u32,
}

/// One physical transmit-FIFO peripheral.
///
/// The wait queue lives exactly as long as the instance; producers
/// blocked on it are woken by [`crate::handle_interrupt`] and by session
/// cancellation.
pub struct FifoInstance {
    id: InstanceId,
    regs: Arc<dyn FifoRegisters>,
    tx_fifo_depth: u32,
    irq_line: u32,
    waitq: Arc<WaitQueue>,
}

impl FifoInstance {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn tx_fifo_depth(&self) -> u32 {
        self.tx_fifo_depth
    }

    pub fn irq_line(&self) -> u32 {
        self.irq_line
    }

    pub(crate) fn regs(&self) -> &dyn FifoRegisters {
        self.regs.as_ref()
    }

    /// Hardware-reported vacancy of the transmit FIFO, in words.
    pub fn tx_vacancy(&self) -> u32 {
        self.regs.read(FIFO_TDFV)
    }

    /// Block until the FIFO has room for more than `burst_words` words.
    ///
    /// Suspends on the instance's wait queue (no busy-polling) and
    /// re-reads the vacancy register after every wake-up; readiness is
    /// only ever hardware-reported. Returns
    /// [`DriverError::Interrupted`] if `cancel` fires first, leaving the
    /// queue usable by other waiters.
    pub fn wait_until_ready(&self, burst_words: u32, cancel: &CancelToken) -> Result<(), DriverError> {
        let ready = self.waitq.wait_until(
            || self.tx_vacancy() > burst_words,
            || cancel.is_cancelled(),
        );
        if ready {
            Ok(())
        } else {
            Err(DriverError::Interrupted)
        }
    }

    /// A fresh cancellation token tied to this instance's wait queue.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken::new(self.waitq.clone())
    }

    /// Broadcast-wake every producer blocked on this instance.
    pub(crate) fn wake_writers(&self) {
        self.waitq.wake_all();
    }
}

/// Owning table of every registered instance, keyed by stable id.
///
/// The writer path resolves instances through a driver handle it was
/// given; there is no ambient global list.
#[derive(Default)]
pub struct AudioDriver {
    instances: BTreeMap<InstanceId, Arc<FifoInstance>>,
}

impl AudioDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a discovered peripheral.
    ///
    /// Pulses the stream, transmit and receive resets, then enables the
    /// overrun and transmit-empty interrupt sources. The instance becomes
    /// resolvable by `id` on success.
    pub fn register(
        &mut self,
        id: InstanceId,
        config: InstanceConfig,
    ) -> Result<Arc<FifoInstance>, DriverError> {
        if self.instances.contains_key(&id) {
            return Err(DriverError::HardwareResource("instance id already bound"));
        }
        if config.tx_fifo_depth == 0 {
            return Err(DriverError::HardwareResource("transmit FIFO depth is zero"));
        }

        let instance = Arc::new(FifoInstance {
            id,
            regs: config.regs,
            tx_fifo_depth: config.tx_fifo_depth,
            irq_line: config.irq_line,
            waitq: Arc::new(WaitQueue::default()),
        });

        instance.regs.write(FIFO_SRR, FIFO_RESET_PULSE);
        instance.regs.write(FIFO_TDFR, FIFO_RESET_PULSE);
        instance.regs.write(FIFO_RDFR, FIFO_RESET_PULSE);
        instance.regs.write(FIFO_IER, ISR_TX_OVERRUN | ISR_TX_EMPTY);

        tracing::info!(id, depth = instance.tx_fifo_depth, irq = instance.irq_line, "audio instance registered");

        self.instances.insert(id, instance.clone());
        Ok(instance)
    }

    /// Tear down a registered instance. Waiters blocked on it are woken
    /// so they can observe cancellation.
    pub fn remove(&mut self, id: InstanceId) -> Result<(), DriverError> {
        match self.instances.remove(&id) {
            Some(instance) => {
                instance.wake_writers();
                Ok(())
            }
            None => Err(DriverError::NoSuchInstance { id }),
        }
    }

    /// Device-open resolution: start a writer session against the
    /// instance `id` names.
    pub fn open(&self, id: InstanceId) -> Result<crate::writer::FifoWriter, DriverError> {
        let instance = self
            .instances
            .get(&id)
            .cloned()
            .ok_or(DriverError::NoSuchInstance { id })?;
        Ok(crate::writer::FifoWriter::new(instance))
    }

    /// Look up an instance without opening a session (interrupt wiring).
    pub fn instance(&self, id: InstanceId) -> Option<Arc<FifoInstance>> {
        self.instances.get(&id).cloned()
    }
}
