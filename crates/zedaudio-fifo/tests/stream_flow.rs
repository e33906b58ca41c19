//! End-to-end exercise of the blocking writer path against the simulated
//! transmit FIFO, with a hardware thread standing in for the codec drain
//! and interrupt delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use zedaudio_fifo::regs::{FifoRegisters, FIFO_TDFD, ISR_TX_OVERRUN};
use zedaudio_fifo::sim::SimFifo;
use zedaudio_fifo::{
    handle_interrupt, AudioDriver, DriverError, FifoInstance, InstanceConfig, IrqAck,
    WRITE_BURST_WORDS,
};

fn register(driver: &mut AudioDriver, fifo: &Arc<SimFifo>, depth: u32) -> Arc<FifoInstance> {
    driver
        .register(
            0,
            InstanceConfig {
                regs: fifo.clone(),
                tx_fifo_depth: depth,
                irq_line: 61,
            },
        )
        .unwrap()
}

fn le_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn writer_streams_every_word_in_order() {
    let fifo = Arc::new(SimFifo::new(128));
    let mut driver = AudioDriver::new();
    register(&mut driver, &fifo, 128);

    let instance = driver.instance(0).expect("instance resolvable after probe");
    assert_eq!(instance.id(), 0);
    assert_eq!(instance.tx_fifo_depth(), 128);
    assert_eq!(instance.irq_line(), 61);

    let stop = Arc::new(AtomicBool::new(false));
    let hardware = {
        let fifo = fifo.clone();
        let instance = instance.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Acquire) {
                thread::sleep(Duration::from_micros(200));
                if fifo.drain_all() {
                    assert_eq!(handle_interrupt(&instance), IrqAck::Handled);
                }
            }
        })
    };

    let words: Vec<u32> = (0..4096).collect();
    let bytes = le_bytes(&words);
    let mut writer = driver.open(0).unwrap();
    assert_eq!(writer.write_bytes(&bytes).unwrap(), bytes.len());

    while fifo.queued() > 0 {
        thread::sleep(Duration::from_micros(200));
    }
    stop.store(true, Ordering::Release);
    hardware.join().unwrap();

    assert_eq!(fifo.drained(), words);
}

#[test]
fn overrun_is_absorbed_and_transmission_resumes() {
    let fifo = Arc::new(SimFifo::new(4));
    let mut driver = AudioDriver::new();
    let instance = register(&mut driver, &fifo, 4);
    let resets_after_probe = fifo.tx_resets();

    // Jam the FIFO past its depth straight at the register level.
    for word in 0..5u32 {
        fifo.write(FIFO_TDFD, word);
    }
    assert_ne!(fifo.isr_value() & ISR_TX_OVERRUN, 0);

    assert_eq!(handle_interrupt(&instance), IrqAck::Handled);
    assert_eq!(fifo.tx_resets(), resets_after_probe + 1);
    assert_eq!(fifo.isr_value(), 0);
    assert_eq!(instance.tx_vacancy(), 4);

    // The producer never sees the overrun; pushes keep working.
    fifo.write(FIFO_TDFD, 0xCAFE);
    fifo.drain_all();
    assert!(fifo.drained().ends_with(&[0xCAFE]));
}

#[test]
fn cancelled_wait_returns_interrupted() {
    // Depth equals the burst size, so vacancy never satisfies the strict
    // predicate and the writer blocks until cancelled.
    let fifo = Arc::new(SimFifo::new(WRITE_BURST_WORDS as u32));
    let mut driver = AudioDriver::new();
    register(&mut driver, &fifo, WRITE_BURST_WORDS as u32);

    let mut writer = driver.open(0).unwrap();
    let token = writer.cancel_token();
    let blocked = thread::spawn(move || writer.write_bytes(&[0u8; 256]));

    thread::sleep(Duration::from_millis(20));
    token.cancel();
    assert!(matches!(
        blocked.join().unwrap(),
        Err(DriverError::Interrupted)
    ));
}

#[test]
fn cancelling_one_session_leaves_other_waiters_usable() {
    let fifo = Arc::new(SimFifo::new(128));
    let mut driver = AudioDriver::new();
    let instance = register(&mut driver, &fifo, 128);

    // Prefill so both sessions block on vacancy.
    for word in 0..100u32 {
        fifo.write(FIFO_TDFD, word);
    }

    let mut doomed = driver.open(0).unwrap();
    let doomed_token = doomed.cancel_token();
    let doomed_join = thread::spawn(move || doomed.write_bytes(&[0u8; 64]));

    let mut survivor = driver.open(0).unwrap();
    let payload = le_bytes(&[0xAAAA, 0xBBBB]);
    let survivor_join = {
        let payload = payload.clone();
        thread::spawn(move || survivor.write_bytes(&payload))
    };

    thread::sleep(Duration::from_millis(20));
    doomed_token.cancel();
    assert!(matches!(
        doomed_join.join().unwrap(),
        Err(DriverError::Interrupted)
    ));

    // The surviving session completes once the codec drains the backlog.
    assert!(fifo.drain_all());
    assert_eq!(handle_interrupt(&instance), IrqAck::Handled);
    assert_eq!(survivor_join.join().unwrap().unwrap(), payload.len());
}

#[test]
fn unaligned_tail_is_a_short_write() {
    let fifo = Arc::new(SimFifo::new(128));
    let mut driver = AudioDriver::new();
    register(&mut driver, &fifo, 128);

    let mut writer = driver.open(0).unwrap();
    assert!(matches!(
        writer.write_bytes(&[1, 2, 3, 4, 5]),
        Err(DriverError::ShortWrite {
            written: 4,
            requested: 5
        })
    ));
    assert_eq!(fifo.queued(), 1);
}

#[test]
fn unknown_status_bits_are_drained_by_the_catch_all() {
    let fifo = Arc::new(SimFifo::new(16));
    let mut driver = AudioDriver::new();
    let instance = register(&mut driver, &fifo, 16);

    fifo.latch(1 << 3);
    assert_eq!(handle_interrupt(&instance), IrqAck::Handled);
    assert_eq!(fifo.isr_value(), 0);
}

#[test]
fn opening_an_unknown_instance_fails() {
    let fifo = Arc::new(SimFifo::new(16));
    let mut driver = AudioDriver::new();
    register(&mut driver, &fifo, 16);

    assert!(matches!(
        driver.open(7),
        Err(DriverError::NoSuchInstance { id: 7 })
    ));
}
