//! Cross-thread use of the shared primitives

use std::thread;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use reflow_core::control::ControlPhase;
use reflow_core::sync::{BusLock, StatusBoard, ThermalSnapshot};
use reflow_core::{ErrorChannel, ReflowError};

static ERRORS: ErrorChannel<CriticalSectionRawMutex> = ErrorChannel::new();
static STATUS: StatusBoard<CriticalSectionRawMutex> = StatusBoard::new();

#[test]
fn test_bus_lock_serializes_threads() {
    let bus: BusLock<CriticalSectionRawMutex, (u32, u32)> = BusLock::new((0, 0));

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..500 {
                    bus.with_bus_lock(|(a, b)| {
                        *a += 1;
                        *b = *a;
                    });
                }
            });
        }
    });

    assert_eq!(bus.with_bus_lock(|pair| *pair), (2000, 2000));
}

#[test]
fn test_error_channel_written_from_other_thread() {
    thread::spawn(|| ERRORS.record(ReflowError::StorageUnavailable))
        .join()
        .unwrap();

    let record = ERRORS.take().unwrap();
    assert_eq!(record.cause, Some(ReflowError::StorageUnavailable));
    assert!(ERRORS.take().is_none());
}

#[test]
fn test_status_snapshots_never_tear() {
    let writer = thread::spawn(|| {
        for setpoint in 1..=2000u16 {
            STATUS.publish(ThermalSnapshot {
                phase: ControlPhase::Heating,
                reflowing: true,
                setpoint_c: setpoint,
                soak_s: setpoint,
                ..ThermalSnapshot::idle()
            });
        }
    });

    for _ in 0..2000 {
        let snapshot = STATUS.read();
        assert_eq!(snapshot.setpoint_c, snapshot.soak_s);
    }
    writer.join().unwrap();
}
