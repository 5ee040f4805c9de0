//! Common test utilities for controller integration tests.
//!
//! A [`Rig`] is a controller wired to mock devices, a virtual LCD and a
//! recording sleeper driven by a shared [`MockClock`], plus the handles the
//! tests use to script the door and inspect the outputs.

#![allow(dead_code)]

use std::time::Duration;

use paylock_controller::{BillSource, Controller, ControllerConfig, LcdHandle, Peripherals, VirtualLcd};
use paylock_core::SignalLevel;
use paylock_hardware::Clock;
use paylock_hardware::mock::{
    MockBuzzer, MockClock, MockDoorHandle, MockDoorSensor, MockInhibit, MockInhibitHandle,
    MockLock, MockOutputHandle, RecordingSleeper,
};

pub type TestController = Controller<
    MockInhibit,
    MockDoorSensor,
    MockLock,
    MockBuzzer,
    VirtualLcd,
    RecordingSleeper,
>;

pub struct Rig {
    pub controller: TestController,
    pub inhibit: MockInhibitHandle,
    pub door: MockDoorHandle,
    pub lock: MockOutputHandle,
    pub buzzer: MockOutputHandle,
    pub screen: LcdHandle,
    pub clock: MockClock,
    pub sleeper: RecordingSleeper,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_sleeper(|sleeper| sleeper)
    }

    /// Build a rig whose sleeper runs `hook` with the index of every sleep.
    pub fn with_hook(hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        Self::with_sleeper(|sleeper| sleeper.with_hook(hook))
    }

    fn with_sleeper(configure: impl FnOnce(RecordingSleeper) -> RecordingSleeper) -> Self {
        let clock = MockClock::new();
        let sleeper = configure(RecordingSleeper::new().with_clock(clock.clone()));

        let (inhibit_dev, inhibit) = MockInhibit::new();
        let (door_dev, door) = MockDoorSensor::new();
        let (lock_dev, lock) = MockLock::new();
        let (buzzer_dev, buzzer) = MockBuzzer::new();
        let lcd = VirtualLcd::new();
        let screen = lcd.handle();

        let controller = Controller::new(
            ControllerConfig::default(),
            inhibit_dev,
            Peripherals::new(door_dev, lock_dev, buzzer_dev, lcd),
            sleeper.clone(),
        )
        .expect("default config is valid");

        Self {
            controller,
            inhibit,
            door,
            lock,
            buzzer,
            screen,
            clock,
            sleeper,
        }
    }
}

/// Feed one full bill pulse (active edge, then release) to `bills`.
pub fn insert_bill(bills: &BillSource<MockInhibit>, clock: &MockClock) {
    bills.on_edge(clock.now(), SignalLevel::Low);
    clock.advance(Duration::from_millis(150));
    bills.on_edge(clock.now(), SignalLevel::High);
    clock.advance(Duration::from_millis(150));
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
