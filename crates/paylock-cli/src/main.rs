//! PayLock simulator.
//!
//! Runs the credit controller against mock devices and a virtual LCD. Coin,
//! bill and door events are typed on stdin; a dedicated thread plays the role
//! of the hardware handlers.
//!
//! ```text
//! paylock-sim [config.json]
//! ```
//!
//! Set `RUST_LOG` to change the log level (default `info`).

mod commands;

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use paylock_controller::{
    BillEvent, BillSource, CoinSource, Controller, ControllerConfig, LcdHandle, Peripherals,
    TenderState, VirtualLcd,
};
use paylock_core::constants::THRESHOLD;
use paylock_core::{DoorState, SignalLevel};
use paylock_hardware::mock::{
    MockBuzzer, MockDoorHandle, MockDoorSensor, MockInhibit, MockLock, MockOutputHandle,
};
use paylock_hardware::{Clock, SystemClock, TokioSleeper};
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::commands::{Command, HELP};

/// Extra spacing between simulated pulses so they clear the debounce window.
const PULSE_MARGIN: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => ControllerConfig::default(),
    };
    info!(?config, "Starting simulator");

    let (inhibit, _inhibit_lines) = MockInhibit::new();
    let (door, door_handle) = MockDoorSensor::new();
    let (lock, lock_handle) = MockLock::new();
    let (buzzer, buzzer_handle) = MockBuzzer::new();
    let lcd = VirtualLcd::new();
    let screen = lcd.handle();

    let mut controller = Controller::new(
        config,
        inhibit,
        Peripherals::new(door, lock, buzzer, lcd),
        TokioSleeper,
    )
    .context("failed to create controller")?;

    let console = Console {
        coins: controller.coin_source(),
        bills: controller.bill_source(),
        tender: Arc::clone(controller.tender()),
        clock: SystemClock::new(),
        pulse_gap: config.debounce_interval() + PULSE_MARGIN,
        door: door_handle,
        door_state: DoorState::Closed,
        lock: lock_handle,
        buzzer: buzzer_handle,
        screen,
    };

    let (quit_tx, quit_rx) = oneshot::channel();
    thread::Builder::new()
        .name("paylock-input".to_string())
        .spawn(move || console.run(quit_tx))
        .context("failed to spawn input thread")?;

    println!("{HELP}");

    tokio::select! {
        () = controller.run() => {}
        _ = quit_rx => info!("Quit requested"),
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            info!("Interrupted");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<ControllerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: ControllerConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

/// Stdin front end standing in for the acceptor and door hardware.
struct Console {
    coins: CoinSource<MockInhibit>,
    bills: BillSource<MockInhibit>,
    tender: Arc<TenderState<MockInhibit>>,
    clock: SystemClock,
    pulse_gap: Duration,
    door: MockDoorHandle,
    door_state: DoorState,
    lock: MockOutputHandle,
    buzzer: MockOutputHandle,
    screen: LcdHandle,
}

impl Console {
    fn run(mut self, quit: oneshot::Sender<()>) {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => self.apply(command),
                Err(e) => eprintln!("{e:#} (type 'help' for commands)"),
            }
        }
        let _ = quit.send(());
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Coin(pulses) => {
                let counted = (0..pulses)
                    .filter(|_| {
                        let counted = self.coins.on_pulse(self.clock.now());
                        thread::sleep(self.pulse_gap);
                        counted
                    })
                    .count();
                println!("{counted} coin pulse(s) sent");
            }
            Command::Bill => {
                let event = self.bills.on_edge(self.clock.now(), SignalLevel::Low);
                thread::sleep(self.pulse_gap);
                self.bills.on_edge(self.clock.now(), SignalLevel::High);
                match event {
                    BillEvent::Credited { total } => println!("bill accepted, credit {total}"),
                    BillEvent::Rejected { current } => {
                        println!("bill refused, credit stays at {current}")
                    }
                    BillEvent::Debounced | BillEvent::Released => println!("bill ignored"),
                }
            }
            Command::Open => self.set_door(DoorState::Open),
            Command::Close => self.set_door(DoorState::Closed),
            Command::Fault(reads) => {
                self.door.fail_next_reads(reads);
                println!("next {reads} door read(s) will fail");
            }
            Command::Status => self.print_status(),
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    fn set_door(&mut self, state: DoorState) {
        self.door.set_closed(state.is_closed());
        self.door_state = state;
        println!("door {state}");
    }

    fn print_status(&self) {
        let on_off = |on: bool| if on { "on" } else { "off" };

        println!("credit:     {} / {}", self.tender.credit(), THRESHOLD);
        println!("pending:    {} pulse(s)", self.tender.pending_pulses());
        println!(
            "acceptors:  {}",
            if self.tender.gate().is_enabled() {
                "enabled"
            } else {
                "inhibited"
            }
        );
        println!("door:       {}", self.door_state);
        println!(
            "lock:       {}",
            if self.lock.is_on() { "released" } else { "engaged" }
        );
        println!("buzzer:     {}", on_off(self.buzzer.is_on()));
        println!("{}", self.screen.render());
    }
}
