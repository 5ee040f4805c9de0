//! The control loop: the single task that applies coin credit, hands over to
//! the unlock supervisor and keeps the display current.

use std::fmt;
use std::sync::Arc;

use paylock_core::{IncrementOutcome, TenderKind};
use paylock_core::constants::{MSG_CREDIT_LABEL, MSG_INSERT_COIN, MSG_INSERT_CREDIT};
use paylock_hardware::{
    AcceptorInhibit, Buzzer, DisplayDevice, DoorSensor, LockActuator, Sleeper,
};
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::error::ControllerResult;
use crate::sources::{BillSource, CoinSource};
use crate::supervisor::{Peripherals, UnlockReport, UnlockSupervisor, best_effort};
use crate::tender::{TenderActivity, TenderState};

/// What one pass of the control loop did.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Coin pulses drained this pass.
    pub pulses: u32,

    /// How the drained pulses were applied, if there were any.
    pub coins: Option<IncrementOutcome>,

    /// Bill handler activity since the previous pass.
    pub bills: TenderActivity,

    /// The unlock cycle run this pass, if the threshold was met.
    pub unlock: Option<UnlockReport>,

    /// Credit when the pass finished.
    pub credit: u32,
}

impl StepReport {
    pub fn unlocked(&self) -> bool {
        self.unlock.is_some()
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "credit {}", self.credit)?;
        if self.pulses > 0 {
            write!(f, ", {} pulses", self.pulses)?;
        }
        if let Some(unlock) = &self.unlock {
            write!(f, ", unlocked ({unlock})")?;
        }
        Ok(())
    }
}

/// Credit controller.
///
/// Owns the peripherals and the sleeper; shares the tender state with the
/// coin and bill sources through an `Arc`.
///
/// # Examples
///
/// ```
/// use paylock_controller::{Controller, ControllerConfig, Peripherals, VirtualLcd};
/// use paylock_core::{SignalLevel, Timestamp};
/// use paylock_hardware::mock::{
///     MockBuzzer, MockDoorSensor, MockInhibit, MockLock, RecordingSleeper,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (inhibit, _lines) = MockInhibit::new();
/// let (door, _door) = MockDoorSensor::new();
/// let (lock, solenoid) = MockLock::new();
/// let (buzzer, _alarm) = MockBuzzer::new();
/// let peripherals = Peripherals::new(door, lock, buzzer, VirtualLcd::new());
///
/// let mut controller = Controller::new(
///     ControllerConfig::default(),
///     inhibit,
///     peripherals,
///     RecordingSleeper::new(),
/// )?;
/// let bills = controller.bill_source();
///
/// for i in 0..5 {
///     bills.on_edge(Timestamp::from_millis(i * 1_000), SignalLevel::Low);
/// }
/// let report = controller.step().await?;
///
/// assert!(report.unlocked());
/// assert_eq!(report.credit, 0);
/// assert_eq!(solenoid.history(), vec![true, false]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Controller<I, D, L, B, Y, S> {
    config: ControllerConfig,
    tender: Arc<TenderState<I>>,
    peripherals: Peripherals<D, L, B, Y>,
    supervisor: UnlockSupervisor,
    sleeper: S,
}

impl<I, D, L, B, Y, S> Controller<I, D, L, B, Y, S>
where
    I: AcceptorInhibit,
    D: DoorSensor,
    L: LockActuator,
    B: Buzzer,
    Y: DisplayDevice,
    S: Sleeper,
{
    /// Create a controller with zero credit and the acceptors inhibited.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn new(
        config: ControllerConfig,
        inhibit: I,
        peripherals: Peripherals<D, L, B, Y>,
        sleeper: S,
    ) -> ControllerResult<Self> {
        config.validate()?;

        Ok(Self {
            supervisor: UnlockSupervisor::new(&config),
            config,
            tender: Arc::new(TenderState::new(inhibit)),
            peripherals,
            sleeper,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Shared tender state.
    pub fn tender(&self) -> &Arc<TenderState<I>> {
        &self.tender
    }

    pub fn peripherals(&self) -> &Peripherals<D, L, B, Y> {
        &self.peripherals
    }

    pub fn supervisor(&self) -> &UnlockSupervisor {
        &self.supervisor
    }

    /// Create the handler for the coin line.
    ///
    /// Each source carries its own debounce state; create one per line.
    pub fn coin_source(&self) -> CoinSource<I> {
        CoinSource::new(Arc::clone(&self.tender), self.config.debounce_interval())
    }

    /// Create the handler for the bill line.
    ///
    /// Each source carries its own debounce state; create one per line.
    pub fn bill_source(&self) -> BillSource<I> {
        BillSource::new(Arc::clone(&self.tender), self.config.debounce_interval())
    }

    /// Drive every output to a known state and show the boot banner.
    ///
    /// Outputs are written regardless of the state the drivers came up in.
    /// The acceptors stay inhibited until the first pass. Write failures are
    /// logged.
    pub fn boot(&mut self) {
        best_effort("solenoid", self.peripherals.lock.set_lock(false));
        best_effort("buzzer", self.peripherals.buzzer.set_buzzer(false));
        best_effort("acceptors", self.tender.gate().disable());

        if let Err(e) = show_banner(&mut self.peripherals.display) {
            warn!(error = %e, "Failed to show boot banner");
        }
        info!(
            threshold = self.tender.ledger().threshold(),
            "{}", MSG_INSERT_COIN
        );
    }

    /// Run one pass of the control loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the unlock supervisor refuses to start, which only
    /// happens when a previous cycle was aborted. Device faults are logged
    /// and never returned.
    pub async fn step(&mut self) -> ControllerResult<StepReport> {
        let bills = self.tender.take_activity();
        log_bill_activity(&bills, self.tender.credit());

        let pulses = self.tender.take_pending_pulses();
        let coins = if pulses > 0 {
            let outcome = self.tender.drain_pending_coins(pulses);
            match outcome {
                IncrementOutcome::Accepted { total } => {
                    info!(
                        tender = %TenderKind::Coin,
                        credit = total,
                        pulses,
                        "{}{}",
                        MSG_CREDIT_LABEL,
                        total
                    );
                }
                IncrementOutcome::Rejected { current, .. } => {
                    warn!(
                        tender = %TenderKind::Coin,
                        credit = current,
                        pulses,
                        "Credit limit reached, no more coins accepted."
                    );
                }
            }
            Some(outcome)
        } else {
            None
        };

        let unlock = if self.tender.has_reached_threshold() {
            let report = self
                .supervisor
                .run(&mut self.peripherals, &self.sleeper)
                .await?;
            self.tender.reset();
            debug!("Credit reset");
            Some(report)
        } else {
            None
        };

        if !self.tender.has_reached_threshold() {
            if let Err(e) = self.tender.gate().enable() {
                warn!(error = %e, "Failed to enable acceptors");
            }
        }

        let credit = self.tender.credit();
        self.render_credit(credit);

        self.sleeper.sleep(self.config.loop_interval()).await;

        Ok(StepReport {
            pulses,
            coins,
            bills,
            unlock,
            credit,
        })
    }

    /// Run the control loop forever.
    ///
    /// A failed pass is logged, the supervisor is forced back to idle and the
    /// loop carries on after one loop interval.
    pub async fn run(&mut self) {
        self.boot();
        loop {
            match self.step().await {
                Ok(report) => debug!(%report, "Control loop pass"),
                Err(e) => {
                    error!(error = %e, "Control loop pass failed");
                    self.supervisor.reset();
                    self.sleeper.sleep(self.config.loop_interval()).await;
                }
            }
        }
    }

    fn render_credit(&mut self, credit: u32) {
        if let Err(e) = show_credit(&mut self.peripherals.display, credit) {
            warn!(error = %e, "Failed to render credit");
        }
    }
}

fn show_banner<Y: DisplayDevice>(display: &mut Y) -> paylock_hardware::Result<()> {
    display.clear()?;
    display.show(0, MSG_INSERT_COIN)
}

fn show_credit<Y: DisplayDevice>(display: &mut Y, credit: u32) -> paylock_hardware::Result<()> {
    display.clear()?;
    display.show(0, MSG_INSERT_CREDIT)?;
    display.show(1, &format!("{MSG_CREDIT_LABEL}{credit}"))
}

fn log_bill_activity(activity: &TenderActivity, credit: u32) {
    if activity.bills_credited > 0 {
        info!(
            tender = %TenderKind::Bill,
            credit,
            bills = activity.bills_credited,
            "{}{}",
            MSG_CREDIT_LABEL,
            credit
        );
    }
    if activity.bills_rejected > 0 {
        warn!(
            tender = %TenderKind::Bill,
            credit,
            bills = activity.bills_rejected,
            "Credit limit reached, bill refused"
        );
    }
    if activity.inhibit_faults > 0 {
        warn!(
            faults = activity.inhibit_faults,
            "Failed to inhibit acceptors from handler"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{LcdHandle, VirtualLcd};
    use paylock_core::constants::THRESHOLD;
    use paylock_core::{SignalLevel, Timestamp};
    use paylock_hardware::mock::{
        MockBuzzer, MockDoorSensor, MockInhibit, MockInhibitHandle, MockLock, RecordingSleeper,
    };
    use std::time::Duration;

    type TestController = Controller<
        MockInhibit,
        MockDoorSensor,
        MockLock,
        MockBuzzer,
        VirtualLcd,
        RecordingSleeper,
    >;

    fn controller() -> (TestController, MockInhibitHandle, LcdHandle, RecordingSleeper) {
        let (inhibit, lines) = MockInhibit::new();
        let (door, _) = MockDoorSensor::new();
        let (lock, _) = MockLock::new();
        let (buzzer, _) = MockBuzzer::new();
        let lcd = VirtualLcd::new();
        let screen = lcd.handle();
        let sleeper = RecordingSleeper::new();
        let controller = Controller::new(
            ControllerConfig::default(),
            inhibit,
            Peripherals::new(door, lock, buzzer, lcd),
            sleeper.clone(),
        )
        .unwrap();
        (controller, lines, screen, sleeper)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (inhibit, _) = MockInhibit::new();
        let (door, _) = MockDoorSensor::new();
        let (lock, _) = MockLock::new();
        let (buzzer, _) = MockBuzzer::new();
        let result = Controller::new(
            ControllerConfig::default().with_loop_interval_ms(0),
            inhibit,
            Peripherals::new(door, lock, buzzer, VirtualLcd::new()),
            RecordingSleeper::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_boot_banner() {
        let (mut controller, lines, screen, _) = controller();
        controller.boot();
        assert_eq!(screen.line(0).unwrap().trim_end(), MSG_INSERT_COIN);
        assert!(!lines.is_enabled());
    }

    #[test]
    fn test_boot_drives_outputs_to_safe_state() {
        let (inhibit, lines) = MockInhibit::new();
        let (door, _) = MockDoorSensor::new();
        let (lock, solenoid) = MockLock::new();
        let (buzzer, alarm) = MockBuzzer::new();
        let mut controller = Controller::new(
            ControllerConfig::default(),
            inhibit,
            Peripherals::new(door, lock, buzzer, VirtualLcd::new()),
            RecordingSleeper::new(),
        )
        .unwrap();

        controller.boot();

        assert_eq!(solenoid.history(), vec![false]);
        assert_eq!(alarm.history(), vec![false]);
        assert_eq!(lines.disable_writes(), 1);
        assert_eq!(lines.enable_writes(), 0);
        assert!(!controller.tender().gate().is_enabled());
    }

    #[test]
    fn test_boot_survives_output_faults() {
        let (inhibit, _) = MockInhibit::new();
        let (door, _) = MockDoorSensor::new();
        let (lock, solenoid) = MockLock::new();
        let (buzzer, alarm) = MockBuzzer::new();
        let lcd = VirtualLcd::new();
        let screen = lcd.handle();
        solenoid.set_fail_writes(true);
        alarm.set_fail_writes(true);
        let mut controller = Controller::new(
            ControllerConfig::default(),
            inhibit,
            Peripherals::new(door, lock, buzzer, lcd),
            RecordingSleeper::new(),
        )
        .unwrap();

        controller.boot();

        assert!(solenoid.history().is_empty());
        assert!(alarm.history().is_empty());
        assert_eq!(screen.line(0).unwrap().trim_end(), MSG_INSERT_COIN);
    }

    #[tokio::test]
    async fn test_idle_pass_enables_and_renders() {
        let (mut controller, lines, screen, sleeper) = controller();

        let report = controller.step().await.unwrap();

        assert_eq!(report.credit, 0);
        assert!(report.coins.is_none());
        assert!(!report.unlocked());
        assert!(lines.is_enabled());
        assert_eq!(screen.line(0).unwrap().trim_end(), MSG_INSERT_CREDIT);
        assert_eq!(screen.line(1).unwrap().trim_end(), "Credit: 0");
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(1000)]);
    }

    #[tokio::test]
    async fn test_coin_pulses_applied_as_one_increment() {
        let (mut controller, _, screen, _) = controller();
        let coins = controller.coin_source();
        for i in 0..7 {
            coins.on_pulse(Timestamp::from_millis(i * 100));
        }

        let report = controller.step().await.unwrap();

        assert_eq!(report.pulses, 7);
        assert_eq!(report.coins, Some(IncrementOutcome::Accepted { total: 7 }));
        assert_eq!(screen.line(1).unwrap().trim_end(), "Credit: 7");
    }

    #[tokio::test]
    async fn test_bill_activity_is_reported() {
        let (mut controller, _, _, _) = controller();
        let bills = controller.bill_source();
        bills.on_edge(Timestamp::from_millis(0), SignalLevel::Low);
        bills.on_edge(Timestamp::from_millis(500), SignalLevel::High);
        bills.on_edge(Timestamp::from_millis(1_000), SignalLevel::Low);

        let report = controller.step().await.unwrap();

        assert_eq!(report.bills.bills_credited, 2);
        assert_eq!(report.credit, 20);
    }

    #[tokio::test]
    async fn test_exact_threshold_from_coins_unlocks() {
        let (mut controller, lines, _, _) = controller();
        let coins = controller.coin_source();
        for i in 0..u64::from(THRESHOLD) {
            coins.on_pulse(Timestamp::from_millis(i * 100));
        }

        let report = controller.step().await.unwrap();

        assert!(report.unlocked());
        assert_eq!(report.credit, 0);
        assert!(lines.is_enabled());
    }
}
