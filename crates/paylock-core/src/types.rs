use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Monotonic timestamp in milliseconds since controller start.
///
/// Hardware handlers stamp every signal transition with the value of a
/// monotonic clock; the debounce filter compares these stamps. Wall-clock time
/// is never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Timestamp at controller start.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a timestamp from milliseconds since start.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    /// Milliseconds since start.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is later than `self`.
    #[must_use]
    pub fn saturating_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Timestamp shifted forward by `delta`, saturating at the maximum.
    #[must_use]
    pub fn saturating_add(&self, delta: Duration) -> Timestamp {
        let millis = u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Electrical level of an input line after a transition.
///
/// Acceptor outputs are open-collector lines with pull-ups, so the line is
/// pulled [`Low`](SignalLevel::Low) while the acceptor reports an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLevel {
    High,
    Low,
}

impl SignalLevel {
    /// Whether this level means the acceptor is asserting its output.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, SignalLevel::Low)
    }
}

/// Door position as reported by the reed switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    /// Map a `read_door_closed` sample to a door state.
    ///
    /// # Examples
    ///
    /// ```
    /// use paylock_core::DoorState;
    ///
    /// assert_eq!(DoorState::from_closed(true), DoorState::Closed);
    /// assert_eq!(DoorState::from_closed(false), DoorState::Open);
    /// ```
    #[must_use]
    pub fn from_closed(closed: bool) -> Self {
        if closed {
            DoorState::Closed
        } else {
            DoorState::Open
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, DoorState::Closed)
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DoorState::Open => write!(f, "open"),
            DoorState::Closed => write!(f, "closed"),
        }
    }
}

/// Kind of tender fed into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderKind {
    Coin,
    Bill,
}

impl fmt::Display for TenderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TenderKind::Coin => write!(f, "coin"),
            TenderKind::Bill => write!(f, "bill"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, 40, 60)]
    #[case(40, 40, 0)]
    #[case(40, 100, 0)] // earlier stamp is later: saturates
    fn test_timestamp_saturating_since(
        #[case] now: u64,
        #[case] earlier: u64,
        #[case] expected_ms: u64,
    ) {
        let elapsed = Timestamp::from_millis(now).saturating_since(Timestamp::from_millis(earlier));
        assert_eq!(elapsed, Duration::from_millis(expected_ms));
    }

    #[test]
    fn test_timestamp_saturating_add() {
        let t = Timestamp::from_millis(10).saturating_add(Duration::from_millis(51));
        assert_eq!(t.as_millis(), 61);

        let max = Timestamp::from_millis(u64::MAX).saturating_add(Duration::from_secs(1));
        assert_eq!(max.as_millis(), u64::MAX);
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(Timestamp::from_millis(1500).to_string(), "1500ms");
    }

    #[test]
    fn test_signal_level_active_low() {
        assert!(SignalLevel::Low.is_active());
        assert!(!SignalLevel::High.is_active());
    }

    #[test]
    fn test_door_state_serialization() {
        let json = serde_json::to_string(&DoorState::Closed).unwrap();
        assert_eq!(json, "\"closed\"");
        let back: DoorState = serde_json::from_str(&json).unwrap();
        assert!(back.is_closed());
    }

    #[test]
    fn test_tender_kind_display() {
        assert_eq!(TenderKind::Coin.to_string(), "coin");
        assert_eq!(TenderKind::Bill.to_string(), "bill");
    }
}
