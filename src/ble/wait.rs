//! Bounded busy-wait against a monotonic tick counter.
//!
//! The controller bridge has nothing else to run while a command is in
//! flight, so waiting is a tight poll rather than a scheduler sleep. The
//! deadline is fixed at entry; the predicate is always checked before the
//! deadline, and nothing is reset on timeout.

use core::time::Duration;

/// Free-running uptime counter.
pub trait Monotonic {
    /// Counter frequency.
    const TICK_HZ: u64;

    /// Ticks since an arbitrary fixed origin. Must never go backwards.
    fn now_ticks(&self) -> u64;
}

impl<M: Monotonic> Monotonic for &M {
    const TICK_HZ: u64 = M::TICK_HZ;

    fn now_ticks(&self) -> u64 {
        (**self).now_ticks()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    Ready,
    TimedOut,
}

/// Convert a duration into ticks, rounding up so a wait never ends early.
pub fn duration_to_ticks(duration: Duration, tick_hz: u64) -> u64 {
    let ticks = (duration.as_nanos() * tick_hz as u128).div_ceil(1_000_000_000);
    u64::try_from(ticks).unwrap_or(u64::MAX)
}

/// Poll `ready` until it returns `true` or `timeout` has elapsed.
pub fn wait_until<M, F>(clock: &M, timeout: Duration, mut ready: F) -> WaitOutcome
where
    M: Monotonic,
    F: FnMut() -> bool,
{
    let deadline = clock
        .now_ticks()
        .saturating_add(duration_to_ticks(timeout, M::TICK_HZ));

    loop {
        if ready() {
            return WaitOutcome::Ready;
        }
        if clock.now_ticks() > deadline {
            return WaitOutcome::TimedOut;
        }
        core::hint::spin_loop();
    }
}

/// Spin for `duration`.
pub fn settle<M: Monotonic>(clock: &M, duration: Duration) {
    let _ = wait_until(clock, duration, || false);
}

/// Embassy uptime counter.
#[cfg(feature = "embedded")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyMonotonic;

#[cfg(feature = "embedded")]
impl Monotonic for EmbassyMonotonic {
    const TICK_HZ: u64 = embassy_time::TICK_HZ;

    fn now_ticks(&self) -> u64 {
        embassy_time::Instant::now().as_ticks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Counter that advances one tick per read.
    struct SteppingClock {
        now: Cell<u64>,
    }

    impl SteppingClock {
        fn new() -> Self {
            Self { now: Cell::new(0) }
        }
    }

    impl Monotonic for SteppingClock {
        const TICK_HZ: u64 = 10;

        fn now_ticks(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + 1);
            now
        }
    }

    #[test]
    fn returns_ready_without_waiting() {
        let clock = SteppingClock::new();
        let outcome = wait_until(&clock, Duration::from_secs(1), || true);
        assert_eq!(outcome, WaitOutcome::Ready);
        // deadline sample only
        assert_eq!(clock.now.get(), 1);
    }

    #[test]
    fn times_out_only_after_deadline() {
        let clock = SteppingClock::new();
        let outcome = wait_until(&clock, Duration::from_secs(1), || false);
        assert_eq!(outcome, WaitOutcome::TimedOut);
        // entry at 0, deadline 10, first sample past it is 11
        assert_eq!(clock.now.get(), 12);
    }

    #[test]
    fn observes_flag_set_mid_wait() {
        let clock = SteppingClock::new();
        let mut polls = 0;
        let outcome = wait_until(&clock, Duration::from_secs(1), || {
            polls += 1;
            polls == 5
        });
        assert_eq!(outcome, WaitOutcome::Ready);
        assert_eq!(polls, 5);
    }

    #[test]
    fn ticks_round_up() {
        assert_eq!(duration_to_ticks(Duration::from_secs(1), 32_768), 32_768);
        assert_eq!(duration_to_ticks(Duration::from_micros(977), 32_768), 33);
        assert_eq!(duration_to_ticks(Duration::from_nanos(1), 10), 1);
        assert_eq!(duration_to_ticks(Duration::ZERO, 10), 0);
    }

    #[test]
    fn zero_timeout_still_polls_once() {
        let clock = SteppingClock::new();
        let mut polls = 0;
        let outcome = wait_until(&clock, Duration::ZERO, || {
            polls += 1;
            false
        });
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert_eq!(polls, 1);
    }
}
