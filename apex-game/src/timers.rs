//! Clock capability and the interval timers that pace a live race.
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use std::cell::Cell;

use crate::config::TimingConfig;
use crate::session::{LapOutcome, PitTick, RaceSimulator, TireCompound};

const MAX_INTERVAL_MS: u64 = 86_400_000;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and headless runs.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(interval_from_ms(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

fn interval_from_ms(ms: u64) -> TimeDelta {
    let ms = i64::try_from(ms.clamp(1, MAX_INTERVAL_MS)).unwrap_or(1);
    TimeDelta::milliseconds(ms)
}

/// Fixed-period timer; idle until armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    interval: TimeDelta,
    next_due: Option<DateTime<Utc>>,
}

impl IntervalTimer {
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self {
            interval: interval_from_ms(ms),
            next_due: None,
        }
    }

    pub fn arm(&mut self, from: DateTime<Utc>) {
        self.next_due = Some(from + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    #[must_use]
    pub const fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// Consume one elapsed period, returning the instant it fell due.
    /// An idle timer arms itself at `now` instead of firing.
    fn take_due(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let Some(due) = self.next_due else {
            self.arm(now);
            return None;
        };
        if due > now {
            return None;
        }
        self.next_due = Some(due + self.interval);
        Some(due)
    }
}

/// Something a timer did to the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFire {
    Lap { lap: u32, outcome: LapOutcome },
    PitCountdown { remaining: u32 },
    PitRelease { compound: TireCompound },
}

/// Lap timer plus the one-second pit countdown. Only one of them drives the
/// race at any instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceTimers {
    lap: IntervalTimer,
    pit: IntervalTimer,
    cancelled: bool,
}

impl RaceTimers {
    #[must_use]
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            lap: IntervalTimer::from_millis(timing.lap_interval_ms),
            pit: IntervalTimer::from_millis(timing.pit_tick_ms),
            cancelled: false,
        }
    }

    /// Arm the lap timer at lights out.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if !self.cancelled {
            self.lap.arm(now);
        }
    }

    /// Switch to the pit countdown when the car is called in.
    pub fn pit_requested(&mut self, now: DateTime<Utc>) {
        if !self.cancelled {
            self.lap.disarm();
            self.pit.arm(now);
        }
    }

    /// Stop both timers for good; later pumps do nothing.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.lap.disarm();
        self.pit.disarm();
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    #[must_use]
    pub const fn lap_timer(&self) -> &IntervalTimer {
        &self.lap
    }

    #[must_use]
    pub const fn pit_timer(&self) -> &IntervalTimer {
        &self.pit
    }

    /// Fire every period that has elapsed up to `now`, in order.
    pub fn pump<R: Rng + ?Sized>(
        &mut self,
        sim: &mut RaceSimulator,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<TimerFire> {
        let mut fired = Vec::new();
        if self.cancelled {
            return fired;
        }
        loop {
            if sim.is_paused() {
                self.lap.disarm();
                let Some(at) = self.pit.take_due(now) else {
                    break;
                };
                match sim.pit_tick() {
                    Ok(PitTick::Counting { remaining }) => {
                        fired.push(TimerFire::PitCountdown { remaining });
                    }
                    Ok(PitTick::Released { compound }) => {
                        fired.push(TimerFire::PitRelease { compound });
                        self.pit.disarm();
                        self.lap.arm(at);
                    }
                    Err(_) => break,
                }
            } else if sim.lap_timer_active() {
                self.pit.disarm();
                if self.lap.take_due(now).is_none() {
                    break;
                }
                match sim.simulate_lap(rng) {
                    Ok(outcome) => fired.push(TimerFire::Lap {
                        lap: sim.state().lap,
                        outcome,
                    }),
                    Err(_) => break,
                }
            } else {
                // Suspended: not started yet, or the final lap is reached.
                self.lap.disarm();
                self.pit.disarm();
                break;
            }
        }
        fired
    }
}
