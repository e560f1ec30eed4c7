use serde::{Serialize, Deserialize};
use log::{info, debug};

/// Remaining time at or below this many seconds shows the warning colour.
pub const WARNING_THRESHOLD_SECS: i64 = 300;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimerState {
    pub phase: TimerPhase,
    pub elapsed_seconds: u64,
    pub limit_seconds: u64,
    pub remaining_seconds: i64,
    pub is_overrun: bool,
}

/// Countdown for one writing attempt.
///
/// Time only advances through [`WritingTimer::tick`], one second per call, so
/// the engine is independent of whatever clock drives it. Elapsed time keeps
/// counting past the limit; an overrun is reported, never refused.
#[derive(Debug, Clone)]
pub struct WritingTimer {
    elapsed_seconds: u64,
    limit_seconds: u64,
    phase: TimerPhase,
}

impl WritingTimer {
    pub fn new(limit_seconds: u64) -> Self {
        Self {
            elapsed_seconds: 0,
            limit_seconds: limit_seconds.max(1),
            phase: TimerPhase::Idle,
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(u64::from(minutes) * 60)
    }

    /// Restores a paused timer at a previously recorded elapsed time.
    pub fn resumed_at(limit_seconds: u64, elapsed_seconds: u64) -> Self {
        Self {
            elapsed_seconds,
            limit_seconds: limit_seconds.max(1),
            phase: TimerPhase::Paused,
        }
    }

    /// Returns true when the phase changed.
    pub fn start(&mut self) -> bool {
        match self.phase {
            TimerPhase::Running => false,
            TimerPhase::Idle => {
                self.phase = TimerPhase::Running;
                info!("⏱️ Writing timer started ({}s limit)", self.limit_seconds);
                true
            }
            TimerPhase::Paused => {
                self.phase = TimerPhase::Running;
                info!("▶️ Writing timer resumed at {}s", self.elapsed_seconds);
                true
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.phase == TimerPhase::Running {
            self.phase = TimerPhase::Paused;
            info!("⏸️ Writing timer paused at {}s", self.elapsed_seconds);
            true
        } else {
            false
        }
    }

    pub fn stop(&mut self) {
        if self.phase != TimerPhase::Idle || self.elapsed_seconds != 0 {
            info!("⏹️ Writing timer stopped after {}s", self.elapsed_seconds);
        }
        self.phase = TimerPhase::Idle;
        self.elapsed_seconds = 0;
    }

    /// Advances by one second. Has no effect unless running.
    pub fn tick(&mut self) -> bool {
        if self.phase != TimerPhase::Running {
            return false;
        }
        self.elapsed_seconds += 1;
        if self.elapsed_seconds == self.limit_seconds {
            info!("⌛ Time limit reached ({}s)", self.limit_seconds);
        } else {
            debug!("tick: {}s elapsed", self.elapsed_seconds);
        }
        true
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// True once the timer has been started, even if it is paused now.
    pub fn has_started(&self) -> bool {
        self.phase != TimerPhase::Idle
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn limit_seconds(&self) -> u64 {
        self.limit_seconds
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.limit_seconds as i64 - self.elapsed_seconds as i64
    }

    pub fn is_overrun(&self) -> bool {
        self.remaining_seconds() <= 0
    }

    pub fn is_warning(&self) -> bool {
        let remaining = self.remaining_seconds();
        remaining > 0 && remaining <= WARNING_THRESHOLD_SECS
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            phase: self.phase,
            elapsed_seconds: self.elapsed_seconds,
            limit_seconds: self.limit_seconds,
            remaining_seconds: self.remaining_seconds(),
            is_overrun: self.is_overrun(),
        }
    }
}

/// Formats seconds as `MM:SS`, with a leading `-` once the limit has passed.
pub fn format_clock(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}
