/// Countdown state machine for Pomodoro sessions
use std::time::Duration;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Working,
    Grace,
    Break,
}

impl TimerState {
    /// Next state in the fixed work, grace, break cycle.
    pub fn next(self) -> Self {
        match self {
            TimerState::Working => TimerState::Grace,
            TimerState::Grace => TimerState::Break,
            TimerState::Break => TimerState::Working,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TimerState::Working => "WORKING",
            TimerState::Grace => "GRACE",
            TimerState::Break => "BREAK",
        }
    }
}

/// Single mode counts down once and stops; cycle mode loops forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Cycle,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub work: Duration,
    pub grace: Duration,
    pub rest: Duration,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work: Duration::from_secs(25 * 60),
            grace: Duration::from_secs(10),
            rest: Duration::from_secs(5 * 60),
        }
    }
}

impl Durations {
    pub fn for_state(&self, state: TimerState) -> Duration {
        match state {
            TimerState::Working => self.work,
            TimerState::Grace => self.grace,
            TimerState::Break => self.rest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TimerState,
    pub to: TimerState,
    pub play_alert: bool,
    /// Set when a single mode countdown has run out.
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Counted(Duration),
    Transitioned(Transition),
    /// A finished single mode countdown does nothing until reset.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    state: TimerState,
    remaining: Duration,
    durations: Durations,
    interval: Duration,
    mode: Mode,
    finished: bool,
}

impl Countdown {
    pub fn new(durations: Durations, mode: Mode) -> Self {
        Self {
            state: TimerState::Working,
            remaining: durations.work,
            durations,
            interval: TICK_INTERVAL,
            mode,
            finished: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn topic_editable(&self) -> bool {
        self.state == TimerState::Working
    }

    pub fn tick(&mut self) -> Tick {
        if self.finished {
            return Tick::Idle;
        }
        if self.remaining > Duration::ZERO {
            self.remaining = self.remaining.saturating_sub(self.interval);
            Tick::Counted(self.remaining)
        } else {
            Tick::Transitioned(self.transition())
        }
    }

    pub fn transition(&mut self) -> Transition {
        let from = self.state;

        if self.mode == Mode::Single {
            self.finished = true;
            self.remaining = Duration::ZERO;
            return Transition {
                from,
                to: from,
                play_alert: true,
                finished: true,
            };
        }

        let to = from.next();
        self.state = to;
        self.remaining = self.durations.for_state(to);
        Transition {
            from,
            to,
            play_alert: to != TimerState::Break,
            finished: false,
        }
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Working;
        self.remaining = self.durations.work;
        self.finished = false;
    }

    pub fn set_remaining(&mut self, remaining: Duration) {
        self.remaining = remaining;
    }
}
