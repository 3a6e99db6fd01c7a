use std::time::Instant;

use crate::entry::{edit_text, format_time_input, parse_manual_input};
use crate::error::EntryError;
use crate::format::format_remaining;
use crate::hooks::{HookRunner, Hooks};
use crate::scheduler::Ticker;
use crate::sound::Alert;
use crate::timer::{Countdown, Tick, TimerState, Transition};

pub const GRACE_HEADLINE: &str = "Prepare for a break";
pub const BREAK_HEADLINE: &str = "Break Time!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLabel {
    Start,
    Pause,
    Resume,
}

impl ToggleLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ToggleLabel::Start => "Start",
            ToggleLabel::Pause => "Pause",
            ToggleLabel::Resume => "Resume",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editing {
    /// Digit entry, holds the `HH:MM:SS` buffer.
    Time(String),
    Topic,
}

/// Result of leaving the time field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Accepted,
    Shake(EntryError),
}

/// A running Pomodoro: the countdown plus everything wired to it.
pub struct Session<T: Ticker, A: Alert> {
    countdown: Countdown,
    ticker: T,
    alert: A,
    hooks: HookRunner,
    topic: String,
    label: ToggleLabel,
    toggle_enabled: bool,
    editing: Option<Editing>,
}

impl<T: Ticker, A: Alert> Session<T, A> {
    /// Keeps whatever time `countdown` already holds, so a preset first
    /// countdown survives.
    pub fn new(countdown: Countdown, mut ticker: T, alert: A, hooks: Hooks, topic: String) -> Self {
        ticker.stop();
        Self {
            countdown,
            ticker,
            alert,
            hooks: HookRunner::new(hooks),
            topic,
            label: ToggleLabel::Start,
            toggle_enabled: true,
            editing: None,
        }
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn state(&self) -> TimerState {
        self.countdown.state()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn label(&self) -> ToggleLabel {
        self.label
    }

    pub fn toggle_enabled(&self) -> bool {
        self.toggle_enabled
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_active()
    }

    pub fn editing(&self) -> Option<&Editing> {
        self.editing.as_ref()
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }

    /// Text above the timer: the topic while working, a prompt otherwise.
    pub fn headline(&self) -> &str {
        match self.countdown.state() {
            TimerState::Working => &self.topic,
            TimerState::Grace => GRACE_HEADLINE,
            TimerState::Break => BREAK_HEADLINE,
        }
    }

    pub fn timer_text(&self) -> String {
        match &self.editing {
            Some(Editing::Time(buffer)) => buffer.clone(),
            _ => format_remaining(self.countdown.remaining()),
        }
    }

    /// Start, pause or resume. Returns false when the toggle is disabled.
    pub fn toggle(&mut self) -> bool {
        if !self.toggle_enabled {
            return false;
        }
        if self.ticker.is_active() {
            self.ticker.stop();
            self.label = ToggleLabel::Resume;
        } else {
            if self.label == ToggleLabel::Start {
                self.hooks.on_enter(self.countdown.state());
            }
            self.ticker.start(self.countdown.interval());
            self.label = ToggleLabel::Pause;
        }
        true
    }

    pub fn reset(&mut self) {
        self.ticker.stop();
        self.alert.stop();
        self.countdown.reset();
        self.label = ToggleLabel::Start;
        self.toggle_enabled = true;
        self.editing = None;
    }

    /// Delivers a tick if the ticker says one is due.
    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        if self.ticker.due(now) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn advance(&mut self) -> Tick {
        self.hooks.reap();
        let tick = self.countdown.tick();
        if let Tick::Transitioned(transition) = tick {
            self.enter(transition);
        }
        tick
    }

    fn enter(&mut self, transition: Transition) {
        log::debug!(
            "{} -> {}",
            transition.from.as_str(),
            transition.to.as_str()
        );
        if transition.play_alert {
            self.alert.play();
        }

        if transition.finished {
            self.ticker.stop();
            self.label = ToggleLabel::Start;
            self.toggle_enabled = false;
            self.hooks.on_leave(transition.from);
            return;
        }

        self.hooks.on_leave(transition.from);
        self.hooks.on_enter(transition.to);
        match transition.to {
            TimerState::Grace => {
                self.toggle_enabled = false;
                if self.editing == Some(Editing::Topic) {
                    self.editing = None;
                }
            }
            TimerState::Working => self.toggle_enabled = true,
            TimerState::Break => {}
        }
    }

    /// Time can be edited on a fresh or reset timer, never mid-run.
    pub fn begin_time_edit(&mut self) -> bool {
        if self.ticker.is_active()
            || self.label == ToggleLabel::Resume
            || !self.toggle_enabled
            || self.editing.is_some()
        {
            return false;
        }
        self.editing = Some(Editing::Time(edit_text(self.countdown.remaining())));
        true
    }

    /// Replaces the time buffer with `text` run through the live filter.
    pub fn input_time_text(&mut self, text: &str) {
        if let Some(Editing::Time(buffer)) = &mut self.editing {
            *buffer = format_time_input(text);
        }
    }

    pub fn type_time_digit(&mut self, digit: char) {
        if let Some(Editing::Time(buffer)) = &self.editing {
            let text = format!("{}{}", buffer, digit);
            self.input_time_text(&text);
        }
    }

    pub fn erase_time_digit(&mut self) {
        if let Some(Editing::Time(buffer)) = &self.editing {
            let mut text = buffer.clone();
            text.pop();
            self.input_time_text(&text);
        }
    }

    /// Leaves the time field. A rejected entry keeps the previous time.
    pub fn commit_time_edit(&mut self) -> Feedback {
        if !matches!(self.editing, Some(Editing::Time(_))) {
            return Feedback::Accepted;
        }
        let Some(Editing::Time(buffer)) = self.editing.take() else {
            return Feedback::Accepted;
        };
        match parse_manual_input(&buffer) {
            Ok(remaining) => {
                self.countdown.set_remaining(remaining);
                Feedback::Accepted
            }
            Err(e) => {
                log::debug!("rejected time entry {}: {}", buffer, e);
                Feedback::Shake(e)
            }
        }
    }

    pub fn begin_topic_edit(&mut self) -> bool {
        if !self.countdown.topic_editable() || self.editing.is_some() {
            return false;
        }
        self.editing = Some(Editing::Topic);
        true
    }

    /// Ignored outside the working state.
    pub fn set_topic(&mut self, topic: &str) -> bool {
        if !self.countdown.topic_editable() {
            return false;
        }
        self.topic = topic.to_string();
        true
    }

    pub fn type_topic_char(&mut self, ch: char) {
        if self.editing == Some(Editing::Topic) {
            let topic = format!("{}{}", self.topic, ch);
            self.set_topic(&topic);
        }
    }

    pub fn erase_topic_char(&mut self) {
        if self.editing == Some(Editing::Topic) {
            let mut topic = self.topic.clone();
            topic.pop();
            self.set_topic(&topic);
        }
    }

    /// Leaves whichever field is being edited.
    pub fn finish_edit(&mut self) -> Feedback {
        match self.editing {
            Some(Editing::Time(_)) => self.commit_time_edit(),
            Some(Editing::Topic) => {
                self.editing = None;
                Feedback::Accepted
            }
            None => Feedback::Accepted,
        }
    }

    /// Drops an edit in progress without applying it.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Runs the end hook of the current state if a session was started.
    pub fn interrupt(&mut self) {
        if self.label != ToggleLabel::Start {
            self.hooks.on_leave(self.countdown.state());
        }
        self.ticker.stop();
        self.alert.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::scheduler::ManualTicker;
    use crate::timer::{Durations, Mode};

    #[derive(Default, Clone)]
    struct Recorder {
        plays: Rc<Cell<usize>>,
        stops: Rc<Cell<usize>>,
    }

    impl Alert for Recorder {
        fn play(&mut self) {
            self.plays.set(self.plays.get() + 1);
        }
        fn stop(&mut self) {
            self.stops.set(self.stops.get() + 1);
        }
    }

    fn durations() -> Durations {
        Durations {
            work: Duration::from_secs(3),
            grace: Duration::from_secs(2),
            rest: Duration::from_secs(4),
        }
    }

    fn session(mode: Mode) -> (Session<ManualTicker, Recorder>, Recorder) {
        let recorder = Recorder::default();
        let session = Session::new(
            Countdown::new(durations(), mode),
            ManualTicker::new(),
            recorder.clone(),
            Hooks::default(),
            "Writing".to_string(),
        );
        (session, recorder)
    }

    fn drive(session: &mut Session<ManualTicker, Recorder>, ticks: usize) -> Vec<Tick> {
        session.ticker_mut().fire(ticks);
        std::iter::from_fn(|| session.poll(Instant::now())).collect()
    }

    fn until_state(session: &mut Session<ManualTicker, Recorder>, state: TimerState) {
        for _ in 0..100 {
            if session.state() == state {
                return;
            }
            drive(session, 1);
        }
        panic!("never reached {}", state.as_str());
    }

    #[test]
    fn preset_first_countdown_is_kept() {
        let mut countdown = Countdown::new(durations(), Mode::Cycle);
        countdown.set_remaining(parse_manual_input("000010").unwrap());
        let mut session = Session::new(
            countdown,
            ManualTicker::new(),
            Recorder::default(),
            Hooks::default(),
            "Writing".to_string(),
        );
        assert_eq!(session.countdown().remaining(), Duration::from_secs(10));
        assert_eq!(session.timer_text(), "00:10");

        session.toggle();
        drive(&mut session, 1);
        assert_eq!(session.countdown().remaining(), Duration::from_secs(9));

        session.reset();
        assert_eq!(session.countdown().remaining(), Duration::from_secs(3));
    }

    #[test]
    fn committing_time_leaves_topic_edit_alone() {
        let (mut session, _) = session(Mode::Cycle);
        assert!(session.begin_topic_edit());
        assert_eq!(session.commit_time_edit(), Feedback::Accepted);
        assert_eq!(session.editing(), Some(&Editing::Topic));
        assert_eq!(session.countdown().remaining(), Duration::from_secs(3));
    }

    #[test]
    fn toggle_cycles_labels() {
        let (mut session, _) = session(Mode::Cycle);
        assert_eq!(session.label(), ToggleLabel::Start);
        assert!(session.toggle());
        assert_eq!(session.label(), ToggleLabel::Pause);
        assert!(session.is_running());
        assert!(session.toggle());
        assert_eq!(session.label(), ToggleLabel::Resume);
        assert!(!session.is_running());
    }

    #[test]
    fn paused_session_keeps_remaining() {
        let (mut session, _) = session(Mode::Cycle);
        session.toggle();
        drive(&mut session, 1);
        session.toggle();
        assert!(drive(&mut session, 5).is_empty());
        assert_eq!(session.countdown().remaining(), Duration::from_secs(2));
        session.toggle();
        drive(&mut session, 1);
        assert_eq!(session.countdown().remaining(), Duration::from_secs(1));
    }

    #[test]
    fn alert_on_grace_and_work_but_not_break() {
        let (mut session, recorder) = session(Mode::Cycle);
        session.toggle();

        until_state(&mut session, TimerState::Grace);
        assert_eq!(recorder.plays.get(), 1);
        assert_eq!(session.headline(), GRACE_HEADLINE);

        until_state(&mut session, TimerState::Break);
        assert_eq!(recorder.plays.get(), 1);
        assert_eq!(session.headline(), BREAK_HEADLINE);

        until_state(&mut session, TimerState::Working);
        assert_eq!(recorder.plays.get(), 2);
        assert_eq!(session.headline(), "Writing");
        assert_eq!(session.countdown().remaining(), Duration::from_secs(3));
        assert!(session.is_running());
    }

    #[test]
    fn toggle_is_disabled_outside_work() {
        let (mut session, _) = session(Mode::Cycle);
        session.toggle();
        until_state(&mut session, TimerState::Grace);
        assert!(!session.toggle());
        assert!(session.is_running());

        until_state(&mut session, TimerState::Break);
        assert!(!session.toggle_enabled());

        until_state(&mut session, TimerState::Working);
        assert!(session.toggle_enabled());
    }

    #[test]
    fn reset_from_break_restores_work() {
        let (mut session, recorder) = session(Mode::Cycle);
        session.toggle();
        until_state(&mut session, TimerState::Break);
        let stops = recorder.stops.get();

        session.reset();
        assert_eq!(session.state(), TimerState::Working);
        assert_eq!(session.countdown().remaining(), Duration::from_secs(3));
        assert_eq!(session.label(), ToggleLabel::Start);
        assert!(!session.is_running());
        assert!(session.toggle_enabled());
        assert_eq!(recorder.stops.get(), stops + 1);
    }

    #[test]
    fn time_edit_applies_valid_entry() {
        let (mut session, _) = session(Mode::Cycle);
        assert!(session.begin_time_edit());
        assert_eq!(session.timer_text(), "00:00:03");
        session.input_time_text("");
        for digit in "13000".chars() {
            session.type_time_digit(digit);
        }
        assert_eq!(session.timer_text(), "01:30:00");
        assert_eq!(session.commit_time_edit(), Feedback::Accepted);
        assert_eq!(session.countdown().remaining(), Duration::from_secs(5400));
        assert_eq!(session.timer_text(), "1:30:00");
    }

    #[test]
    fn rejected_entry_shakes_and_keeps_time() {
        let (mut session, _) = session(Mode::Cycle);
        session.begin_time_edit();
        session.input_time_text("");
        assert_eq!(session.commit_time_edit(), Feedback::Shake(EntryError::Zero));
        assert_eq!(session.countdown().remaining(), Duration::from_secs(3));
        assert_eq!(session.editing(), None);
    }

    #[test]
    fn erasing_shifts_digits_back() {
        let (mut session, _) = session(Mode::Cycle);
        session.begin_time_edit();
        session.erase_time_digit();
        assert_eq!(session.timer_text(), "00:00:00");
    }

    #[test]
    fn time_edit_refused_while_running_or_paused() {
        let (mut session, _) = session(Mode::Cycle);
        session.toggle();
        assert!(!session.begin_time_edit());
        session.toggle();
        assert_eq!(session.label(), ToggleLabel::Resume);
        assert!(!session.begin_time_edit());
        session.reset();
        assert!(session.begin_time_edit());
    }

    #[test]
    fn topic_edits_only_while_working() {
        let (mut session, _) = session(Mode::Cycle);
        assert!(session.begin_topic_edit());
        session.erase_topic_char();
        session.type_topic_char('!');
        assert_eq!(session.topic(), "Writin!");

        session.toggle();
        until_state(&mut session, TimerState::Grace);
        assert_eq!(session.editing(), None);
        assert!(!session.begin_topic_edit());
        assert!(!session.set_topic("Other"));

        until_state(&mut session, TimerState::Working);
        assert_eq!(session.headline(), "Writin!");
        assert!(session.set_topic("Other"));
    }

    #[test]
    fn single_mode_alerts_once_and_stops() {
        let (mut session, recorder) = session(Mode::Single);
        session.toggle();
        let ticks = drive(&mut session, 10);
        let transitions = ticks
            .iter()
            .filter(|t| matches!(t, Tick::Transitioned(_)))
            .count();
        assert_eq!(transitions, 1);
        assert_eq!(recorder.plays.get(), 1);
        assert!(!session.is_running());
        assert!(!session.toggle());
        assert_eq!(session.timer_text(), "00:00");

        session.reset();
        assert!(session.toggle());
    }
}
