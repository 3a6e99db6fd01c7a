use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Shell commands run when the timer enters or leaves a state.
///
/// A command starting with `#` is kept in the file but not run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Hooks {
    pub work_start: Option<String>,
    pub work_end: Option<String>,
    pub grace_start: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum HookOutcome {
    Spawned,
    NotConfigured,
    Empty,
    CommentedOut,
    Failed,
}

impl Hooks {
    /// Commented-out examples written to a fresh config file.
    pub fn examples() -> Self {
        Self {
            work_start: Some("# afplay ~/music/focus.mp3 &".to_string()),
            work_end: Some("# pkill afplay".to_string()),
            grace_start: None,
            break_start: Some("# afplay ~/music/break.mp3 &".to_string()),
            break_end: Some("# pkill afplay".to_string()),
        }
    }

    pub fn enter_command(&self, state: TimerState) -> Option<&str> {
        match state {
            TimerState::Working => self.work_start.as_deref(),
            TimerState::Grace => self.grace_start.as_deref(),
            TimerState::Break => self.break_start.as_deref(),
        }
    }

    pub fn leave_command(&self, state: TimerState) -> Option<&str> {
        match state {
            TimerState::Working => self.work_end.as_deref(),
            TimerState::Grace => None,
            TimerState::Break => self.break_end.as_deref(),
        }
    }
}

/// Runs hooks without waiting on them and reaps the ones that have exited.
#[derive(Debug, Default)]
pub struct HookRunner {
    hooks: Hooks,
    running: Vec<Child>,
}

impl HookRunner {
    pub fn new(hooks: Hooks) -> Self {
        Self {
            hooks,
            running: Vec::new(),
        }
    }

    pub fn on_enter(&mut self, state: TimerState) -> HookOutcome {
        let command = self.hooks.enter_command(state).map(str::to_string);
        self.execute(command.as_deref())
    }

    pub fn on_leave(&mut self, state: TimerState) -> HookOutcome {
        let command = self.hooks.leave_command(state).map(str::to_string);
        self.execute(command.as_deref())
    }

    /// Drops children that have finished. Called before every spawn.
    pub fn reap(&mut self) {
        self.running
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }

    pub fn running(&self) -> usize {
        self.running.len()
    }

    fn execute(&mut self, hook: Option<&str>) -> HookOutcome {
        self.reap();

        let Some(command) = hook else {
            return HookOutcome::NotConfigured;
        };
        let command = command.trim();
        if command.starts_with('#') {
            log::debug!("hook is commented out: {}", command);
            return HookOutcome::CommentedOut;
        }
        if command.is_empty() {
            return HookOutcome::Empty;
        }

        match Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                log::debug!("hook spawned: {}", command);
                self.running.push(child);
                HookOutcome::Spawned
            }
            Err(e) => {
                log::warn!("hook failed to start ({}): {}", command, e);
                HookOutcome::Failed
            }
        }
    }
}
