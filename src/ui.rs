use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use crate::error::Result;
use crate::scheduler::Ticker;
use crate::session::{Editing, Feedback, Session};
use crate::sound::Alert;
use crate::timer::TimerState;

const MARGIN: u16 = 4;
const IDLE_POLL: Duration = Duration::from_millis(250);

const SHAKE_DURATION: Duration = Duration::from_millis(50);
const SHAKE_COUNT: usize = 3;
const SHAKE_DISTANCE: u16 = 2;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Shake,
    Quit,
}

fn state_color(state: TimerState) -> Color {
    match state {
        TimerState::Working => Color::White,
        TimerState::Grace => Color::Rgb {
            r: 255,
            g: 165,
            b: 0,
        },
        TimerState::Break => Color::Green,
    }
}

/// Maps a key press onto the session.
pub fn handle_key<T: Ticker, A: Alert>(session: &mut Session<T, A>, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    let feedback = match session.editing().cloned() {
        Some(Editing::Time(_)) => match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                session.type_time_digit(c);
                None
            }
            KeyCode::Backspace => {
                session.erase_time_digit();
                None
            }
            KeyCode::Enter | KeyCode::Tab => Some(session.finish_edit()),
            KeyCode::Esc => {
                session.cancel_edit();
                None
            }
            _ => None,
        },
        Some(Editing::Topic) => match key.code {
            KeyCode::Char(c) => {
                session.type_topic_char(c);
                None
            }
            KeyCode::Backspace => {
                session.erase_topic_char();
                None
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Esc => Some(session.finish_edit()),
            _ => None,
        },
        None => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                session.toggle();
                None
            }
            KeyCode::Char('r') => {
                session.reset();
                None
            }
            KeyCode::Char('t') => {
                session.begin_topic_edit();
                None
            }
            KeyCode::Char('e') => {
                session.begin_time_edit();
                None
            }
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            _ => None,
        },
    };

    match feedback {
        Some(Feedback::Shake(_)) => Action::Shake,
        _ => Action::None,
    }
}

fn draw<W, T, A>(out: &mut W, session: &Session<T, A>, column: u16) -> io::Result<()>
where
    W: Write,
    T: Ticker,
    A: Alert,
{
    let editing = session.editing();
    let cursor = |active: bool| if active { "_" } else { "" };

    queue!(
        out,
        Clear(ClearType::All),
        MoveTo(column, 1),
        SetForegroundColor(state_color(session.state())),
        Print(session.headline()),
        Print(cursor(editing == Some(&Editing::Topic))),
        ResetColor,
        MoveTo(column, 3),
        SetAttribute(Attribute::Bold),
        Print(session.timer_text()),
        Print(cursor(matches!(editing, Some(Editing::Time(_))))),
        SetAttribute(Attribute::Reset),
        MoveTo(MARGIN, 5),
    )?;

    if session.toggle_enabled() {
        queue!(out, Print(format!("[space] {}", session.label().as_str())))?;
    } else {
        queue!(
            out,
            SetAttribute(Attribute::Dim),
            Print(format!("[space] {}", session.label().as_str())),
            SetAttribute(Attribute::Reset),
        )?;
    }
    queue!(
        out,
        Print("  [r] Reset  [t] Topic  [e] Edit time  [q] Quit"),
    )?;
    out.flush()
}

/// Jiggles the display left and right to flag rejected input.
fn shake<W, T, A>(out: &mut W, session: &Session<T, A>) -> io::Result<()>
where
    W: Write,
    T: Ticker,
    A: Alert,
{
    let frame = SHAKE_DURATION / 3;
    for _ in 0..SHAKE_COUNT {
        for column in [MARGIN - SHAKE_DISTANCE, MARGIN + SHAKE_DISTANCE, MARGIN] {
            draw(out, session, column)?;
            thread::sleep(frame);
        }
    }
    Ok(())
}

fn event_loop<W, T, A>(out: &mut W, session: &mut Session<T, A>, interrupted: &AtomicBool) -> Result<()>
where
    W: Write,
    T: Ticker,
    A: Alert,
{
    draw(out, session, MARGIN)?;
    loop {
        if interrupted.load(Ordering::SeqCst) {
            log::debug!("interrupted");
            break;
        }

        let wait = session
            .ticker()
            .until_next(Instant::now())
            .map_or(IDLE_POLL, |next| next.min(IDLE_POLL));

        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match handle_key(session, key) {
                        Action::Quit => break,
                        Action::Shake => shake(out, session)?,
                        Action::None => {}
                    }
                }
            }
        }

        session.poll(Instant::now());
        draw(out, session, MARGIN)?;
    }
    session.interrupt();
    Ok(())
}

/// Undoes raw mode and the alternate screen when dropped.
struct TerminalGuard<R: FnMut()> {
    restore: R,
}

impl<R: FnMut()> Drop for TerminalGuard<R> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// The guard exists before the alternate screen is entered, so a failed
/// setup still restores the terminal.
fn take_over<W, F, R>(out: &mut W, raw_mode: F, restore: R) -> io::Result<TerminalGuard<R>>
where
    W: Write,
    F: FnOnce() -> io::Result<()>,
    R: FnMut(),
{
    raw_mode()?;
    let guard = TerminalGuard { restore };
    execute!(out, EnterAlternateScreen, Hide)?;
    Ok(guard)
}

fn restore_terminal() {
    if let Err(e) = execute!(io::stdout(), Show, LeaveAlternateScreen) {
        log::warn!("could not leave alternate screen: {}", e);
    }
    if let Err(e) = terminal::disable_raw_mode() {
        log::warn!("could not disable raw mode: {}", e);
    }
}

/// Takes over the terminal until the user quits or SIGINT arrives.
pub fn run<T: Ticker, A: Alert>(session: &mut Session<T, A>, interrupted: &AtomicBool) -> Result<()> {
    let mut out = io::stdout();
    let _guard = take_over(&mut out, terminal::enable_raw_mode, restore_terminal)?;
    event_loop(&mut out, session, interrupted)
}
