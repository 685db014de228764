//! Terminal User Interface (TUI) for gpulive
//!
//! The loop driver: sample, render and show one frame per tick on a full-screen overlay
//! until interrupted. The overlay uses the alternate screen, so the terminal's previous
//! contents come back when it is torn down.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::{StyledContent, Stylize},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::gpu::nvidia::NvmlSubsystem;
use crate::gpu::traits::Subsystem;
use crate::sampler::Sampler;

mod app;
mod frame;
mod ui;

pub use app::App;
pub use frame::{
    render, Clock, DeviceRow, FixedClock, Footer, Frame, LocalClock, Meter, Severity, COLUMNS,
    TIMESTAMP_FORMAT,
};
pub use ui::bar_line;

/// Something that can show a [`Frame`]
pub trait Display {
    /// Replace whatever is on screen with `frame`
    fn show(&mut self, frame: &Frame) -> Result<()>;
}

impl<B: Backend> Display for Terminal<B> {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        // ratatui diffs a complete back buffer, so a frame is never shown half-drawn.
        self.draw(|f| f.render_widget(frame, f.area()))?;
        Ok(())
    }
}

/// Why a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The tick period elapsed
    Tick,
    /// The user asked to stop
    Interrupt,
}

/// Inter-tick wait that an interrupt can cut short
pub trait Interrupts {
    fn wait(&mut self, timeout: Duration) -> Result<Wake>;
}

/// Ctrl+C, `q` or Esc
pub fn is_interrupt_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Esc => true,
        _ => false,
    }
}

/// Interrupts from the terminal and from SIGINT
///
/// In raw mode Ctrl+C arrives as a key event; a SIGINT sent from elsewhere lands in a
/// flag that is checked at least every `poll_slice`.
pub struct CrosstermInterrupts {
    sigint: Arc<AtomicBool>,
    poll_slice: Duration,
}

impl CrosstermInterrupts {
    /// Install the SIGINT handler. Only one may be installed per process.
    pub fn install(poll_slice: Duration) -> Result<Self> {
        let sigint = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&sigint);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
        Ok(Self { sigint, poll_slice })
    }
}

impl Interrupts for CrosstermInterrupts {
    fn wait(&mut self, timeout: Duration) -> Result<Wake> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.sigint.swap(false, Ordering::SeqCst) {
                return Ok(Wake::Interrupt);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Wake::Tick);
            }

            if event::poll(remaining.min(self.poll_slice))? {
                if let Event::Key(key) = event::read()? {
                    if is_interrupt_key(&key) {
                        return Ok(Wake::Interrupt);
                    }
                }
            }
        }
    }
}

/// Full-screen transient overlay on stdout
///
/// Restores the terminal once, either through [`Overlay::restore`] or on drop.
pub struct Overlay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl Overlay {
    /// Switch to the alternate screen in raw mode with the cursor hidden
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            let _ = leave_screen(&mut io::stdout());
            return Err(e.into());
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self {
                terminal,
                active: true,
            }),
            Err(e) => {
                let _ = leave_screen(&mut io::stdout());
                Err(e.into())
            }
        }
    }

    /// Leave the alternate screen and give the terminal back; later calls do nothing
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        leave_screen(self.terminal.backend_mut())?;
        Ok(())
    }
}

fn leave_screen<W: io::Write>(out: &mut W) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(out, LeaveAlternateScreen, cursor::Show);
    raw.and(screen)
}

impl Display for Overlay {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        self.terminal.show(frame)
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Show `first`, then one fresh frame per tick until interrupted.
///
/// Subsystem outages arrive as error frames and keep the loop going. Display failures
/// end it with an error.
pub fn run_loop<S, C, D, I>(
    app: &App<S, C>,
    first: Frame,
    display: &mut D,
    interrupts: &mut I,
) -> Result<()>
where
    S: Subsystem,
    C: Clock,
    D: Display,
    I: Interrupts,
{
    display.show(&first)?;
    log::info!("Dashboard running, refreshing every {:?}", app.tick_rate());

    loop {
        match interrupts.wait(app.tick_rate())? {
            Wake::Interrupt => {
                log::info!("Interrupt received, stopping dashboard");
                return Ok(());
            }
            Wake::Tick => display.show(&app.next_frame())?,
        }
    }
}

/// Printed once the terminal has been given back
pub fn stopped_message() -> StyledContent<&'static str> {
    "GPU monitor stopped.".green().bold()
}

/// Run the NVML dashboard until interrupted
pub fn run() -> Result<()> {
    let config = DashboardConfig::default();
    let app = App::new(Sampler::new(NvmlSubsystem::new()), LocalClock, config);
    let mut interrupts = CrosstermInterrupts::install(config.poll_slice)?;

    let first = app.next_frame();
    let mut overlay = Overlay::enter()?;
    let result = run_loop(&app, first, &mut overlay, &mut interrupts);
    let restored = overlay.restore();

    result.and(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gpu::fake::{FakeDevice, FakeSubsystem};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct RecordingDisplay {
        frames: Vec<Frame>,
        fail_after: Option<usize>,
    }

    impl Display for RecordingDisplay {
        fn show(&mut self, frame: &Frame) -> Result<()> {
            if self.fail_after == Some(self.frames.len()) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed").into());
            }
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    /// Plays back a script of wakes, then interrupts
    struct ScriptedInterrupts {
        script: VecDeque<Wake>,
        waits: Vec<Duration>,
    }

    impl ScriptedInterrupts {
        fn ticks(n: usize) -> Self {
            Self {
                script: std::iter::repeat(Wake::Tick).take(n).collect(),
                waits: Vec::new(),
            }
        }
    }

    impl Interrupts for ScriptedInterrupts {
        fn wait(&mut self, timeout: Duration) -> Result<Wake> {
            self.waits.push(timeout);
            Ok(self.script.pop_front().unwrap_or(Wake::Interrupt))
        }
    }

    fn app(fake: &FakeSubsystem) -> App<FakeSubsystem, FixedClock> {
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 16)
                .and_then(|d| d.and_hms_opt(8, 30, 0))
                .unwrap(),
        );
        App::new(
            Sampler::new(fake.clone()),
            clock,
            DashboardConfig::default(),
        )
    }

    #[test]
    fn test_one_frame_per_tick_until_interrupt() {
        let fake = FakeSubsystem::new(vec![FakeDevice::new("GPU 0")]);
        let app = app(&fake);
        let mut display = RecordingDisplay::default();
        let mut interrupts = ScriptedInterrupts::ticks(3);

        let first = app.next_frame();
        run_loop(&app, first, &mut display, &mut interrupts).unwrap();

        assert_eq!(display.frames.len(), 4);
        assert_eq!(fake.opens(), 4);
        assert_eq!(fake.live_sessions(), 0);
        assert_eq!(interrupts.waits.len(), 4);
        assert!(interrupts
            .waits
            .iter()
            .all(|w| *w == Duration::from_secs(1)));
    }

    #[test]
    fn test_interrupt_before_first_tick() {
        let fake = FakeSubsystem::new(Vec::new());
        let app = app(&fake);
        let mut display = RecordingDisplay::default();

        let first = app.next_frame();
        run_loop(&app, first, &mut display, &mut ScriptedInterrupts::ticks(0)).unwrap();

        assert_eq!(display.frames.len(), 1);
        assert_eq!(fake.opens(), 1);
    }

    #[test]
    fn test_outage_keeps_loop_alive_and_recovers() {
        let fake = FakeSubsystem::new(vec![FakeDevice::new("GPU 0")])
            .fail_next_opens(["Driver not loaded", "Driver not loaded"]);
        let app = app(&fake);
        let mut display = RecordingDisplay::default();

        let first = app.next_frame();
        run_loop(&app, first, &mut display, &mut ScriptedInterrupts::ticks(2)).unwrap();

        let error = Frame::Error {
            message: "Driver not loaded".to_string(),
        };
        assert_eq!(display.frames[0], error);
        assert_eq!(display.frames[1], error);
        assert_eq!(display.frames[2].rows().len(), 1);
    }

    #[test]
    fn test_outage_mid_run() {
        let fake = FakeSubsystem::new(vec![FakeDevice::new("GPU 0")]);
        let app = app(&fake);
        let mut display = RecordingDisplay::default();

        let first = app.next_frame();
        fake.set_outage(Some("GPU is lost".to_string()));
        run_loop(&app, first, &mut display, &mut ScriptedInterrupts::ticks(1)).unwrap();

        assert_eq!(display.frames[0].rows().len(), 1);
        assert!(matches!(display.frames[1], Frame::Error { .. }));
    }

    #[test]
    fn test_display_failure_is_fatal() {
        let fake = FakeSubsystem::new(vec![FakeDevice::new("GPU 0")]);
        let app = app(&fake);
        let mut display = RecordingDisplay {
            fail_after: Some(2),
            ..Default::default()
        };
        let mut interrupts = ScriptedInterrupts::ticks(10);

        let first = app.next_frame();
        let result = run_loop(&app, first, &mut display, &mut interrupts);

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(display.frames.len(), 2);
        assert_eq!(interrupts.waits.len(), 2);
    }

    #[test]
    fn test_terminal_display() {
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        let frame = Frame::Error {
            message: "Driver not loaded".to_string(),
        };
        terminal.show(&frame).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Driver not loaded"));
    }

    #[test]
    fn test_raised_sigint_cuts_wait_short() {
        let mut interrupts = CrosstermInterrupts {
            sigint: Arc::new(AtomicBool::new(true)),
            poll_slice: Duration::from_millis(100),
        };

        let started = Instant::now();
        assert_eq!(
            interrupts.wait(Duration::from_secs(5)).unwrap(),
            Wake::Interrupt
        );
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!interrupts.sigint.load(Ordering::SeqCst));

        // Flag was consumed; a zero wait returns before touching the terminal
        assert_eq!(interrupts.wait(Duration::ZERO).unwrap(), Wake::Tick);
    }

    #[test]
    fn test_stopped_message() {
        use crossterm::style::{Attribute, Color};

        let message = stopped_message();
        assert_eq!(*message.content(), "GPU monitor stopped.");
        assert_eq!(message.style().foreground_color, Some(Color::Green));
        assert!(message.style().attributes.has(Attribute::Bold));
    }

    #[test]
    fn test_interrupt_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(is_interrupt_key(&ctrl_c));
        assert!(is_interrupt_key(&KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE
        )));
        assert!(is_interrupt_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!is_interrupt_key(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
        assert!(!is_interrupt_key(&KeyEvent::new(
            KeyCode::Up,
            KeyModifiers::NONE
        )));
    }
}
