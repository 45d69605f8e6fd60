//! Terminal progress bar driven by job progress callbacks.
//!
//! # Examples
//!
//! ```
//! use pdfsplice::Progress;
//! use pdfsplice::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut bar = ProgressBar::new(3, ProgressStyle::Bar);
//! bar.set_message("Splitting");
//! for done in 1..=3 {
//!     bar.observe(Progress::new(done, 3));
//! }
//! bar.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::Progress;

const BAR_WIDTH: usize = 30;

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Classic progress bar: [=====>    ]
    Bar,
    /// Simple counter: 42/100
    Counter,
}

/// Progress bar for visual feedback during operations.
///
/// Draws to stderr and only when stderr is a terminal.
#[derive(Debug)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    last_draw: Option<Instant>,
    /// Minimum time between redraws.
    update_interval: Duration,
    enabled: bool,
}

impl ProgressBar {
    /// Create a progress bar for `total` units of work.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_draw: None,
            update_interval: Duration::from_millis(100),
            enabled: io::stderr().is_terminal(),
        }
    }

    /// Create a progress bar that never draws.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0, ProgressStyle::Counter)
        }
    }

    /// Set the label shown before the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Record a progress report from a split or merge job.
    pub fn observe(&mut self, progress: Progress) {
        self.total = progress.total;
        self.update(progress.current);
    }

    /// Move to `current` and redraw if the update interval has passed.
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let due = self
            .last_draw
            .is_none_or(|last| now.duration_since(last) >= self.update_interval);
        if due || self.current == self.total {
            self.draw();
            self.last_draw = Some(now);
        }
    }

    /// Mark the work complete and end the line.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.draw();
            eprintln!();
        }
    }

    /// Erase the bar from the terminal.
    pub fn clear(&self) {
        if self.enabled {
            eprint!("\r\x1b[K");
            let _ = io::stderr().flush();
        }
    }

    fn draw(&self) {
        eprint!("\r\x1b[K{}", self.render());
        let _ = io::stderr().flush();
    }

    /// Render the current state as a single line.
    pub fn render(&self) -> String {
        let body = match self.style {
            ProgressStyle::Bar => self.render_bar(),
            ProgressStyle::Counter => format!("{}/{}", self.current, self.total),
        };
        match &self.message {
            Some(message) => format!("{message} {body}"),
            None => body,
        }
    }

    fn render_bar(&self) -> String {
        let filled = if self.total == 0 {
            BAR_WIDTH
        } else {
            self.current * BAR_WIDTH / self.total
        };
        let mut bar = "=".repeat(filled);
        if filled < BAR_WIDTH {
            bar.push('>');
            bar.push_str(&" ".repeat(BAR_WIDTH - filled - 1));
        }
        format!(
            "[{bar}] {}/{} ({:.0}%) {}",
            self.current,
            self.total,
            self.percent(),
            format_duration(self.start_time.elapsed())
        )
    }

    /// Completion percentage; an empty job counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.current as f64 * 100.0 / self.total as f64
        }
    }

    /// Time since the bar was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Format a duration as `1.2s`, `3m 04s`, or `1h 02m`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    }
}
