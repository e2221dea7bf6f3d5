use std::fmt::Write;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressState, ProgressStyle};

/// Normalized view of one stage's forward progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressEvent {
    pub completed: u64,
    pub total: Option<u64>,
    pub rate: Option<f64>,
}

/// Folds raw stage signals (unit ticks, absolute counts, percentages) into
/// normalized events. One counter per stage, fresh at stage start.
pub struct StageCounter {
    started: Instant,
    completed: u64,
    total: Option<u64>,
}

impl StageCounter {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            started: Instant::now(),
            completed: 0,
            total,
        }
    }

    /// One more unit of work done.
    pub fn advance(&mut self) -> ProgressEvent {
        self.set_completed(self.completed + 1)
    }

    /// Absolute completion count, for tools that report it themselves.
    pub fn set_completed(&mut self, completed: u64) -> ProgressEvent {
        self.completed = completed;
        self.event()
    }

    /// Terminal event: a stage closes by reporting its declared total as
    /// completed. With an unknown total the last observed count stands.
    pub fn finish(&mut self) -> ProgressEvent {
        if let Some(total) = self.total {
            self.completed = total;
        }
        self.event()
    }

    fn event(&self) -> ProgressEvent {
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = (self.completed > 0 && elapsed > 0.0)
            .then(|| self.completed as f64 / elapsed);
        ProgressEvent {
            completed: self.completed,
            total: self.total,
            rate,
        }
    }
}

/// Terminal presenter: one bar per stage, degrading to a spinner when the
/// total is unknown.
pub struct StageBar {
    bar: ProgressBar,
}

impl StageBar {
    pub fn new(label: &str, total: Option<u64>) -> Self {
        let bar = match total {
            Some(total) => ProgressBar::new(total).with_style(Self::bar_style()),
            None => ProgressBar::new_spinner().with_style(Self::spinner_style()),
        };
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    pub fn update(&self, event: &ProgressEvent) {
        self.bar.set_position(event.completed);
        if let Some(rate) = event.rate {
            self.bar.set_message(format!("[fps: {:.0}]", rate));
        }
    }

    pub fn finish(self, event: &ProgressEvent) {
        self.bar.set_position(event.completed);
        self.bar.finish();
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:<17} [{elapsed_precise}] [{eta_precise}] [{wide_bar:.white/green}] {pos}/{len} {percent} {msg}")
            .unwrap()
            .progress_chars("█▓▒░-")
            .with_key("percent", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "({:.0}%)", state.fraction() * 100.0).unwrap()
            })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:<17} [{elapsed_precise}] {spinner} {pos} {msg}")
            .unwrap()
    }
}
