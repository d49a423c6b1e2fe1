// src/progress.rs
/// Lightweight progress reporting used by long-running operations (scrape, upload, notify).
/// Frontends implement this to surface status to users; the structured log gets
/// its own copy through `tracing`.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One logical unit completed (e.g. an area was scraped).
    fn item_done(&mut self, _name: &str, _detail: &str) {}

    fn item_failed(&mut self, _name: &str, _error: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Timestamped lines on stdout: `[07:00:12] Scraping...`
#[derive(Default)]
pub struct ConsoleProgress {
    total: usize,
    done: usize,
}

impl ConsoleProgress {
    fn line(&self, msg: &str) {
        println!("[{}] {msg}", chrono::Local::now().format("%H:%M:%S"));
    }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }

    fn log(&mut self, msg: &str) {
        self.line(msg);
    }

    fn item_done(&mut self, name: &str, detail: &str) {
        self.done += 1;
        self.line(&format!("  ({}/{}) {name}: {detail}", self.done, self.total));
    }

    fn item_failed(&mut self, name: &str, error: &str) {
        self.done += 1;
        self.line(&format!("  ({}/{}) {name} FAILED: {error}", self.done, self.total));
    }
}

/// Records everything; handy in tests.
#[derive(Default, Debug)]
pub struct RecordingProgress {
    pub lines: Vec<String>,
    pub done: Vec<String>,
    pub failed: Vec<String>,
    pub finished: bool,
}

impl Progress for RecordingProgress {
    fn log(&mut self, msg: &str) {
        self.lines.push(msg.to_string());
    }
    fn item_done(&mut self, name: &str, _detail: &str) {
        self.done.push(name.to_string());
    }
    fn item_failed(&mut self, name: &str, _error: &str) {
        self.failed.push(name.to_string());
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}
