use std::sync::OnceLock;

use regex::Regex;

/// Splits an incoming byte stream into carriage-return terminated lines.
///
/// The transcoder redraws a single status line with `\r`; newline is not a
/// record terminator in that protocol, so everything between two carriage
/// returns counts as one line.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    buf: Vec<u8>,
}

impl LineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns the completed line when `byte` terminates one.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte == b'\r' {
            let line = String::from_utf8_lossy(&self.buf).trim().to_owned();
            self.buf.clear();
            return Some(line);
        }
        self.buf.push(byte);
        None
    }

    /// Feed a chunk, invoking `on_line` for each completed line. Chunked and
    /// byte-at-a-time feeds produce identical line boundaries.
    pub fn feed(&mut self, chunk: &[u8], mut on_line: impl FnMut(String)) {
        for &byte in chunk {
            if let Some(line) = self.push(byte) {
                on_line(line);
            }
        }
    }
}

/// Progress knowledge accumulated while one transcode runs: the stream's
/// total duration once announced, and the last percentage reported.
#[derive(Debug, Default)]
pub struct ProgressState {
    total_seconds: Option<u64>,
    last_percent: Option<u64>,
}

/// Scans the transcoder's diagnostic lines for the duration announcement and
/// running position timestamps, and retains every line for failure reports.
#[derive(Debug, Default)]
pub struct DiagnosticParser {
    state: ProgressState,
    transcript: String,
}

impl DiagnosticParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one diagnostic line. Returns the percentage when the line
    /// carries a position timestamp, the total duration is already known,
    /// and the value moved past the last one reported.
    pub fn observe(&mut self, line: &str) -> Option<u64> {
        self.transcript.push_str(line);
        self.transcript.push('\n');

        if self.state.total_seconds.is_none() && line.contains("Duration") {
            if let Some(clock) = capture_duration(line) {
                self.state.total_seconds = clock_to_seconds(clock);
            }
        }

        let current = clock_to_seconds(capture_position(line)?)?;
        let total = self.state.total_seconds?;
        if total == 0 {
            return None;
        }
        // floor(current / total * 100), exact in integer arithmetic.
        let percent = current * 100 / total;
        if self.state.last_percent == Some(percent) {
            return None;
        }
        self.state.last_percent = Some(percent);
        Some(percent)
    }

    pub fn into_transcript(self) -> String {
        self.transcript
    }
}

fn capture_duration(line: &str) -> Option<&str> {
    static DURATION_RE: OnceLock<Regex> = OnceLock::new();
    let re = DURATION_RE.get_or_init(|| {
        Regex::new(r"Duration: (\d+:\d+:\d+\.\d+)").expect("duration regex should compile")
    });
    Some(re.captures(line)?.get(1)?.as_str())
}

fn capture_position(line: &str) -> Option<&str> {
    static POSITION_RE: OnceLock<Regex> = OnceLock::new();
    let re = POSITION_RE.get_or_init(|| {
        Regex::new(r"time=(\d+:\d+:\d+\.\d+)").expect("position regex should compile")
    });
    Some(re.captures(line)?.get(1)?.as_str())
}

/// `HH:MM:SS.fraction` to whole seconds, fraction truncated.
pub fn clock_to_seconds(clock: &str) -> Option<u64> {
    let whole = clock.split('.').next()?;
    let mut parts = whole.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    Some(hours * 3600 + minutes * 60 + seconds)
}
