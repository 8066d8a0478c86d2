use std::collections::VecDeque;
use std::sync::Mutex;

/// How many log lines [`BoundedLogBuffer`] retains before evicting the oldest. Chosen to match
/// the coordinator's own `Log`/`GetLog` contract: enough history to diagnose a break, small
/// enough that a long session can't grow it unbounded.
pub const LOG_CAPACITY: usize = 1000;

/// A small FIFO log the coordinator appends diagnostic lines to (config changes, suppressed
/// exceptions, adapter errors) and the UI polls via `GetLog`. Any thread may append; callers
/// never block waiting for a reader.
#[derive(Debug, Default)]
pub struct BoundedLogBuffer {
    lines: Mutex<VecDeque<String>>,
}

impl BoundedLogBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self { lines: Mutex::new(VecDeque::with_capacity(LOG_CAPACITY)) }
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lines.lock().unwrap();
        if lines.len() >= LOG_CAPACITY {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// A snapshot of the current buffer, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().unwrap().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let buffer = BoundedLogBuffer::new();
        for i in 0..LOG_CAPACITY + 10 {
            buffer.push(format!("line {i}"));
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), LOG_CAPACITY);
        assert_eq!(snapshot[0], "line 10");
        assert_eq!(snapshot[LOG_CAPACITY - 1], format!("line {}", LOG_CAPACITY + 9));
    }

    #[test]
    fn clear_empties_buffer() {
        let buffer = BoundedLogBuffer::new();
        buffer.push("hello");
        buffer.clear();
        assert!(buffer.snapshot().is_empty());
    }
}
