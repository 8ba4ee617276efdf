//! Buffering and flush control for incoming transcript fragments.

/// Default character threshold used by callers that do not configure one.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 50;

/// Accumulates transcript fragments and decides when enough material has
/// arrived to justify a completion call.
///
/// Synchronous bookkeeping only; the caller is responsible for making the
/// accumulate-and-reset step atomic relative to other submissions on the
/// same session.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    buffer: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment (space-joined) and, when the buffer has reached
    /// the threshold, returns the full contents as a flush payload and
    /// resets the buffer.
    pub fn accumulate(&mut self, fragment: &str, threshold: usize) -> Option<String> {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(fragment);

        if self.buffer.len() >= threshold {
            return Some(std::mem::take(&mut self.buffer));
        }
        None
    }

    /// Drains any non-whitespace remainder as one final flush payload,
    /// even if under threshold. Called at finalize time.
    pub fn flush_remainder(&mut self) -> Option<String> {
        if self.buffer.trim().is_empty() {
            self.buffer.clear();
            return None;
        }
        Some(std::mem::take(&mut self.buffer))
    }

    /// Current buffered length in characters.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flushes_exactly_once_at_threshold() {
        let mut buffer = TranscriptBuffer::new();
        let mut flushes = Vec::new();

        // Six 10-char fragments against threshold 50: space joining makes
        // the cumulative length cross 50 on the 5th fragment.
        for i in 0..6u8 {
            let fragment = format!("fragment{i}x");
            assert_eq!(fragment.len(), 10);
            if let Some(payload) = buffer.accumulate(&fragment, 50) {
                flushes.push((i, payload));
            }
        }

        assert_eq!(flushes.len(), 1);
        let (at, payload) = &flushes[0];
        assert_eq!(*at, 4, "flush should occur on the 5th fragment");
        assert!(payload.starts_with("fragment0x"));
        assert!(payload.ends_with("fragment4x"));
        // The 6th fragment started a fresh buffer.
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn remainder_flush_ignores_whitespace() {
        let mut buffer = TranscriptBuffer::new();
        buffer.accumulate("   ", 1000);
        assert_eq!(buffer.flush_remainder(), None);
        assert!(buffer.is_empty());

        buffer.accumulate("closing remarks", 1000);
        assert_eq!(buffer.flush_remainder().as_deref(), Some("closing remarks"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn remainder_flush_is_empty_after_flush() {
        let mut buffer = TranscriptBuffer::new();
        buffer.accumulate("0123456789", 10).unwrap();
        assert_eq!(buffer.flush_remainder(), None);
    }
}
