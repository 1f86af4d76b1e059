pub const SAMPLE_CAPACITY: usize = 300_000;

/// Fixed-capacity ring of raw channel samples.
///
/// Until the cursor first passes the end, only `samples[..cursor]` holds data.
/// After that the whole buffer is valid and `wrapped` stays set.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<u32>,
    cursor: usize,
    wrapped: bool,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::with_capacity(SAMPLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: vec![0; capacity.max(1)],
            cursor: 0,
            wrapped: false,
        }
    }

    pub fn push(&mut self, sample: u32) {
        self.samples[self.cursor] = sample;
        self.cursor += 1;
        if self.cursor == self.samples.len() {
            self.cursor = 0;
            self.wrapped = true;
        }
    }

    pub fn valid(&self) -> &[u32] {
        if self.wrapped {
            &self.samples
        } else {
            &self.samples[..self.cursor]
        }
    }

    pub fn len(&self) -> usize {
        self.valid().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range_follows_cursor_before_wrap() {
        let mut buffer = SampleBuffer::with_capacity(4);
        buffer.push(7);
        buffer.push(8);
        assert_eq!(buffer.valid(), &[7, 8]);
        assert!(!buffer.is_wrapped());
    }

    #[test]
    fn wrap_keeps_full_history_and_overwrites_oldest() {
        let mut buffer = SampleBuffer::with_capacity(3);
        for sample in 1..=4 {
            buffer.push(sample);
        }
        assert!(buffer.is_wrapped());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.valid(), &[4, 2, 3]);
    }

    #[test]
    fn default_capacity_matches_session_length() {
        let buffer = SampleBuffer::new();
        assert_eq!(buffer.capacity(), SAMPLE_CAPACITY);
        assert!(buffer.is_empty());
    }
}
