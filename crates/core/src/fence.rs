//! Fenced code block tracking.
//!
//! When grouping is enabled, lines between an opening and closing fence are
//! collected so the block renders as one unit. Fence rules follow
//! CommonMark: at most three columns of indentation, a run of at least three
//! backticks or tildes, and a closer of the same marker, at least as long, with
//! nothing but whitespace after it.

/// What a line did to the fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceEvent {
    /// Ordinary line outside any fence.
    Outside,
    /// The line opened a fence.
    Opened,
    /// Content line inside an open fence.
    Inside,
    /// The line closed the open fence.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    length: usize,
}

/// Follows fence open/close across consecutive lines.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    /// Create a tracker outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker of the open fence, if any.
    pub fn open_marker(&self) -> Option<char> {
        self.open.map(|fence| fence.marker)
    }

    /// Advance past `line`.
    pub fn observe(&mut self, line: &str) -> FenceEvent {
        let run = fence_run(line);
        match (self.open, run) {
            (None, Some((marker, length, _))) => {
                self.open = Some(Fence { marker, length });
                FenceEvent::Opened
            }
            (None, None) => FenceEvent::Outside,
            (Some(open), Some((marker, length, rest)))
                if marker == open.marker && length >= open.length && rest.trim().is_empty() =>
            {
                self.open = None;
                FenceEvent::Closed
            }
            (Some(_), _) => FenceEvent::Inside,
        }
    }
}

/// Marker, run length and remainder of a fence line.
fn fence_run(line: &str) -> Option<(char, usize, &str)> {
    let mut columns = 0;
    let mut offset = 0;
    for byte in line.bytes() {
        match byte {
            b' ' => columns += 1,
            b'\t' => columns += 4 - (columns % 4),
            _ => break,
        }
        offset += 1;
    }
    if columns > 3 {
        return None;
    }

    let rest = &line[offset..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = rest.chars().take_while(|c| *c == marker).count();
    if length < 3 {
        return None;
    }
    let after = &rest[length..];
    // Backtick info strings may not contain backticks.
    if marker == '`' && after.contains('`') {
        return None;
    }
    Some((marker, length, after))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_and_closes_backtick_fence() {
        let mut tracker = FenceTracker::new();
        assert_eq!(tracker.observe("```bash"), FenceEvent::Opened);
        assert_eq!(tracker.open_marker(), Some('`'));
        assert_eq!(tracker.observe("-> APPLY not-a-directive.yaml"), FenceEvent::Inside);
        assert_eq!(tracker.observe("```"), FenceEvent::Closed);
        assert_eq!(tracker.open_marker(), None);
        assert_eq!(tracker.observe("after"), FenceEvent::Outside);
    }

    #[test]
    fn closer_needs_same_marker_and_length() {
        let mut tracker = FenceTracker::new();
        tracker.observe("````yaml");
        assert_eq!(tracker.observe("```"), FenceEvent::Inside);
        assert_eq!(tracker.observe("~~~~"), FenceEvent::Inside);
        assert_eq!(tracker.observe("`````"), FenceEvent::Closed);
    }

    #[test]
    fn closer_with_info_string_does_not_close() {
        let mut tracker = FenceTracker::new();
        tracker.observe("~~~");
        assert_eq!(tracker.observe("~~~ sh"), FenceEvent::Inside);
        assert_eq!(tracker.observe("  ~~~  "), FenceEvent::Closed);
    }

    #[test]
    fn indented_code_is_not_a_fence() {
        let mut tracker = FenceTracker::new();
        assert_eq!(tracker.observe("    ```"), FenceEvent::Outside);
        assert_eq!(tracker.observe("\t```"), FenceEvent::Outside);
        assert_eq!(tracker.observe("   ```"), FenceEvent::Opened);
    }

    #[test]
    fn short_runs_and_inline_code_are_not_fences() {
        let mut tracker = FenceTracker::new();
        assert_eq!(tracker.observe("``"), FenceEvent::Outside);
        assert_eq!(tracker.observe("```inline``` code"), FenceEvent::Outside);
    }
}
