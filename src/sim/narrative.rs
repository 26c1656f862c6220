/// Rolling narrative log. Every line is kept; only the newest
/// `visible` lines are shown, older ones are scrolled off.

pub const VISIBLE_LINES: usize = 6;

#[derive(Clone, Debug)]
pub struct NarrativeLog {
    lines: Vec<String>,
    visible: usize,
}

impl NarrativeLog {
    pub fn new(visible: usize) -> Self {
        NarrativeLog { lines: Vec::new(), visible: visible.max(1) }
    }

    /// Append text; embedded newlines become separate lines.
    pub fn push(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines_skipped(&self) -> usize {
        self.lines.len().saturating_sub(self.visible)
    }

    pub fn visible_lines(&self) -> &[String] {
        &self.lines[self.lines_skipped()..]
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

impl Default for NarrativeLog {
    fn default() -> Self {
        NarrativeLog::new(VISIBLE_LINES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolls_after_six_lines() {
        let mut log = NarrativeLog::default();
        for i in 0..9 {
            log.push(&format!("line {i}"));
        }
        assert_eq!(log.len(), 9);
        assert_eq!(log.lines_skipped(), 3);
        assert_eq!(log.visible_lines().len(), 6);
        assert_eq!(log.visible_lines()[0], "line 3");
        assert_eq!(log.last(), Some("line 8"));
    }

    #[test]
    fn short_log_shows_everything() {
        let mut log = NarrativeLog::default();
        log.push("North");
        assert_eq!(log.lines_skipped(), 0);
        assert_eq!(log.visible_lines(), ["North".to_string()]);
    }

    #[test]
    fn multiline_push_splits() {
        let mut log = NarrativeLog::new(2);
        log.push("a\nb\nc");
        assert_eq!(log.len(), 3);
        assert_eq!(log.visible_lines(), ["b".to_string(), "c".to_string()]);
    }
}
