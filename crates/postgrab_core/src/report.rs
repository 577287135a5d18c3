use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostResultKind {
    Saved,
    Skipped,
    Failed,
}

/// Tally of per-post results for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record(&mut self, kind: PostResultKind) {
        match kind {
            PostResultKind::Saved => self.saved += 1,
            PostResultKind::Skipped => self.skipped += 1,
            PostResultKind::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.failed
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} posts: {} saved, {} skipped, {} failed",
            self.total(),
            self.saved,
            self.skipped,
            self.failed
        )
    }
}
