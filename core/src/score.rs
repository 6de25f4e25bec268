use serde::{Deserialize, Serialize};

/// Current game score and the best score seen in this storage scope.
///
/// `best` never decreases; `current` goes back to zero on a new game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub current: u32,
    pub best: u32,
}

impl Scores {
    /// Scores for a game that has just started, carrying over `best`.
    pub fn with_best(best: u32) -> Self {
        Scores { current: 0, best }
    }

    /// Credit the value produced by a merge.
    pub fn add(&mut self, points: u32) {
        self.current = self.current.saturating_add(points);
        self.best = self.best.max(self.current);
    }

    pub fn reset_current(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_raises_best() {
        let mut scores = Scores::default();
        scores.add(4);
        scores.add(8);
        assert_eq!((scores.current, scores.best), (12, 12));
    }

    #[test]
    fn test_best_survives_reset() {
        let mut scores = Scores::default();
        scores.add(100);
        scores.reset_current();
        scores.add(16);
        assert_eq!((scores.current, scores.best), (16, 100));
    }

    #[test]
    fn test_with_best() {
        let scores = Scores::with_best(64);
        assert_eq!((scores.current, scores.best), (0, 64));
    }
}
