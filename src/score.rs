use std::time::Duration;

/// Point values and bonus thresholds. Additive scoring only: wrong answers
/// and timeouts cost health, never points.
#[derive(Debug, Clone)]
pub struct ScoringRules {
    pub base_correct: u32,
    pub rapid_bonus: u32,
    pub rapid_threshold: Duration,
    pub streak_interval: u32,
    pub streak_bonus: u32,
    pub completion_bonus: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base_correct: 10,
            rapid_bonus: 2,
            rapid_threshold: Duration::from_secs(2),
            streak_interval: 3,
            streak_bonus: 5,
            completion_bonus: 10,
        }
    }
}

/// Points earned by a single answer, with the bonus flags that applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerScore {
    pub points: u32,
    pub rapid: bool,
    pub streak: bool,
}

/// Stateless scoring computations over a fixed set of rules.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    rules: ScoringRules,
}

impl ScoreEngine {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    /// Points for a correct answer. `consecutive_correct` is the streak
    /// length counting this answer; every `streak_interval`-th answer in a
    /// streak earns the streak bonus.
    pub fn score_correct(&self, response_time: Duration, consecutive_correct: u32) -> AnswerScore {
        let mut points = self.rules.base_correct;
        let rapid = response_time < self.rules.rapid_threshold;
        if rapid {
            points += self.rules.rapid_bonus;
        }
        let streak = consecutive_correct > 0 && consecutive_correct % self.rules.streak_interval == 0;
        if streak {
            points += self.rules.streak_bonus;
        }
        AnswerScore {
            points,
            rapid,
            streak,
        }
    }

    /// Wrong answers and timeouts score nothing.
    pub fn score_miss(&self) -> AnswerScore {
        AnswerScore::default()
    }

    /// Flat bonus granted once when the boss goes down.
    pub fn completion_bonus(&self) -> u32 {
        self.rules.completion_bonus
    }

    /// Rescale a final score to 0-100 against the best score theoretically
    /// attainable over `questions_presented` questions: every answer correct
    /// and rapid, every streak bonus collected, plus the completion bonus.
    pub fn normalize(&self, score: u32, questions_presented: u32) -> u32 {
        if questions_presented == 0 {
            return 0;
        }
        let max = questions_presented * (self.rules.base_correct + self.rules.rapid_bonus)
            + (questions_presented / self.rules.streak_interval) * self.rules.streak_bonus
            + self.rules.completion_bonus;
        let normalized = (100.0 * f64::from(score) / f64::from(max)).round() as u32;
        normalized.min(100)
    }
}
