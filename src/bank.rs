use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// A single multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub prompt: String,
    pub correct_answer: i64,
    pub options: Vec<i64>,
}

impl Question {
    /// A question is usable if it has at least two options and the correct
    /// answer appears among them exactly once.
    fn validate(&self) -> Result<(), GameError> {
        if self.options.len() < 2 {
            return Err(GameError::EmptyQuestionSet(format!(
                "question '{}' has fewer than 2 options",
                self.prompt
            )));
        }
        let matches = self
            .options
            .iter()
            .filter(|o| **o == self.correct_answer)
            .count();
        if matches != 1 {
            return Err(GameError::EmptyQuestionSet(format!(
                "question '{}' lists its correct answer {} times",
                self.prompt, matches
            )));
        }
        Ok(())
    }
}

/// Holds the question set for one run and deals questions in shuffled order.
/// When the set is exhausted it is reshuffled in place and dealing starts
/// over, so `next()` never runs dry once construction has succeeded.
#[derive(Debug)]
pub struct QuestionBank {
    items: Vec<Question>,
    cursor: usize,
    rng: StdRng,
}

impl QuestionBank {
    /// Build a bank from a non-empty, validated question set.
    pub fn new(items: Vec<Question>) -> Result<Self, GameError> {
        Self::with_rng(items, StdRng::from_os_rng())
    }

    /// Same as [`QuestionBank::new`] with a fixed seed, for deterministic
    /// shuffles in tests.
    pub fn seeded(items: Vec<Question>, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(items, StdRng::seed_from_u64(seed))
    }

    fn with_rng(items: Vec<Question>, mut rng: StdRng) -> Result<Self, GameError> {
        if items.is_empty() {
            return Err(GameError::EmptyQuestionSet(
                "no questions provided".to_string(),
            ));
        }
        for question in &items {
            question.validate()?;
        }
        let mut items = items;
        items.shuffle(&mut rng);
        Ok(Self {
            items,
            cursor: 0,
            rng,
        })
    }

    /// Deal the next question, reshuffling first if the current lap is done.
    pub fn next(&mut self) -> Question {
        if self.cursor >= self.items.len() {
            self.items.shuffle(&mut self.rng);
            self.cursor = 0;
        }
        let question = self.items[self.cursor].clone();
        self.cursor += 1;
        question
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
