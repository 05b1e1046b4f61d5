//! The built-in arithmetic question set, used when no remote question
//! source is configured and as fixture data in tests.

use crate::bank::Question;

fn question(prompt: &str, correct_answer: i64, options: [i64; 4]) -> Question {
    Question {
        prompt: prompt.to_string(),
        correct_answer,
        options: options.to_vec(),
    }
}

pub fn arithmetic_questions() -> Vec<Question> {
    vec![
        question("What is 7 + 5?", 12, [10, 12, 15, 11]),
        question("What does 10 + 3 come to?", 13, [11, 12, 13, 14]),
        question("If you have 4 + 3 apples, how many is that?", 7, [5, 6, 7, 8]),
        question("Add: 8 + 6", 14, [12, 13, 14, 15]),
        question("What is 9 + 9?", 18, [16, 17, 18, 19]),
        question("Work out: 15 + 5", 20, [18, 19, 20, 21]),
        question("You have 12 and get 4 more. How many now?", 16, [14, 15, 16, 17]),
        question("Result of 11 + 7", 18, [17, 18, 19, 20]),
        question("Add the numbers 13 and 6", 19, [18, 19, 20, 21]),
        question("What is 20 + 10?", 30, [25, 28, 30, 32]),
        question("1 + 1", 2, [1, 2, 3, 4]),
        question("5 + 2", 7, [6, 7, 8, 9]),
        question("4 + 4", 8, [6, 7, 8, 9]),
        question("10 + 10", 20, [18, 19, 20, 21]),
        question("15 + 15", 30, [25, 28, 30, 35]),
    ]
}
