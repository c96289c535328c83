use crate::models::{Difficulty, Question};

/// Read-only question bank.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Questions matching both `category` and `difficulty`, in bank order,
    /// truncated to the difficulty's tier cap.
    pub fn select_questions(&self, category: &str, difficulty: Difficulty) -> Vec<Question> {
        self.matching(category, difficulty)
            .take(difficulty.question_cap())
            .cloned()
            .collect()
    }

    /// How many questions `select_questions` would return.
    pub fn count(&self, category: &str, difficulty: Difficulty) -> usize {
        self.matching(category, difficulty)
            .take(difficulty.question_cap())
            .count()
    }

    /// Distinct categories in the order they first appear.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for question in &self.questions {
            if !categories.contains(&question.category) {
                categories.push(question.category.clone());
            }
        }
        categories
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn matching<'a>(
        &'a self,
        category: &'a str,
        difficulty: Difficulty,
    ) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions
            .iter()
            .filter(move |q| q.category == category && q.difficulty == difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Answer;

    fn question(category: &str, difficulty: Difficulty, prompt: &str) -> Question {
        Question {
            category: category.to_string(),
            difficulty,
            prompt: prompt.to_string(),
            answers: vec![Answer::new("yes", true), Answer::new("no", false)],
            explanation: None,
        }
    }

    fn bank_with(category: &str, difficulty: Difficulty, n: usize) -> QuestionBank {
        QuestionBank::new(
            (0..n)
                .map(|i| question(category, difficulty, &format!("q{}", i)))
                .collect(),
        )
    }

    #[test]
    fn test_tier_caps() {
        for (difficulty, cap) in [
            (Difficulty::Beginner, 10),
            (Difficulty::Intermediate, 7),
            (Difficulty::Advanced, 5),
        ] {
            let bank = bank_with("rust", difficulty, 12);
            let selected = bank.select_questions("rust", difficulty);
            assert_eq!(selected.len(), cap);
            assert_eq!(bank.count("rust", difficulty), cap);
            // Truncation keeps bank order.
            assert_eq!(selected[0].prompt, "q0");
            assert_eq!(selected[cap - 1].prompt, format!("q{}", cap - 1));
        }
    }

    #[test]
    fn test_returns_all_when_under_cap() {
        let bank = QuestionBank::new(vec![
            question("javascript", Difficulty::Beginner, "a"),
            question("javascript", Difficulty::Advanced, "b"),
            question("css", Difficulty::Beginner, "c"),
            question("javascript", Difficulty::Beginner, "d"),
        ]);

        let selected = bank.select_questions("javascript", Difficulty::Beginner);
        let prompts: Vec<_> = selected.iter().map(|q| q.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["a", "d"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let bank = bank_with("html", Difficulty::Beginner, 3);
        assert!(bank.select_questions("html", Difficulty::Advanced).is_empty());
        assert!(bank.select_questions("HTML", Difficulty::Beginner).is_empty());
        assert!(QuestionBank::default().select_questions("html", Difficulty::Beginner).is_empty());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let bank = QuestionBank::new(vec![
            question("react", Difficulty::Beginner, "a"),
            question("css", Difficulty::Beginner, "b"),
            question("react", Difficulty::Advanced, "c"),
        ]);
        assert_eq!(bank.categories(), vec!["react", "css"]);
        assert_eq!(bank.len(), 3);
    }
}
