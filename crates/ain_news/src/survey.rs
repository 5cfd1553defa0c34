use ain_core::{ClassifiedNewsItem, Impact, SurveyNewsSnapshot, SurveyResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub item_id: u32,
    pub correct: bool,
    pub expected: Impact,
    pub finished: bool,
}

/// One pass of the "positive or negative?" game over a classified batch.
#[derive(Debug, Clone)]
pub struct SurveySession {
    items: Vec<ClassifiedNewsItem>,
    position: usize,
    score: u32,
    choices: BTreeMap<u32, Impact>,
    started_at: DateTime<Utc>,
}

impl SurveySession {
    pub fn new(items: Vec<ClassifiedNewsItem>, started_at: DateTime<Utc>) -> Self {
        Self {
            items,
            position: 0,
            score: 0,
            choices: BTreeMap::new(),
            started_at,
        }
    }

    pub fn current(&self) -> Option<&ClassifiedNewsItem> {
        self.items.get(self.position)
    }

    /// 1-based position of the current question.
    pub fn question_number(&self) -> usize {
        self.position + 1
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.items.len()
    }

    /// Record `choice` for the current item. `None` once every item is answered.
    pub fn answer(&mut self, choice: Impact) -> Option<AnswerOutcome> {
        let item = self.items.get(self.position)?;
        let correct = choice == item.impact;
        if correct {
            self.score += 1;
        }
        self.choices.insert(item.id, choice);
        let outcome = AnswerOutcome {
            item_id: item.id,
            correct,
            expected: item.impact,
            finished: self.position + 1 >= self.items.len(),
        };
        self.position += 1;
        Some(outcome)
    }

    pub fn finish(self, now: DateTime<Utc>) -> SurveyResult {
        let total = self.items.len() as u32;
        let elapsed = (now - self.started_at).num_seconds().max(0);
        SurveyResult {
            date: now,
            score: self.score.min(total),
            total_questions: total,
            user_choices: self.choices,
            news_data: self.items.iter().map(SurveyNewsSnapshot::from).collect(),
            time_spent_minutes: Some(((elapsed + 30) / 60) as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(id: u32, impact: Impact) -> ClassifiedNewsItem {
        ClassifiedNewsItem {
            id,
            title: format!("Story {}", id),
            description: "text".into(),
            impact,
            category: "General".into(),
            accuracy: 80,
            sources: 5,
        }
    }

    #[test]
    fn scores_matching_answers() {
        let start = Utc::now();
        let mut session = SurveySession::new(
            vec![item(1, Impact::Positive), item(2, Impact::Negative), item(3, Impact::Negative)],
            start,
        );
        assert_eq!(session.current().map(|i| i.id), Some(1));

        let first = session.answer(Impact::Positive).unwrap();
        assert!(first.correct && !first.finished);
        let second = session.answer(Impact::Positive).unwrap();
        assert!(!second.correct);
        assert_eq!(second.expected, Impact::Negative);
        let third = session.answer(Impact::Negative).unwrap();
        assert!(third.finished);
        assert!(session.is_finished());
        assert!(session.answer(Impact::Positive).is_none());

        let result = session.finish(start + Duration::seconds(150));
        assert_eq!(result.score, 2);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.user_choices.get(&2), Some(&Impact::Positive));
        assert_eq!(result.news_data.len(), 3);
        assert_eq!(result.time_spent_minutes, Some(3));
    }

    #[test]
    fn empty_batch_finishes_immediately() {
        let session = SurveySession::new(vec![], Utc::now());
        assert!(session.is_finished());
        assert!(session.current().is_none());
        let result = session.finish(Utc::now());
        assert_eq!(result.score, 0);
        assert_eq!(result.total_questions, 0);
    }
}
