// src/services/aggregation.rs

use std::collections::HashMap;
use std::fmt;

use crate::{
    models::{
        answer::StoredAnswer,
        submission::{PlayerAnswer, PlayerResult, PlayerSubmission},
    },
    services::grading::AnswerScorer,
};

/// Identity an answer is grouped under.
///
/// Rendered as the participant id, `u<userId>`, or `guest`. Every answer
/// carrying neither id lands in the single `guest` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerKey {
    Participant(i64),
    User(i64),
    Guest,
}

impl PlayerKey {
    pub fn of(answer: &StoredAnswer) -> Self {
        match (answer.participant_id, answer.user_id) {
            (Some(id), _) => PlayerKey::Participant(id),
            (None, Some(id)) => PlayerKey::User(id),
            (None, None) => PlayerKey::Guest,
        }
    }

    /// Inverse of `Display`. Unrecognised ids map to `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == "guest" {
            return Some(PlayerKey::Guest);
        }
        if let Some(rest) = raw.strip_prefix('u') {
            return rest.parse().ok().map(PlayerKey::User);
        }
        raw.parse().ok().map(PlayerKey::Participant)
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKey::Participant(id) => write!(f, "{}", id),
            PlayerKey::User(id) => write!(f, "u{}", id),
            PlayerKey::Guest => write!(f, "guest"),
        }
    }
}

/// Groups stored answers into one submission per player.
///
/// Players appear in the order their first answer was seen; answers keep input order.
pub fn group_submissions(answers: &[StoredAnswer]) -> Vec<PlayerSubmission> {
    let mut index: HashMap<PlayerKey, usize> = HashMap::new();
    let mut submissions: Vec<PlayerSubmission> = Vec::new();

    for answer in answers {
        let key = PlayerKey::of(answer);

        let slot = *index.entry(key).or_insert_with(|| {
            let player_id = key.to_string();
            submissions.push(PlayerSubmission {
                player_name: answer.player_name.clone().unwrap_or_else(|| player_id.clone()),
                player_id,
                answers: Vec::new(),
            });
            submissions.len() - 1
        });

        submissions[slot].answers.push(PlayerAnswer {
            question_id: Some(answer.question_id),
            reference_answer: answer.reference_answer.clone(),
            answer: answer.answer_text.clone(),
        });
    }

    submissions
}

/// Grades every answer and ranks players by mean score, highest first.
///
/// The sort is stable, so players with equal means keep their submission order.
pub async fn score_submissions<S>(scorer: &S, submissions: Vec<PlayerSubmission>) -> Vec<PlayerResult>
where
    S: AnswerScorer + ?Sized,
{
    let mut results = Vec::with_capacity(submissions.len());

    for submission in submissions {
        let mut total = 0.0;

        for answer in &submission.answers {
            let reference = answer.reference_answer.as_deref().unwrap_or_default();
            let candidate = answer.answer.as_deref().unwrap_or_default();
            total += f64::from(scorer.score(reference, candidate).await);
        }

        let count = submission.answers.len();
        let average_score = if count == 0 { 0.0 } else { total / count as f64 };

        results.push(PlayerResult {
            player_id: submission.player_id,
            player_name: submission.player_name,
            questions_count: count,
            average_score,
        });
    }

    results.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::grading::HeuristicScorer;

    fn stored(
        id: i64,
        participant_id: Option<i64>,
        user_id: Option<i64>,
        reference: &str,
        answer: &str,
    ) -> StoredAnswer {
        StoredAnswer {
            id,
            question_id: id,
            participant_id,
            user_id,
            answer_text: Some(answer.to_string()),
            reference_answer: Some(reference.to_string()),
            player_name: None,
        }
    }

    #[test]
    fn test_player_key_round_trip_forms() {
        assert_eq!(PlayerKey::Participant(7).to_string(), "7");
        assert_eq!(PlayerKey::User(3).to_string(), "u3");
        assert_eq!(PlayerKey::Guest.to_string(), "guest");

        assert_eq!(PlayerKey::parse("7"), Some(PlayerKey::Participant(7)));
        assert_eq!(PlayerKey::parse("u3"), Some(PlayerKey::User(3)));
        assert_eq!(PlayerKey::parse("guest"), Some(PlayerKey::Guest));
        assert_eq!(PlayerKey::parse("user-3"), None);
        assert_eq!(PlayerKey::parse("alice"), None);
    }

    #[test]
    fn test_participant_takes_precedence_over_user() {
        let answer = stored(1, Some(10), Some(20), "a", "a");
        assert_eq!(PlayerKey::of(&answer), PlayerKey::Participant(10));
    }

    #[test]
    fn test_grouping_keeps_first_seen_order() {
        let answers = vec![
            stored(1, None, Some(5), "a", "a"),
            stored(2, Some(9), None, "b", "b"),
            stored(3, None, Some(5), "c", "c"),
            stored(4, None, None, "d", "d"),
            stored(5, Some(9), None, "e", "e"),
        ];

        let groups = group_submissions(&answers);
        let ids: Vec<&str> = groups.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(ids, vec!["u5", "9", "guest"]);
        assert_eq!(groups[0].answers.len(), 2);
        assert_eq!(groups[1].answers.len(), 2);
        assert_eq!(groups[2].answers.len(), 1);
        assert_eq!(groups[0].answers[1].question_id, Some(3));
    }

    #[test]
    fn test_keyless_answers_share_guest_bucket() {
        let answers = vec![
            stored(1, None, None, "a", "a"),
            stored(2, None, None, "b", "x"),
        ];
        let groups = group_submissions(&answers);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].player_id, "guest");
        assert_eq!(groups[0].answers.len(), 2);
    }

    #[test]
    fn test_player_name_prefers_stored_name() {
        let mut named = stored(1, Some(4), None, "a", "a");
        named.player_name = Some("Ada".to_string());
        let groups = group_submissions(&[named, stored(2, Some(8), None, "b", "b")]);
        assert_eq!(groups[0].player_name, "Ada");
        assert_eq!(groups[1].player_name, "8");
    }

    #[tokio::test]
    async fn test_n_players_m_answers() {
        let mut answers = Vec::new();
        let mut id = 0;
        for question in 0..4 {
            for player in 1..=3 {
                id += 1;
                let reply = if player == 1 { "right answer" } else { "nope" };
                answers.push(stored(id, Some(player), None, "right answer", reply));
                answers.last_mut().unwrap().question_id = question;
            }
        }

        let results = score_submissions(&HeuristicScorer, group_submissions(&answers)).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.questions_count == 4));
        assert_eq!(results[0].player_id, "1");
        assert_eq!(results[0].average_score, 100.0);
    }

    #[tokio::test]
    async fn test_empty_submission_scores_zero() {
        let submissions = vec![PlayerSubmission {
            player_id: "p".to_string(),
            player_name: "p".to_string(),
            answers: Vec::new(),
        }];
        let results = score_submissions(&HeuristicScorer, submissions).await;
        assert_eq!(results[0].questions_count, 0);
        assert_eq!(results[0].average_score, 0.0);
    }

    #[tokio::test]
    async fn test_missing_texts_are_empty_strings() {
        let submissions = vec![PlayerSubmission {
            player_id: "p".to_string(),
            player_name: "p".to_string(),
            answers: vec![PlayerAnswer::default()],
        }];
        let results = score_submissions(&HeuristicScorer, submissions).await;
        // Empty reference against empty answer is a full match.
        assert_eq!(results[0].average_score, 100.0);
    }

    #[tokio::test]
    async fn test_results_sorted_and_ties_keep_order() {
        let answers = vec![
            stored(1, Some(1), None, "alpha beta", "alpha"),
            stored(2, Some(2), None, "alpha beta", "alpha beta"),
            stored(3, Some(3), None, "alpha beta", "beta"),
            stored(4, Some(4), None, "alpha beta", "gamma"),
        ];

        let results = score_submissions(&HeuristicScorer, group_submissions(&answers)).await;
        let order: Vec<&str> = results.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(order, vec!["2", "1", "3", "4"]);
        assert!(results.windows(2).all(|w| w[0].average_score >= w[1].average_score));
    }

    #[tokio::test]
    async fn test_mean_is_unrounded() {
        let answers = vec![
            stored(1, Some(1), None, "a b c", "a"),
            stored(2, Some(1), None, "a b", "a b"),
        ];
        let results = score_submissions(&HeuristicScorer, group_submissions(&answers)).await;
        // (33 + 100) / 2
        assert_eq!(results[0].average_score, 66.5);
    }
}
