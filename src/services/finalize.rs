// src/services/finalize.rs

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        answer::StoredAnswer,
        quiz::Quiz,
        result::{NewActivity, NewResult},
        submission::PlayerResult,
    },
    services::{
        aggregation::{PlayerKey, group_submissions, score_submissions},
        grading::AnswerScorer,
    },
};

/// Storage operations the finalizer needs.
///
/// Implemented for `PgPool` in `services::store`.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, AppError>;

    /// Answers for a quiz in submission order.
    async fn answers_for_quiz(&self, quiz_id: i64) -> Result<Vec<StoredAnswer>, AppError>;

    async fn insert_result(&self, result: &NewResult) -> Result<(), AppError>;

    async fn insert_activity(&self, activity: &NewActivity) -> Result<(), AppError>;
}

/// Scores every stored answer of a quiz and persists the ranked results.
///
/// Writes one `results` row per player (rank 1..N in returned order) and one
/// `user_activity` row per player keyed by a registered user id.
/// Storage errors are propagated, leaving earlier rows in place.
pub async fn finalize_quiz<St, Sc>(
    store: &St,
    scorer: &Sc,
    quiz_id: i64,
) -> Result<Vec<PlayerResult>, AppError>
where
    St: QuizStore + ?Sized,
    Sc: AnswerScorer + ?Sized,
{
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let answers = store.answers_for_quiz(quiz_id).await?;
    let results = score_submissions(scorer, group_submissions(&answers)).await;

    tracing::info!(
        quiz_id,
        players = results.len(),
        answers = answers.len(),
        "Finalizing quiz"
    );

    for (position, result) in results.iter().enumerate() {
        let (new_result, activity) = plan_rows(&quiz, result, position as i32 + 1);

        store.insert_result(&new_result).await?;
        if let Some(activity) = activity {
            store.insert_activity(&activity).await?;
        }
    }

    Ok(results)
}

/// Rows to persist for the player at `rank`.
fn plan_rows(quiz: &Quiz, result: &PlayerResult, rank: i32) -> (NewResult, Option<NewActivity>) {
    let total_score = result.average_score.round() as i32;
    let key = PlayerKey::parse(&result.player_id);

    let (participant_id, user_id) = match key {
        Some(PlayerKey::Participant(id)) => (Some(id), None),
        Some(PlayerKey::User(id)) => (None, Some(id)),
        Some(PlayerKey::Guest) | None => (None, None),
    };

    let new_result = NewResult {
        quiz_id: quiz.id,
        participant_id,
        user_id,
        total_score,
        accuracy: result.average_score,
        rank_position: rank,
    };

    let activity = user_id.map(|user_id| NewActivity {
        user_id,
        quiz_id: quiz.id,
        title: quiz.title.clone(),
        score: total_score,
        accuracy: result.average_score,
    });

    (new_result, activity)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::services::grading::HeuristicScorer;

    #[derive(Default)]
    struct MemoryStore {
        quiz: Option<Quiz>,
        answers: Vec<StoredAnswer>,
        results: Mutex<Vec<NewResult>>,
        activity: Mutex<Vec<NewActivity>>,
        fail_inserts: bool,
    }

    #[async_trait]
    impl QuizStore for MemoryStore {
        async fn find_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
            Ok(self.quiz.clone().filter(|q| q.id == quiz_id))
        }

        async fn answers_for_quiz(&self, _quiz_id: i64) -> Result<Vec<StoredAnswer>, AppError> {
            Ok(self.answers.clone())
        }

        async fn insert_result(&self, result: &NewResult) -> Result<(), AppError> {
            if self.fail_inserts {
                return Err(AppError::InternalServerError("disk full".to_string()));
            }
            self.results.lock().unwrap().push(result.clone());
            Ok(())
        }

        async fn insert_activity(&self, activity: &NewActivity) -> Result<(), AppError> {
            self.activity.lock().unwrap().push(activity.clone());
            Ok(())
        }
    }

    fn quiz(id: i64) -> Quiz {
        Quiz {
            id,
            host_user_id: None,
            title: "Biology basics".to_string(),
            quiz_code: "ABC123".to_string(),
            subject: Some("Biology".to_string()),
            difficulty: Some(0),
            question_type: None,
            question_source: None,
            num_questions: Some(2),
            status: "active".to_string(),
            created_at: None,
            started_at: None,
            ended_at: None,
        }
    }

    fn answer(
        id: i64,
        participant_id: Option<i64>,
        user_id: Option<i64>,
        reference: &str,
        text: &str,
    ) -> StoredAnswer {
        StoredAnswer {
            id,
            question_id: id,
            participant_id,
            user_id,
            answer_text: Some(text.to_string()),
            reference_answer: Some(reference.to_string()),
            player_name: None,
        }
    }

    #[tokio::test]
    async fn test_two_players_ranked() {
        let store = MemoryStore {
            quiz: Some(quiz(1)),
            answers: vec![
                answer(1, None, Some(42), "cell membrane", "Cell membrane"),
                answer(2, Some(7), None, "nucleus", "ribosome"),
                answer(3, None, Some(42), "mitochondria", "mitochondria!"),
            ],
            ..Default::default()
        };

        let results = finalize_quiz(&store, &HeuristicScorer, 1).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].player_id, "u42");
        assert_eq!(results[0].average_score, 100.0);
        assert_eq!(results[0].questions_count, 2);
        assert_eq!(results[1].player_id, "7");
        assert_eq!(results[1].average_score, 0.0);

        let rows = store.results.lock().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank_position, 1);
        assert_eq!(rows[0].user_id, Some(42));
        assert_eq!(rows[0].participant_id, None);
        assert_eq!(rows[1].rank_position, 2);
        assert_eq!(rows[1].participant_id, Some(7));

        let activity = store.activity.lock().unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].user_id, 42);
        assert_eq!(activity[0].title, "Biology basics");
        assert_eq!(activity[0].score, 100);
    }

    #[tokio::test]
    async fn test_ranks_contiguous_and_scores_rounded() {
        let store = MemoryStore {
            quiz: Some(quiz(3)),
            answers: vec![
                answer(1, Some(1), None, "a b c", "a"),
                answer(2, Some(1), None, "a b", "a b"),
                answer(3, Some(2), None, "a b c", "a b"),
                answer(4, None, None, "x", "x"),
            ],
            ..Default::default()
        };

        let results = finalize_quiz(&store, &HeuristicScorer, 3).await.unwrap();
        let rows = store.results.lock().unwrap();

        assert_eq!(rows.len(), results.len());
        for (i, (row, result)) in rows.iter().zip(&results).enumerate() {
            assert_eq!(row.rank_position, i as i32 + 1);
            assert_eq!(row.total_score, result.average_score.round() as i32);
            assert_eq!(row.accuracy, result.average_score);
        }
        // Guest and participant keys never produce dashboard activity.
        assert!(store.activity.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_quiz_writes_nothing() {
        let store = MemoryStore {
            quiz: Some(quiz(1)),
            answers: vec![answer(1, Some(1), None, "a", "a")],
            ..Default::default()
        };

        let err = finalize_quiz(&store, &HeuristicScorer, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.results.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_answers_yields_empty_results() {
        let store = MemoryStore {
            quiz: Some(quiz(1)),
            ..Default::default()
        };
        let results = finalize_quiz(&store, &HeuristicScorer, 1).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let store = MemoryStore {
            quiz: Some(quiz(1)),
            answers: vec![answer(1, Some(1), None, "a", "a")],
            fail_inserts: true,
            ..Default::default()
        };
        let err = finalize_quiz(&store, &HeuristicScorer, 1).await.unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }
}
