//! Drives the interview state machine against the provider gateway.
//!
//! The two questions are generated sequentially, never concurrently.
//! Finalization awaits the second transcript through the session's
//! `Notify` with a bounded wait — a late transcript wakes it immediately,
//! and a transcript that never arrives surfaces an error instead of
//! stalling the flow.

use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::provider::InterviewProvider;
use crate::session::machine::{GeneratedQuestion, Session, SessionError, QUESTION_COUNT};
use crate::session::store::SessionStore;

/// Bounded wait for the final transcript during finalization.
pub const FINALIZE_WAIT: Duration = Duration::from_secs(30);

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

/// Accepts a résumé and creates an idle session.
pub async fn create_session(store: &SessionStore, resume_text: String) -> Session {
    let session = Session::new(resume_text);
    let snapshot = session.clone();
    store.insert(session).await;
    info!("created session {}", snapshot.id);
    snapshot
}

/// Generates both questions (with synthesized audio) and activates
/// question 1. A provider failure puts the session back at `Idle`.
pub async fn start_interview(
    store: &SessionStore,
    provider: &dyn InterviewProvider,
    id: Uuid,
) -> Result<Session, AppError> {
    let resume_text = store
        .with_session(id, |s| {
            s.begin_generation().map(|_| s.resume_text.clone())
        })
        .await
        .ok_or_else(|| not_found(id))??;

    let mut questions = Vec::with_capacity(QUESTION_COUNT);
    for index in 0..QUESTION_COUNT {
        match provider.generate_question(&resume_text).await {
            Ok(generated) => {
                info!("session {id}: generated question {}", index + 1);
                questions.push(GeneratedQuestion {
                    question: generated.question,
                    audio: generated.audio,
                });
            }
            Err(e) => {
                let _ = store.with_session(id, |s| s.reset()).await;
                return Err(AppError::Provider(e));
            }
        }
    }

    store
        .with_session(id, |s| {
            s.questions_ready(questions)?;
            Ok::<_, SessionError>(s.clone())
        })
        .await
        .ok_or_else(|| not_found(id))?
        .map_err(AppError::from)
}

/// Records a transcript for the active question and wakes any finalizer
/// waiting on it.
pub async fn submit_answer(
    store: &SessionStore,
    id: Uuid,
    transcript: String,
) -> Result<Session, AppError> {
    let session = store
        .with_session(id, |s| {
            s.record_answer(transcript)?;
            Ok::<_, SessionError>(s.clone())
        })
        .await
        .ok_or_else(|| not_found(id))??;

    store.notify_answered(id).await;
    Ok(session)
}

/// Ends the interview: waits (bounded) for the final transcript, then runs
/// the single combined feedback analysis over both pairs.
pub async fn end_interview(
    store: &SessionStore,
    provider: &dyn InterviewProvider,
    id: Uuid,
) -> Result<Session, AppError> {
    store
        .with_session(id, |s| s.begin_finalization())
        .await
        .ok_or_else(|| not_found(id))??;

    let answered = store.answered_signal(id).await.ok_or_else(|| not_found(id))?;
    let deadline = tokio::time::Instant::now() + FINALIZE_WAIT;

    let (pairs, resume_text) = loop {
        let notified = answered.notified();

        if let Some(ready) = store
            .with_session(id, |s| s.answer_pairs().map(|p| (p, s.resume_text.clone())))
            .await
            .ok_or_else(|| not_found(id))?
        {
            break ready;
        }

        if tokio::time::timeout_at(deadline, notified).await.is_err() {
            warn!("session {id}: transcript for the final answer never arrived");
            return Err(AppError::UnprocessableEntity(
                "transcript for the final answer did not arrive".to_string(),
            ));
        }
    };

    let feedback = provider
        .analyze_answers(&pairs, &resume_text)
        .await
        .map_err(AppError::Provider)?;

    store
        .with_session(id, |s| {
            s.feedback_ready(feedback)?;
            Ok::<_, SessionError>(s.clone())
        })
        .await
        .ok_or_else(|| not_found(id))?
        .map_err(AppError::from)
}

/// Any phase back to `Idle`, clearing all session state. In-flight provider
/// calls are not cancelled; their results are rejected by the state machine.
pub async fn restart(store: &SessionStore, id: Uuid) -> Result<Session, AppError> {
    store
        .with_session(id, |s| {
            s.reset();
            s.clone()
        })
        .await
        .ok_or_else(|| not_found(id))
}
