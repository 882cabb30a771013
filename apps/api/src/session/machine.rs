//! The interview state machine.
//!
//! A session moves Idle → QuestionGenerationPending → Question1Active →
//! Question2Active → AnswersFinalizationPending → ResultsReady, with every
//! transition checked here. Restart returns any phase to Idle and clears
//! all collected state. Invariants enforced:
//! - exactly two questions per session once generation completes;
//! - feedback is only produced once both answer slots are filled, and the
//!   same combined feedback text is attached to both answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::provider::AnswerPair;

/// Every interview asks exactly this many questions.
pub const QUESTION_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    Idle,
    QuestionGenerationPending,
    Question1Active,
    Question2Active,
    AnswersFinalizationPending,
    ResultsReady,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("interview has already started")]
    AlreadyStarted,

    #[error("no question generation in progress")]
    NotGenerating,

    #[error("expected exactly two questions, got {0}")]
    WrongQuestionCount(usize),

    #[error("no active question to answer")]
    NotAwaitingAnswer,

    #[error("interview cannot be ended before the second question")]
    NotEndable,

    #[error("both answers must be recorded before feedback")]
    AnswersIncomplete,

    #[error("no feedback analysis in progress")]
    NotFinalizing,
}

/// A generated interview question with its synthesized speech.
#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    pub question: String,
    pub audio: Vec<u8>,
}

/// One answered question. Feedback is filled in once, in bulk, after both
/// answers are collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub resume_text: String,
    pub questions: Vec<GeneratedQuestion>,
    pub answers: [Option<Answer>; QUESTION_COUNT],
    pub current_question: usize,
    pub phase: InterviewPhase,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A new session for an accepted résumé, in phase `Idle`.
    pub fn new(resume_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_text,
            questions: Vec::new(),
            answers: [None, None],
            current_question: 0,
            phase: InterviewPhase::Idle,
            created_at: Utc::now(),
        }
    }

    pub fn begin_generation(&mut self) -> Result<(), SessionError> {
        if self.phase != InterviewPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }
        self.phase = InterviewPhase::QuestionGenerationPending;
        Ok(())
    }

    /// Installs the generated questions and activates question 1.
    pub fn questions_ready(
        &mut self,
        questions: Vec<GeneratedQuestion>,
    ) -> Result<(), SessionError> {
        if self.phase != InterviewPhase::QuestionGenerationPending {
            return Err(SessionError::NotGenerating);
        }
        if questions.len() != QUESTION_COUNT {
            return Err(SessionError::WrongQuestionCount(questions.len()));
        }
        self.questions = questions;
        self.current_question = 0;
        self.phase = InterviewPhase::Question1Active;
        Ok(())
    }

    /// Records a transcript for the active question and returns its slot.
    ///
    /// The first transcript advances to the second question. The second is
    /// stored in place — it may also arrive while finalization is already
    /// waiting on it.
    pub fn record_answer(&mut self, transcript: String) -> Result<usize, SessionError> {
        let slot = match self.phase {
            InterviewPhase::Question1Active => 0,
            InterviewPhase::Question2Active | InterviewPhase::AnswersFinalizationPending => 1,
            _ => return Err(SessionError::NotAwaitingAnswer),
        };

        let question = self
            .questions
            .get(slot)
            .ok_or(SessionError::NotAwaitingAnswer)?
            .question
            .clone();

        self.answers[slot] = Some(Answer {
            question,
            answer: transcript,
            feedback: None,
        });

        if slot == 0 {
            self.current_question = 1;
            self.phase = InterviewPhase::Question2Active;
        }
        Ok(slot)
    }

    /// User-triggered "end interview". Legal only on the second question.
    pub fn begin_finalization(&mut self) -> Result<(), SessionError> {
        if self.phase != InterviewPhase::Question2Active {
            return Err(SessionError::NotEndable);
        }
        self.phase = InterviewPhase::AnswersFinalizationPending;
        Ok(())
    }

    /// Both question/answer pairs, once both slots are filled.
    pub fn answer_pairs(&self) -> Option<[AnswerPair; QUESTION_COUNT]> {
        match (&self.answers[0], &self.answers[1]) {
            (Some(first), Some(second)) => Some([
                AnswerPair {
                    question: first.question.clone(),
                    answer: first.answer.clone(),
                },
                AnswerPair {
                    question: second.question.clone(),
                    answer: second.answer.clone(),
                },
            ]),
            _ => None,
        }
    }

    /// Attaches the combined feedback to both answers and publishes results.
    pub fn feedback_ready(&mut self, feedback: String) -> Result<(), SessionError> {
        if self.phase != InterviewPhase::AnswersFinalizationPending {
            return Err(SessionError::NotFinalizing);
        }
        if self.answers.iter().any(|a| a.is_none()) {
            return Err(SessionError::AnswersIncomplete);
        }
        for answer in self.answers.iter_mut().flatten() {
            answer.feedback = Some(feedback.clone());
        }
        self.phase = InterviewPhase::ResultsReady;
        Ok(())
    }

    /// Any phase back to `Idle`, clearing all collected state.
    pub fn reset(&mut self) {
        self.resume_text.clear();
        self.questions.clear();
        self.answers = [None, None];
        self.current_question = 0;
        self.phase = InterviewPhase::Idle;
    }

    /// The question currently being asked, while one is active.
    pub fn active_question(&self) -> Option<&GeneratedQuestion> {
        match self.phase {
            InterviewPhase::Question1Active | InterviewPhase::Question2Active => {
                self.questions.get(self.current_question)
            }
            _ => None,
        }
    }

    /// Step on the upload → interview → results timeline.
    pub fn progress_step(&self) -> u8 {
        match self.phase {
            InterviewPhase::Idle | InterviewPhase::QuestionGenerationPending => 0,
            InterviewPhase::Question1Active
            | InterviewPhase::Question2Active
            | InterviewPhase::AnswersFinalizationPending => 1,
            InterviewPhase::ResultsReady => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> Vec<GeneratedQuestion> {
        vec![
            GeneratedQuestion {
                question: "Tell me about your Python experience.".to_string(),
                audio: vec![1, 2, 3],
            },
            GeneratedQuestion {
                question: "Why did you move to Go?".to_string(),
                audio: vec![4, 5, 6],
            },
        ]
    }

    fn session_at_question_1() -> Session {
        let mut session = Session::new("Software engineer, 5 years, Python/Go".to_string());
        session.begin_generation().unwrap();
        session.questions_ready(two_questions()).unwrap();
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new("resume".to_string());
        assert_eq!(session.phase, InterviewPhase::Idle);
        assert!(session.questions.is_empty());
        assert_eq!(session.progress_step(), 0);
    }

    #[test]
    fn test_begin_generation_twice_fails() {
        let mut session = Session::new("resume".to_string());
        session.begin_generation().unwrap();
        assert_eq!(
            session.begin_generation().unwrap_err(),
            SessionError::AlreadyStarted
        );
    }

    #[test]
    fn test_questions_ready_requires_exactly_two() {
        let mut session = Session::new("resume".to_string());
        session.begin_generation().unwrap();

        let mut one = two_questions();
        one.truncate(1);
        assert_eq!(
            session.questions_ready(one).unwrap_err(),
            SessionError::WrongQuestionCount(1)
        );

        let mut three = two_questions();
        three.push(GeneratedQuestion {
            question: "extra".to_string(),
            audio: vec![],
        });
        assert_eq!(
            session.questions_ready(three).unwrap_err(),
            SessionError::WrongQuestionCount(3)
        );

        session.questions_ready(two_questions()).unwrap();
        assert_eq!(session.phase, InterviewPhase::Question1Active);
    }

    #[test]
    fn test_questions_ready_rejected_after_reset() {
        // A restart mid-generation discards the in-flight result.
        let mut session = Session::new("resume".to_string());
        session.begin_generation().unwrap();
        session.reset();
        assert_eq!(
            session.questions_ready(two_questions()).unwrap_err(),
            SessionError::NotGenerating
        );
    }

    #[test]
    fn test_first_answer_advances_to_question_2() {
        let mut session = session_at_question_1();
        let slot = session.record_answer("answer one".to_string()).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(session.phase, InterviewPhase::Question2Active);
        assert_eq!(session.current_question, 1);
        assert_eq!(
            session.active_question().unwrap().question,
            "Why did you move to Go?"
        );
    }

    #[test]
    fn test_answer_rejected_while_idle_or_generating() {
        let mut session = Session::new("resume".to_string());
        assert_eq!(
            session.record_answer("early".to_string()).unwrap_err(),
            SessionError::NotAwaitingAnswer
        );
        session.begin_generation().unwrap();
        assert_eq!(
            session.record_answer("early".to_string()).unwrap_err(),
            SessionError::NotAwaitingAnswer
        );
    }

    #[test]
    fn test_finalization_only_reachable_from_question_2() {
        let mut session = session_at_question_1();
        assert_eq!(
            session.begin_finalization().unwrap_err(),
            SessionError::NotEndable
        );

        session.record_answer("answer one".to_string()).unwrap();
        session.begin_finalization().unwrap();
        assert_eq!(session.phase, InterviewPhase::AnswersFinalizationPending);
    }

    #[test]
    fn test_second_answer_accepted_during_finalization() {
        let mut session = session_at_question_1();
        session.record_answer("answer one".to_string()).unwrap();
        session.begin_finalization().unwrap();

        assert!(session.answer_pairs().is_none());
        let slot = session.record_answer("answer two".to_string()).unwrap();
        assert_eq!(slot, 1);
        assert!(session.answer_pairs().is_some());
    }

    #[test]
    fn test_feedback_requires_both_answers() {
        let mut session = session_at_question_1();
        session.record_answer("answer one".to_string()).unwrap();
        session.begin_finalization().unwrap();

        assert_eq!(
            session.feedback_ready("feedback".to_string()).unwrap_err(),
            SessionError::AnswersIncomplete
        );
        assert_eq!(session.phase, InterviewPhase::AnswersFinalizationPending);
    }

    #[test]
    fn test_feedback_attached_to_both_answers() {
        let mut session = session_at_question_1();
        session.record_answer("answer one".to_string()).unwrap();
        session.record_answer("answer two".to_string()).unwrap();
        session.begin_finalization().unwrap();
        session
            .feedback_ready("Solid answers overall.".to_string())
            .unwrap();

        assert_eq!(session.phase, InterviewPhase::ResultsReady);
        assert_eq!(session.progress_step(), 2);
        for answer in session.answers.iter().flatten() {
            assert_eq!(answer.feedback.as_deref(), Some("Solid answers overall."));
        }
    }

    #[test]
    fn test_reset_clears_everything_from_any_phase() {
        let mut session = session_at_question_1();
        session.record_answer("answer one".to_string()).unwrap();
        session.reset();

        assert_eq!(session.phase, InterviewPhase::Idle);
        assert!(session.resume_text.is_empty());
        assert!(session.questions.is_empty());
        assert!(session.answers.iter().all(|a| a.is_none()));
        assert_eq!(session.current_question, 0);
    }
}
