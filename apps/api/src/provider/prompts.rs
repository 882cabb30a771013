// Prompt templates for the interview provider.
// All prompts for question generation and feedback analysis live here.

use crate::provider::AnswerPair;

pub const QUESTION_SYSTEM: &str = "You are an interviewer. \
    Generate a relevant interview screening call question based on the provided CV.";

pub const QUESTION_PROMPT: &str =
    "CV: {resume_text}\n\nGenerate an interview question based on this CV.";

pub const FEEDBACK_SYSTEM: &str = "You are an interview coach. \
    Analyze the answers to both interview questions and provide a comprehensive \
    but concise feedback summary.";

/// Builds the question-generation prompt for a résumé.
pub fn question_prompt(resume_text: &str) -> String {
    QUESTION_PROMPT.replace("{resume_text}", resume_text)
}

/// Builds the feedback-analysis prompt for both answer pairs.
/// The résumé is included so the feedback can weigh answers against the
/// candidate's stated background.
pub fn feedback_prompt(answers: &[AnswerPair; 2], resume_text: &str) -> String {
    format!(
        "CV: {resume}\n\n\
         Question 1: {q1}\n\
         Answer 1: {a1}\n\n\
         Question 2: {q2}\n\
         Answer 2: {a2}\n\n\
         Provide a concise feedback summary addressing:\n\
         1. Key Strengths (2-3 points)\n\
         2. Areas for Improvement (2-3 points)\n\
         3. Overall Performance Summary (1-2 sentences)\n\n\
         Keep the feedback clear, actionable, and focused on the most important points.",
        resume = resume_text,
        q1 = answers[0].question,
        a1 = answers[0].answer,
        q2 = answers[1].question,
        a2 = answers[1].answer,
    )
}
