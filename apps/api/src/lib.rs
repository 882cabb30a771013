//! Mock-interview coaching service.
//!
//! A résumé goes in, two spoken interview questions come out, the spoken
//! answers are captured and transcribed, and a single combined feedback
//! analysis is produced. All AI operations are delegated to an external
//! provider through the `provider` gateway; the code here is the plumbing:
//! PDF text extraction, microphone capture with silence detection, the
//! interview state machine, and the HTTP routes.

pub mod audio;
pub mod config;
pub mod errors;
pub mod extract;
pub mod gateway;
pub mod provider;
pub mod routes;
pub mod session;
pub mod state;
