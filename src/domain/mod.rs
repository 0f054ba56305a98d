//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `risk` - Risk catalog, events, questionnaire and the flow step machine
//! - `chat` - Chat messages, chat state reducer and the observable store
//! - `session` - Session metadata and theme
//! - `ateco` - ATECO lookup records, enrichment and report assembly
//! - `feedback` - Feedback survey validation

pub mod ateco;
pub mod chat;
pub mod feedback;
pub mod foundation;
pub mod risk;
pub mod session;
