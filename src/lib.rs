//! SYD Cyber - Guided Cyber Risk Assessment
//!
//! This crate implements the conversational risk-flow state machine of the
//! SYD Cyber assistant: category and event selection, the sequential
//! assessment questionnaire with its locking rules, plus the ATECO,
//! feedback and pre-report flows around it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
