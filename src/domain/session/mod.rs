//! Session domain module.
//!
//! Holds UI-global session data with a lifecycle independent of the risk
//! flow: the ATECO metadata derived by the lookup flow and the theme.

mod meta;
mod store;

pub use meta::{SessionMeta, SessionMetaUpdate, Theme};
pub use store::{SessionState, SessionStore};
