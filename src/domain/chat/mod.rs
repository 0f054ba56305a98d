//! Chat domain: message history, risk-flow state and the shared store.

mod message;
mod state;
mod store;

pub use message::{ChatMessage, MessageKind, MessagePayload, Sender};
pub use state::{ChatAction, ChatState};
pub use store::{ChatStore, StoreObserver};
