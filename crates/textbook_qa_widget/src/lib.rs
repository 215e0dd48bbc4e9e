//! Conversation state controller for the textbook Q&A chat widget.
//! Rendering-free: a presentation layer reads message snapshots and drives
//! the open/close/submit operations; network I/O goes through
//! `textbook_qa_client`.

pub mod message;
pub mod widget;

pub use message::{ChatMessage, Role, SourceLink};
pub use widget::{ChatWidget, GREETING, REQUEST_FAILED_REPLY};
