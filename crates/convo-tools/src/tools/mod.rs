//! Built-in capabilities.

mod notes;

pub use notes::{RecallNote, RememberNote};
