//! Type definitions for chat primitives
//!

/// The author of a `Message`
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Role {
    /// A `System` message carries the persona instruction. It leads every
    /// outbound request and is never stored in a transcript.
    System,

    /// A message authored by the user
    User,

    /// A message authored by the model
    Assistant,
}

/// A `Message` in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Message {
    /// The author of the message
    pub role: Role,
    /// The contents of the message
    pub content: String,
}

impl Message {
    pub(crate) fn new(role: Role, content: String) -> Message {
        Message { role, content }
    }

    pub(crate) fn system(content: String) -> Message {
        Message::new(Role::System, content)
    }

    pub(crate) fn user(content: String) -> Message {
        Message::new(Role::User, content)
    }

    pub(crate) fn assistant(content: String) -> Message {
        Message::new(Role::Assistant, content)
    }
}
