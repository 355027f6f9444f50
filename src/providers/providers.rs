//! Concrete types for providers, along with their provider alias variants

use strum_macros;

/// The `ProviderIdentifier` is a unique per-provider identifier. It is used to
/// label providers in diagnostics, where the `to_string` form should remain stable.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ProviderIdentifier {
    OpenAI,
}

pub(crate) use super::openai::{known_model, OpenAIProvider, DEFAULT_MODEL};
