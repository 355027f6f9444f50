//! An unbrella module for the OpenAI provider

mod api;
mod models;
mod provider;

pub(crate) use self::models::{known_model, DEFAULT_MODEL};
pub(crate) use self::provider::OpenAIProvider;
