use lazy_static::lazy_static;

/// A chat model served by the OpenAI API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Model {
    pub id: &'static str,
    /// The context length of the model, in tokens.
    pub context_length: u64,
}

lazy_static! {
    // The OpenAI API does not include an API route to list their active chat models,
    // so this list needs to be updated whenever models are added or retired. It is
    // only used to warn about likely typos; unknown ids are still sent as-is.
    pub(super) static ref OPENAI_MODELS: [Model; 5] = [
        Model {
            id: "gpt-4o-mini",
            context_length: 128000,
        },
        Model {
            id: "gpt-4o",
            context_length: 128000,
        },
        Model {
            id: "gpt-4-turbo",
            context_length: 128000,
        },
        Model {
            id: "gpt-4",
            context_length: 8192,
        },
        Model {
            id: "gpt-3.5-turbo",
            context_length: 16385,
        },
    ];

    // This is the default model unless it is overridden by the user.
    pub(crate) static ref DEFAULT_MODEL: &'static Model = &OPENAI_MODELS[0];
}

/// Looks up a model in the table of known models
pub(crate) fn known_model(id: &str) -> Option<&'static Model> {
    OPENAI_MODELS.iter().find(|model| model.id == id)
}
