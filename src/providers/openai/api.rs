use reqwest::{Client, IntoUrl};
use serde::{Deserialize, Serialize};

use crate::providers::apireq;
use crate::providers::apireq::Url;

#[derive(thiserror::Error, Debug)]
pub(super) enum Error {
    /// The API Base is not a URL that can be used in a network request
    #[error("invalid api base")]
    InvalidApiBase(#[source] reqwest::Error),

    /// Endpoint URL is invalid
    #[error("invalid endpoint")]
    InvalidEndpoint(
        #[from]
        #[source]
        url::ParseError,
    ),

    /// Some issue with the request
    #[error("{}", .0)]
    RequestFailed(
        #[from]
        #[source]
        apireq::ReqwestError,
    ),

    /// The response was well-formed but did not carry a reply
    #[error("the completion contained no message content")]
    EmptyCompletion,

    /// Your request was malformed or missing some required parameters,
    /// such as a token or an input.
    #[error("{}", .0.message)]
    BadRequest(ApiErrorPayload),

    /// An "Authentication" Error is an umbrella error with three possiblities:
    /// (1) Invalid Authentication
    /// (2) The requesting API key is not correct.
    /// (3) Your account is not part of an organization.
    #[error("{}", .0.message)]
    Authentication(ApiErrorPayload),

    /// You don't have access to the requested resource.
    #[error("{}", .0.message)]
    PermissionDenied(ApiErrorPayload),

    /// Requested resource does not exist.
    #[error("{}", .0.message)]
    NotFound(ApiErrorPayload),

    /// The resource was updated by another request.
    #[error("{}", .0.message)]
    Conflict(ApiErrorPayload),

    /// Unable to process the request despite the format being correct.
    #[error("{}", .0.message)]
    UnprocessableEntity(ApiErrorPayload),

    /// You have hit your assigned rate limit.
    #[error("{}", .0.message)]
    RateLimit(ApiErrorPayload),

    /// OpenAI has an internal issue
    #[error("{}", .0.message)]
    InternalError(ApiErrorPayload),

    /// The engine is currently overloaded, please try again later
    #[error("{}", .0.message)]
    ApiOverloaded(ApiErrorPayload),

    /// Some unknown error was returned by the API
    #[error("{}", .0.message)]
    UnknownStatus(ApiErrorPayload),
}

impl Error {
    fn from_status(status: u16, payload: ApiErrorPayload) -> Error {
        match status {
            400 => Error::BadRequest(payload),
            401 => Error::Authentication(payload),
            403 => Error::PermissionDenied(payload),
            404 => Error::NotFound(payload),
            409 => Error::Conflict(payload),
            422 => Error::UnprocessableEntity(payload),
            429 => Error::RateLimit(payload),
            500 => Error::InternalError(payload),
            503 => Error::ApiOverloaded(payload),
            _ => Error::UnknownStatus(payload),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(super) enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Debug)]
pub(super) struct ChatMessage {
    pub content: String,
    pub role: Role,
}

/* Structures to serialize /chat/completions */

#[derive(Serialize, Debug, Default)]
pub(super) struct ChatCompletionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'o> {
    model: &'o str,
    messages: &'o [ChatMessage],
    #[serde(flatten)]
    options: &'o ChatCompletionOptions,
    stream: bool,
}

/* Structures to deseralize /chat/completions */

#[derive(Deserialize, Debug)]
pub(super) struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(super) struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(super) struct Usage {
    pub completion_tokens: usize,
    pub prompt_tokens: usize,
}

#[derive(Deserialize, Debug)]
pub(super) struct ChatCompletion {
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Takes the content of the first choice. Additional choices are
    /// only produced when `n > 1`, which is never requested.
    pub(super) fn into_reply(self) -> Result<String, Error> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(Error::EmptyCompletion)
    }
}

/* API Errors */

#[derive(Deserialize, Debug)]
pub(super) struct ApiErrorPayload {
    message: String,
    #[serde(rename = "type")]
    typ: Option<String>,
}

impl ApiErrorPayload {
    /// Stands in for a payload when the server did not send a JSON error body
    fn from_raw(status: reqwest::StatusCode, body: &str) -> ApiErrorPayload {
        let body = body.trim();

        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body)
        };

        ApiErrorPayload { message, typ: None }
    }
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: ApiErrorPayload,
}

const DEFAULT_API_BASE: &'static str = "https://api.openai.com";

pub(super) struct OpenAIApi {
    client: Client,
    api_base: Url,
    api_key: String,
}

impl OpenAIApi {
    pub(super) fn new<U: IntoUrl>(api_key: &str, api_base: U) -> Result<OpenAIApi, Error> {
        let api_base = api_base.into_url().map_err(|e| Error::InvalidApiBase(e))?;

        Ok(OpenAIApi {
            client: Client::new(),
            api_base,
            api_key: api_key.to_string(),
        })
    }

    pub(super) fn with_api_key(api_key: &str) -> Result<OpenAIApi, Error> {
        Self::new(api_key, DEFAULT_API_BASE)
    }

    pub(super) fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub(super) async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> Result<ChatCompletion, Error> {
        let url = self.api_base.join("/v1/chat/completions")?;

        let res = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model,
                messages,
                options,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let status = res.status();

        if status.is_success() {
            let completion: ChatCompletion = res
                .json()
                .await
                .map_err(|e| Error::RequestFailed(e.into()))?;

            Ok(completion)
        } else {
            let body = res
                .text()
                .await
                .map_err(|e| Error::RequestFailed(e.into()))?;

            let payload = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(err) => err.error,
                Err(_) => ApiErrorPayload::from_raw(status, &body),
            };

            if let Some(typ) = &payload.typ {
                tracing::debug!(status = status.as_u16(), error_type = %typ, "OpenAI API returned an error");
            }

            Err(Error::from_status(status.as_u16(), payload))
        }
    }
}
