use async_trait::async_trait;
use std::time::Instant;

use crate::chat::Role;
use crate::providers::{openai::api, providers::ProviderIdentifier, Error, ErrorKind};
use crate::providers::{CompletionRequest, CompletionService};

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        let kind = match value {
            api::Error::RequestFailed(err) => return err.into(),

            api::Error::Authentication(_) | api::Error::PermissionDenied(_) => {
                ErrorKind::Authentication
            }
            api::Error::BadRequest(_)
            | api::Error::InvalidApiBase(_)
            | api::Error::InvalidEndpoint(_)
            | api::Error::UnprocessableEntity(_) => ErrorKind::BadRequest,
            // Request invalidated by a race condition
            api::Error::Conflict(_) => ErrorKind::BadRequest,
            api::Error::InternalError(_) => ErrorKind::InternalError,
            api::Error::NotFound(_) => ErrorKind::NotFound,
            api::Error::RateLimit(_) => ErrorKind::ExcessUsage,
            api::Error::UnknownStatus(_) => ErrorKind::UnspecifiedError,
            api::Error::ApiOverloaded(_) => ErrorKind::ApiOverloaded,
            api::Error::EmptyCompletion => ErrorKind::UnexpectedResponse,
        };

        Error::from_source(kind, Box::new(value))
    }
}

impl From<Role> for api::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::Assistant => api::Role::Assistant,
            Role::System => api::Role::System,
            Role::User => api::Role::User,
        }
    }
}

pub(crate) struct OpenAIProvider {
    api: api::OpenAIApi,
}

impl OpenAIProvider {
    /// Creates a provider for `api_key`. When `api_base` is `None`, the
    /// public OpenAI endpoint is used.
    pub(crate) fn new(api_key: &str, api_base: Option<&str>) -> Result<OpenAIProvider, Error> {
        let api = match api_base {
            Some(api_base) => api::OpenAIApi::new(api_key, api_base)?,
            None => api::OpenAIApi::with_api_key(api_key)?,
        };

        Ok(OpenAIProvider { api })
    }
}

#[async_trait]
impl CompletionService for OpenAIProvider {
    fn id(&self) -> ProviderIdentifier {
        ProviderIdentifier::OpenAI
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, Error> {
        let messages: Vec<api::ChatMessage> = request
            .messages
            .iter()
            .map(|m| api::ChatMessage {
                role: m.role.into(),
                content: m.content.clone(),
            })
            .collect();

        let options = api::ChatCompletionOptions {
            temperature: Some(request.parameters.temperature),
            max_tokens: Some(request.parameters.max_tokens),
        };

        tracing::debug!(
            api_base = %self.api.api_base(),
            model = request.model,
            messages = messages.len(),
            "requesting chat completion"
        );

        let start = Instant::now();

        let completion = self
            .api
            .chat_completion(request.model, &messages, &options)
            .await?;

        let finish_reason = completion
            .choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref());

        tracing::info!(
            model = %completion.model,
            duration_ms = %start.elapsed().as_millis(),
            prompt_tokens = ?completion.usage.as_ref().map(|usage| usage.prompt_tokens),
            completion_tokens = ?completion.usage.as_ref().map(|usage| usage.completion_tokens),
            finish_reason = ?finish_reason,
            "chat completion finished"
        );

        Ok(completion.into_reply()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Message;
    use crate::providers::CompletionParameters;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn greeting() -> Vec<Message> {
        vec![
            Message::system("당신은 시인입니다.".to_string()),
            Message::assistant("안녕하세요.".to_string()),
        ]
    }

    async fn complete(provider: &OpenAIProvider) -> Result<String, Error> {
        let messages = greeting();
        let parameters = CompletionParameters::default();

        provider
            .complete(&CompletionRequest {
                model: "gpt-4o-mini",
                messages: &messages,
                parameters: &parameters,
            })
            .await
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system", "content": "당신은 시인입니다." },
                    { "role": "assistant", "content": "안녕하세요." }
                ],
                "temperature": 0.8,
                "max_tokens": 1024
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-mini",
                "choices": [
                    { "index": 0, "message": { "role": "assistant", "content": "첫 번째" }, "finish_reason": "stop" },
                    { "index": 1, "message": { "role": "assistant", "content": "두 번째" }, "finish_reason": "stop" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new("test-key", Some(server.uri().as_str())).unwrap();

        assert_eq!(complete(&provider).await.unwrap(), "첫 번째");
    }

    #[tokio::test]
    async fn test_status_maps_to_error_kind() {
        let cases = [
            (401, ErrorKind::Authentication),
            (403, ErrorKind::Authentication),
            (400, ErrorKind::BadRequest),
            (404, ErrorKind::NotFound),
            (429, ErrorKind::ExcessUsage),
            (500, ErrorKind::InternalError),
            (503, ErrorKind::ApiOverloaded),
            (504, ErrorKind::UnspecifiedError),
        ];

        for (status, kind) in cases {
            let server = MockServer::start().await;

            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                    "error": { "message": format!("status {}", status), "type": "test" }
                })))
                .mount(&server)
                .await;

            let provider = OpenAIProvider::new("test-key", Some(server.uri().as_str())).unwrap();

            let err = complete(&provider).await.unwrap_err();

            assert_eq!(err.kind(), kind, "status {}", status);

            let source = std::error::Error::source(&err).expect("provider detail is kept");
            assert_eq!(source.to_string(), format!("status {}", status));
        }
    }

    #[tokio::test]
    async fn test_null_content_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-mini",
                "choices": [
                    { "index": 0, "message": { "role": "assistant", "content": null }, "finish_reason": "content_filter" }
                ]
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new("test-key", Some(server.uri().as_str())).unwrap();

        let err = complete(&provider).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
    }

    #[tokio::test]
    async fn test_malformed_body_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new("test-key", Some(server.uri().as_str())).unwrap();

        let err = complete(&provider).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop a listener so the port is known to be closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let api_base = format!("http://127.0.0.1:{}", port);
        let provider = OpenAIProvider::new("test-key", Some(api_base.as_str())).unwrap();

        let err = complete(&provider).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_invalid_api_base() {
        let result = OpenAIProvider::new("test-key", Some("::not a url::"));

        assert!(matches!(
            result.map(|_| ()).unwrap_err().kind(),
            ErrorKind::BadRequest
        ));
    }
}
