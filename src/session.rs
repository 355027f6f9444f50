//! The conversation controller.
//!
//! A [`Session`] owns the transcript of one conversation with one persona. The
//! transcript always starts with the persona's greeting. Each submitted user
//! turn triggers exactly one completion request; on success the reply is
//! appended, on failure the user turn is withdrawn so the transcript is left
//! exactly as it was before the submission.
//!
//! The request carries the persona instruction followed by the transcript as it
//! stood *before* the new user turn was appended. The newest user turn is
//! recorded in the transcript but is not part of the request.

use std::iter;
use thiserror::Error;

use crate::chat::{Message, Role};
use crate::persona::Persona;
use crate::providers::{self, providers::ProviderIdentifier};
use crate::providers::{CompletionParameters, CompletionRequest, CompletionService};
use crate::utils::errors::error_chain;

/// The ordered list of turns in a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transcript {
    turns: Vec<Message>,
}

impl Transcript {
    /// A transcript holding only the greeting
    fn seeded(greeting: &str) -> Transcript {
        Transcript {
            turns: vec![Message::assistant(greeting.to_string())],
        }
    }

    fn push(&mut self, msg: Message) {
        self.turns.push(msg);
    }

    fn pop(&mut self) -> Option<Message> {
        self.turns.pop()
    }

    /// Every turn except the most recent one
    fn history_before_last(&self) -> &[Message] {
        let end = self.turns.len().saturating_sub(1);

        &self.turns[..end]
    }

    pub(crate) fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub(crate) fn len(&self) -> usize {
        self.turns.len()
    }
}

/// A failed turn. The transcript has already been rolled back when this is
/// returned.
#[derive(Error, Debug)]
#[error("completion for {provider}/{model} failed: {}", error_chain(.source))]
pub(crate) struct TurnError {
    provider: ProviderIdentifier,
    model: String,
    #[source]
    source: providers::Error,
}

impl TurnError {
    pub(crate) fn kind(&self) -> providers::ErrorKind {
        self.source.kind()
    }
}

pub(crate) struct Session {
    persona: Persona,
    service: Box<dyn CompletionService>,
    model: String,
    parameters: CompletionParameters,
    transcript: Transcript,
}

impl Session {
    /// Starts a conversation, seeded with the persona's greeting.
    pub(crate) fn new(
        persona: Persona,
        service: Box<dyn CompletionService>,
        model: String,
        parameters: CompletionParameters,
    ) -> Session {
        let transcript = Self::initialize(&persona);

        Session {
            persona,
            service,
            model,
            parameters,
            transcript,
        }
    }

    fn initialize(persona: &Persona) -> Transcript {
        Transcript::seeded(&persona.greeting)
    }

    pub(crate) fn persona(&self) -> &Persona {
        &self.persona
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn provider(&self) -> ProviderIdentifier {
        self.service.id()
    }

    pub(crate) fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Discards the conversation and starts over from the greeting.
    pub(crate) fn reset(&mut self) {
        self.transcript = Self::initialize(&self.persona);
    }

    fn request_messages(&self) -> Vec<Message> {
        iter::once(Message::system(self.persona.instruction.clone()))
            .chain(self.transcript.history_before_last().iter().cloned())
            .collect()
    }

    /// Submits a user turn and waits for the reply.
    ///
    /// On success the transcript has grown by the user turn and the reply, and
    /// the reply is returned. On failure the transcript is unchanged.
    pub(crate) async fn submit(&mut self, text: String) -> Result<String, TurnError> {
        self.transcript.push(Message::user(text));

        let messages = self.request_messages();

        let request = CompletionRequest {
            model: &self.model,
            messages: &messages,
            parameters: &self.parameters,
        };

        match self.service.complete(&request).await {
            Ok(reply) => {
                self.transcript.push(Message::assistant(reply.clone()));

                tracing::debug!(turns = self.transcript.len(), "turn completed");

                Ok(reply)
            }
            Err(err) => {
                let withdrawn = self.transcript.pop();
                debug_assert!(matches!(withdrawn, Some(Message { role: Role::User, .. })));

                tracing::warn!(
                    model = %self.model,
                    kind = ?err.kind(),
                    "completion failed, user turn withdrawn"
                );

                Err(TurnError {
                    provider: self.service.id(),
                    model: self.model.clone(),
                    source: err,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{Personas, DEFAULT_PERSONA};
    use crate::providers::{Error, ErrorKind};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// A completion service which replays scripted replies and records the
    /// requests it receives
    #[derive(Default, Clone)]
    struct StubService {
        replies: Arc<Mutex<VecDeque<Result<String, Error>>>>,
        requests: Arc<Mutex<Vec<(String, Vec<Message>, CompletionParameters)>>>,
    }

    impl StubService {
        fn reply(&self, reply: &str) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok(reply.to_string()));
            self
        }

        fn fail(&self, kind: ErrorKind, description: &str) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(Error::from_source(kind, description.into())));
            self
        }

        fn requests(&self) -> Vec<(String, Vec<Message>, CompletionParameters)> {
            self.requests.lock().unwrap().clone()
        }

        fn messages(&self, n: usize) -> Vec<Message> {
            self.requests()[n].1.clone()
        }
    }

    #[async_trait]
    impl CompletionService for StubService {
        fn id(&self) -> ProviderIdentifier {
            ProviderIdentifier::OpenAI
        }

        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, Error> {
            self.requests.lock().unwrap().push((
                request.model.to_string(),
                request.messages.to_vec(),
                *request.parameters,
            ));

            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    fn poet() -> Persona {
        Personas::builtin().get(DEFAULT_PERSONA).unwrap().clone()
    }

    fn session(stub: &StubService) -> Session {
        Session::new(
            poet(),
            Box::new(stub.clone()),
            "gpt-4o-mini".to_string(),
            CompletionParameters::default(),
        )
    }

    fn greeting() -> Message {
        Message::assistant(poet().greeting)
    }

    fn user(content: &str) -> Message {
        Message::user(content.to_string())
    }

    fn assistant(content: &str) -> Message {
        Message::assistant(content.to_string())
    }

    fn instruction() -> Message {
        Message::system(poet().instruction)
    }

    #[test]
    fn test_new_session_is_seeded() {
        let session = session(&StubService::default());

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().turns(), &[greeting()]);
        assert_eq!(session.transcript().turns()[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_submit_appends_user_and_reply() {
        let stub = StubService::default();
        stub.reply("괜찮습니다.");

        let mut session = session(&stub);

        let reply = session
            .submit("오늘 기분이 어때요?".to_string())
            .await
            .unwrap();

        assert_eq!(reply, "괜찮습니다.");
        assert_eq!(
            session.transcript().turns(),
            &[greeting(), user("오늘 기분이 어때요?"), assistant("괜찮습니다.")]
        );
    }

    #[tokio::test]
    async fn test_request_excludes_newest_user_turn() {
        let stub = StubService::default();
        stub.reply("첫 번째 답").reply("두 번째 답");

        let mut session = session(&stub);

        session.submit("첫 번째 질문".to_string()).await.unwrap();
        session.submit("두 번째 질문".to_string()).await.unwrap();

        assert_eq!(stub.messages(0), vec![instruction(), greeting()]);

        assert_eq!(
            stub.messages(1),
            vec![
                instruction(),
                greeting(),
                user("첫 번째 질문"),
                assistant("첫 번째 답"),
            ]
        );

        for (_, messages, _) in stub.requests() {
            assert!(!messages.contains(&user("두 번째 질문")));
        }
    }

    #[tokio::test]
    async fn test_request_parameters() {
        let stub = StubService::default();
        stub.reply("reply");

        let mut session = Session::new(
            poet(),
            Box::new(stub.clone()),
            "gpt-4o".to_string(),
            CompletionParameters {
                temperature: 0.2,
                max_tokens: 64,
            },
        );

        session.submit("hello".to_string()).await.unwrap();

        let (model, messages, parameters) = stub.requests().remove(0);

        assert_eq!(model, "gpt-4o");
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(parameters.temperature, 0.2);
        assert_eq!(parameters.max_tokens, 64);
    }

    #[tokio::test]
    async fn test_default_parameters() {
        let stub = StubService::default();
        stub.reply("reply");

        let mut session = session(&stub);
        session.submit("hello".to_string()).await.unwrap();

        let (_, _, parameters) = stub.requests().remove(0);

        assert_eq!(parameters.temperature, 0.8);
        assert_eq!(parameters.max_tokens, 1024);
    }

    #[tokio::test]
    async fn test_failed_submit_rolls_back() {
        let stub = StubService::default();
        stub.fail(ErrorKind::Connection, "connection reset by peer");

        let mut session = session(&stub);
        let before = session.transcript().clone();

        let err = session.submit("x".to_string()).await.unwrap_err();

        assert_eq!(session.transcript(), &before);
        assert_eq!(session.transcript().turns(), &[greeting()]);

        assert_eq!(err.kind(), ErrorKind::Connection);

        let description = err.to_string();
        assert!(description.contains("connection reset by peer"), "{}", description);
        assert!(description.contains("openai/gpt-4o-mini"), "{}", description);
    }

    #[tokio::test]
    async fn test_failure_after_success_keeps_history() {
        let stub = StubService::default();
        stub.reply("괜찮습니다.")
            .fail(ErrorKind::ExcessUsage, "Rate limit reached")
            .reply("다시 안녕하세요.");

        let mut session = session(&stub);

        session.submit("안녕".to_string()).await.unwrap();
        let before = session.transcript().clone();

        assert!(session.submit("또 안녕".to_string()).await.is_err());
        assert_eq!(session.transcript(), &before);

        // The failed turn can be submitted again, and leaves no trace in the
        // history that is sent
        session.submit("또 안녕".to_string()).await.unwrap();

        assert_eq!(stub.requests().len(), 3);
        assert_eq!(stub.messages(2), stub.messages(1));

        assert_eq!(
            session.transcript().turns(),
            &[
                greeting(),
                user("안녕"),
                assistant("괜찮습니다."),
                user("또 안녕"),
                assistant("다시 안녕하세요."),
            ]
        );
    }

    #[tokio::test]
    async fn test_two_submissions_alternate() {
        let stub = StubService::default();
        stub.reply("a").reply("b");

        let mut session = session(&stub);

        session.submit("1".to_string()).await.unwrap();
        session.submit("2".to_string()).await.unwrap();

        let turns = session.transcript().turns();

        assert_eq!(turns.len(), 5);
        assert_eq!(turns[0], greeting());

        for (i, turn) in turns.iter().enumerate().skip(1) {
            let expected = if i % 2 == 1 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role, expected, "turn {}", i);
        }
    }

    #[tokio::test]
    async fn test_one_request_per_attempt() {
        let stub = StubService::default();
        stub.fail(ErrorKind::TimedOut, "timed out").reply("ok");

        let mut session = session(&stub);

        assert!(session.submit("a".to_string()).await.is_err());
        assert_eq!(stub.requests().len(), 1);

        assert!(session.submit("b".to_string()).await.is_ok());
        assert_eq!(stub.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_reset() {
        let stub = StubService::default();
        stub.reply("괜찮습니다.");

        let mut session = session(&stub);
        session.submit("안녕".to_string()).await.unwrap();
        assert_eq!(session.transcript().len(), 3);

        session.reset();
        let first = session.transcript().clone();

        session.reset();
        let second = session.transcript().clone();

        assert_eq!(first, second);
        assert_eq!(first.turns(), &[greeting()]);
    }

    #[test]
    fn test_persona_parameterizes_greeting() {
        let personas = Personas::builtin();
        let philosopher = personas.get("philosopher").unwrap().clone();

        let mut session = Session::new(
            philosopher.clone(),
            Box::new(StubService::default()),
            "gpt-4o-mini".to_string(),
            CompletionParameters::default(),
        );
        session.reset();

        assert_eq!(session.persona().id, "philosopher");
        assert_eq!(session.model(), "gpt-4o-mini");
        assert_eq!(session.provider(), ProviderIdentifier::OpenAI);
        assert_eq!(
            session.transcript().turns(),
            &[Message::assistant(philosopher.greeting)]
        );
    }
}
