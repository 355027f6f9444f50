mod highlighter;
mod prompt;
mod repl;
mod spinner;

use std::fmt;
use std::io::{self, BufRead, IsTerminal};

use self::repl::Repl;
use self::spinner::with_spinner;

use crate::chat::{self, Role};
use crate::color::{self, MaybePaint};
use crate::config::{Config, Keybindings};
use crate::persona::{Persona, Personas, DEFAULT_PERSONA};
use crate::providers::providers::{known_model, OpenAIProvider, DEFAULT_MODEL};
use crate::providers::{CompletionParameters, ErrorKind};
use crate::session::Session;
use crate::utils::errors::{error_chain, fmt_error, fmt_warn};
use crate::{die, version, warn, ChatArgs};
use prompt::{persona_prompt, thinking_message, user_prompt};

pub(crate) const COMMANDS: [&str; 4] = ["/info", "/reset", "/clear", "/exit"];

/// A line of user input
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Blank input, which is never submitted
    Empty,
    Exit,
    Reset,
    Info,
    Submit(String),
}

impl Input {
    pub(crate) fn parse(line: String) -> Input {
        match line.trim() {
            "" => Input::Empty,
            "/exit" => Input::Exit,
            "/reset" | "/clear" => Input::Reset,
            "/info" => Input::Info,
            _ => Input::Submit(line),
        }
    }
}

pub(crate) enum Severity {
    Error,
    Warn,
    Standard,
}

/// Something printed to the terminal
pub(crate) enum Output<'a> {
    Turn(&'a chat::Message, &'a str),
    Text(Severity, String),
}

impl<'a> Output<'a> {
    pub(crate) fn error(msg: String) -> Output<'a> {
        Output::Text(Severity::Error, msg)
    }

    pub(crate) fn warn(msg: String) -> Output<'a> {
        Output::Text(Severity::Warn, msg)
    }

    pub(crate) fn text(msg: String) -> Output<'a> {
        Output::Text(Severity::Standard, msg)
    }
}

impl fmt::Display for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Turn(message, persona_name) => match &message.role {
                Role::User => write!(f, "{}{}", user_prompt(), message.content),
                Role::Assistant => write!(f, "{}{}", persona_prompt(persona_name), message.content),
                Role::System => Ok(()),
            },
            Output::Text(severity, msg) => match severity {
                Severity::Warn => fmt_warn(f, msg),
                Severity::Error => fmt_error(f, msg),
                Severity::Standard => write!(f, "{}", msg),
            },
        }
    }
}

/// The informational text about the persona and the model
fn info_lines(session: &Session) -> Vec<String> {
    let persona = session.persona();

    let model = match known_model(session.model()) {
        Some(model) => format!(
            "{}/{} ({} token context)",
            session.provider(),
            model.id,
            model.context_length
        ),
        None => format!("{}/{}", session.provider(), session.model()),
    };

    let mut lines = vec![
        format!("persona: {} ({})", persona.name, persona.id),
        format!("model:   {}", model),
    ];

    if !persona.description.is_empty() {
        lines.push(format!("about:   {}", persona.description));
    }

    if !persona.tips.is_empty() {
        lines.push("tips:".to_string());

        for tip in &persona.tips {
            lines.push(format!("  - {}", tip));
        }
    }

    lines
}

fn print_greeting(session: &Session) {
    let persona = session.persona();

    for turn in session.transcript().turns() {
        println!("{}\n", Output::Turn(turn, &persona.name));
    }
}

fn print_title(persona: &Persona) {
    let title = if persona.description.is_empty() {
        persona.name.clone()
    } else {
        format!("{} · {}", persona.name, persona.description)
    };

    println!("{}", color::TITLE.maybe_paint(title));
    println!(
        "{}\n",
        color::DIM.maybe_paint(format!(
            "{} {} | {}",
            version::NAME,
            version::VERSION,
            COMMANDS.join(" ")
        ))
    );
}

fn resolve_persona<'p>(
    personas: &'p Personas,
    config: &Config,
    args: &ChatArgs,
) -> &'p Persona {
    let id = args
        .persona
        .as_deref()
        .or(config.persona.as_deref())
        .unwrap_or(DEFAULT_PERSONA);

    match personas.get(id) {
        Some(persona) => persona,
        None => die!(
            "unknown persona \"{}\", run `{} personas` to list the available personas",
            id,
            version::NAME
        ),
    }
}

fn resolve_model(config: &Config, args: &ChatArgs) -> String {
    let model = args
        .model
        .clone()
        .or_else(|| config.openai.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.id.to_string());

    if known_model(&model).is_none() {
        warn!("\"{}\" is not a known OpenAI chat model", model);
    }

    model
}

fn completion_parameters(config: &Config) -> CompletionParameters {
    let defaults = CompletionParameters::default();

    CompletionParameters {
        temperature: config.openai.temperature.unwrap_or(defaults.temperature),
        max_tokens: config.openai.max_tokens.unwrap_or(defaults.max_tokens),
    }
}

/// Submits one line and prints the reply, or the reason there is none.
async fn submit(session: &mut Session, text: String, spinner: bool) {
    let thinking = thinking_message(&session.persona().name);

    let result = with_spinner(&thinking, spinner, session.submit(text)).await;

    match result {
        Ok(reply) => {
            let reply = chat::Message::new(Role::Assistant, reply);

            println!("{}\n", Output::Turn(&reply, &session.persona().name));
        }
        Err(err) => {
            eprintln!("{}", Output::error(err.to_string()));

            if err.kind() == ErrorKind::Authentication {
                eprintln!(
                    "{}",
                    Output::warn("check the OpenAI API key in the config or OPENAI_API_KEY".to_string())
                );
            }

            eprintln!();
        }
    }
}

async fn interactive(session: &mut Session, keybindings: Keybindings) {
    print_title(session.persona());
    print_greeting(session);

    let mut repl = Repl::new(keybindings);
    let spinner = io::stderr().is_terminal();

    while let Some(line) = repl.read_line() {
        match Input::parse(line) {
            Input::Empty => continue,
            Input::Exit => break,
            Input::Reset => {
                session.reset();

                println!("{}\n", Output::text("The conversation was reset.".to_string()));

                print_greeting(session);
            }
            Input::Info => {
                println!("{}\n", Output::text(info_lines(session).join("\n")));
            }
            Input::Submit(text) => submit(session, text, spinner).await,
        }
    }
}

/// Reads one message per line from standard input. Only replies are printed.
async fn piped(session: &mut Session) {
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => die!("failed to read from standard input: {}", err),
        };

        match Input::parse(line) {
            Input::Empty | Input::Info => continue,
            Input::Exit => break,
            Input::Reset => session.reset(),
            Input::Submit(text) => submit(session, text, false).await,
        }
    }
}

pub(crate) async fn chat_cmd(config: &Config, personas: &Personas, args: &ChatArgs) {
    let persona = resolve_persona(personas, config, args).clone();

    // A missing credential halts the program before any conversation
    let api_key = match config.api_key() {
        Ok(api_key) => api_key,
        Err(err) => die!("{}", err),
    };

    let provider = match OpenAIProvider::new(&api_key, config.openai.api_base.as_deref()) {
        Ok(provider) => provider,
        Err(err) => die!("OpenAI API base failed to parse: {}", error_chain(&err)),
    };

    let model = resolve_model(config, args);

    tracing::debug!(persona = %persona.id, model = %model, "starting session");

    let mut session = Session::new(
        persona,
        Box::new(provider),
        model,
        completion_parameters(config),
    );

    if io::stdin().is_terminal() {
        interactive(&mut session, config.keybindings).await;
    } else {
        if io::stdout().is_terminal() {
            eprintln!(
                "{}",
                Output::warn("reading messages from standard input, one per line".to_string())
            );
        }

        piped(&mut session).await;
    }
}
