use nu_ansi_term::AnsiGenericString;
use reedline::{self, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, PromptViMode};
use std::borrow::Cow;

use crate::color::{self, MaybePaint};

const USER_PROMPT: &'static str = "[#] ";
const USER_VI_INSERT_PROMPT: &'static str = USER_PROMPT;
const USER_VI_NORMAL_PROMPT: &'static str = "[=] ";
const COMPLETION_MARKER: &'static str = "[/] ";
const USER_MULTLINE_PROMPT: &'static str = "::: ";

pub(crate) fn persona_prompt(persona_name: &str) -> String {
    let prompt_text = format!("[{}] ", persona_name);

    color::PERSONA_PROMPT.maybe_paint(prompt_text).to_string()
}

pub(crate) fn user_prompt() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(USER_PROMPT)
}

pub(crate) fn user_vi_insert_prompt() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(USER_VI_INSERT_PROMPT)
}

pub(crate) fn user_vi_normal_prompt() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(USER_VI_NORMAL_PROMPT)
}

pub(crate) fn completion_marker() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(COMPLETION_MARKER)
}

pub(crate) fn multiline_prompt() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(USER_MULTLINE_PROMPT)
}

/// The busy message shown while the persona composes a reply. Korean names
/// take the subject particle matching their final syllable.
pub(crate) fn thinking_message(persona_name: &str) -> String {
    const HANGUL_SYLLABLES: std::ops::RangeInclusive<u32> = 0xAC00..=0xD7A3;

    match persona_name.chars().last().map(u32::from) {
        Some(c) if HANGUL_SYLLABLES.contains(&c) => {
            // Every 28th syllable has no final consonant
            let particle = if (c - 0xAC00) % 28 == 0 { "가" } else { "이" };

            format!("{}{} 생각 중입니다...", persona_name, particle)
        }
        _ => format!("{} is thinking...", persona_name),
    }
}

pub(crate) struct Prompt {
    user_prompt: String,
    user_vi_normal_prompt: String,
    user_vi_insert_prompt: String,
    user_multiline_prompt: String,
}

impl Default for Prompt {
    fn default() -> Self {
        Prompt {
            user_prompt: user_prompt().to_string(),
            user_vi_insert_prompt: user_vi_insert_prompt().to_string(),
            user_vi_normal_prompt: user_vi_normal_prompt().to_string(),
            user_multiline_prompt: multiline_prompt().to_string(),
        }
    }
}

impl reedline::Prompt for Prompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<'_, str> {
        match prompt_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => Cow::Borrowed(&self.user_vi_normal_prompt),
            PromptEditMode::Vi(PromptViMode::Insert) => Cow::Borrowed(&self.user_vi_insert_prompt),
            _ => Cow::Borrowed(&self.user_prompt),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.user_multiline_prompt)
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}
