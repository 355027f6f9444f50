//! Personas are the data which distinguish one chat character from another: the
//! instruction sent ahead of every request, the greeting which seeds a fresh
//! conversation, and the informational text shown to the user. The controller
//! itself is the same for every persona.

use lazy_static::lazy_static;
use std::collections::BTreeMap;

use crate::config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Persona {
    /// The identifier used on the command line and in the config
    pub id: String,
    /// The display name
    pub name: String,
    /// The instruction which defines the character, sent as the
    /// leading system message of every request
    pub instruction: String,
    /// The first message of every conversation
    pub greeting: String,
    /// A one-line summary of the character
    pub description: String,
    /// Hints on how to get the most out of the conversation
    pub tips: Vec<String>,
}

pub(crate) const DEFAULT_PERSONA: &str = "poet";

const POET_INSTRUCTION: &str = "당신은 한국의 유명한 시인입니다. \n\
    사용자의 말에 깊이 있고 감성적으로 응답하며, 종종 시나 시적인 표현을 사용합니다.\n\
    간단한 질문에도 철학적이고 수사적인 답변을 제공합니다.\n\
    따뜻하고 공감하는 목소리로 대화하며, 사람의 감정을 이해하려고 노력합니다.\n\
    시적인 언어와 깊이 있는 메시지로 상대방을 감동시키려고 합니다.";

const POET_GREETING: &str = "안녕하세요. 나는 시인입니다.\n\n\
    이 세상의 많은 것들이 시의 재료가 됩니다. 당신의 이야기, 감정, 생각들을 나누어주시면 저도 함께 그것을 시적으로 바라보겠습니다.\n\n\
    무엇을 생각하고 계신가요?";

const PHILOSOPHER_INSTRUCTION: &str = "당신은 한국의 사려 깊은 철학자입니다.\n\
    사용자의 말에 차분하고 논리적으로 응답하며, 질문의 전제를 되묻고 개념을 명확히 합니다.\n\
    간단한 질문에도 그 뒤에 숨은 근본적인 물음을 함께 탐구합니다.\n\
    동서양 철학자들의 사상을 자연스럽게 인용하되, 어렵지 않은 말로 설명합니다.\n\
    상대방이 스스로 생각을 정리하고 답을 찾아가도록 돕습니다.";

const PHILOSOPHER_GREETING: &str = "안녕하세요. 나는 철학자입니다.\n\n\
    우리가 당연하게 여기는 것들 속에 가장 깊은 질문이 숨어 있습니다. 당신의 고민이나 궁금함을 들려주시면 함께 천천히 생각해 보겠습니다.\n\n\
    오늘은 어떤 질문을 품고 계신가요?";

lazy_static! {
    static ref BUILTIN_PERSONAS: [Persona; 2] = [
        Persona {
            id: "poet".to_string(),
            name: "시인".to_string(),
            instruction: POET_INSTRUCTION.to_string(),
            greeting: POET_GREETING.to_string(),
            description: "감성적이고 시적인 응답".to_string(),
            tips: vec![
                "당신의 감정이나 생각을 자유롭게 표현해보세요".to_string(),
                "깊이 있는 대화를 나누려면 구체적인 질문이 좋습니다".to_string(),
            ],
        },
        Persona {
            id: "philosopher".to_string(),
            name: "철학자".to_string(),
            instruction: PHILOSOPHER_INSTRUCTION.to_string(),
            greeting: PHILOSOPHER_GREETING.to_string(),
            description: "차분하고 논리적인 성찰".to_string(),
            tips: vec![
                "정답이 없는 질문일수록 좋은 대화가 됩니다".to_string(),
                "당신의 생각에 반론을 요청해보세요".to_string(),
            ],
        },
    ];
}

impl From<(&String, &config::Persona)> for Persona {
    fn from((id, value): (&String, &config::Persona)) -> Self {
        Persona {
            id: id.clone(),
            name: value.name.clone().unwrap_or_else(|| id.clone()),
            instruction: value.instruction.clone(),
            greeting: value.greeting.clone(),
            description: value.description.clone().unwrap_or_default(),
            tips: value.tips.clone(),
        }
    }
}

/// The catalogue of personas available to a session
pub(crate) struct Personas {
    personas: Vec<Persona>,
}

impl Personas {
    pub(crate) fn builtin() -> Personas {
        Personas {
            personas: BUILTIN_PERSONAS.to_vec(),
        }
    }

    /// The built-in personas, with those defined in the config added. A
    /// configured persona replaces a built-in persona with the same id.
    pub(crate) fn with_overrides(overrides: &BTreeMap<String, config::Persona>) -> Personas {
        let mut catalogue = Personas::builtin();

        for entry in overrides {
            let persona: Persona = entry.into();

            match catalogue.personas.iter_mut().find(|p| p.id == persona.id) {
                Some(builtin) => *builtin = persona,
                None => catalogue.personas.push(persona),
            }
        }

        catalogue
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }
}
