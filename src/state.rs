//! Conversation data model shared by the TUI and the one-shot CLI.

use serde::{Deserialize, Serialize};

use crate::lang::Language;

/// The sender of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Model,
}

/// Where a grounding link points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkSource {
    Maps,
    Web,
}

/// A source reference attached by the model to support part of its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingLink {
    pub title: String,
    pub uri: String,
    pub source: LinkSource,
}

/// A single message in the guide conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Unix millis, for the timestamp shown under each bubble
    pub timestamp: i64,
    pub links: Vec<GroundingLink>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), Vec::new())
    }

    pub fn model(text: impl Into<String>, links: Vec<GroundingLink>) -> Self {
        Self::new(Role::Model, text.into(), links)
    }

    fn new(role: Role, text: String, links: Vec<GroundingLink>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text,
            timestamp: chrono::Utc::now().timestamp_millis(),
            links,
        }
    }
}

/// The transcript of one guide session, in strict append order.
///
/// The first element is always a synthetic welcome message seeded locally,
/// never the result of an outbound call. Messages are never mutated or
/// removed; the conversation only goes away with the session itself.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(language: Language) -> Self {
        Self {
            messages: vec![Message::model(welcome_text(language), Vec::new())],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn welcome_text(language: Language) -> &'static str {
    match language {
        Language::En => {
            "Konnichiwa! (Hello!) I am your personal Japan travel guide.\n\n\
             I can help you with:\n\
             * **Itineraries:** \"Plan a 3-day trip to Kyoto\"\n\
             * **Food:** \"Best ramen in Osaka?\"\n\
             * **Etiquette:** \"How do I use chopsticks properly?\"\n\
             * **Transport:** \"How to use the Shinkansen?\"\n\n\
             What would you like to know?"
        }
        Language::Es => {
            "¡Konnichiwa! (¡Hola!) Soy tu guía personal de viajes por Japón.\n\n\
             Puedo ayudarte con itinerarios, comida, etiqueta y transporte.\n\
             ¿Qué te gustaría saber?"
        }
        Language::Fr => {
            "Konnichiwa ! (Bonjour !) Je suis votre guide de voyage personnel au Japon.\n\n\
             Je peux vous aider avec les itinéraires, la cuisine, l'étiquette et les transports.\n\
             Que voulez-vous savoir ?"
        }
        Language::Zh => {
            "Konnichiwa!(你好!)我是您的日本私人旅行向导。\n\n\
             我可以帮您规划行程、寻找美食、了解礼仪和交通。\n\
             您想了解什么?"
        }
        Language::Ko => {
            "곤니치와! (안녕하세요!) 저는 당신의 일본 여행 가이드입니다.\n\n\
             일정, 음식, 예절, 교통에 대해 도와드릴 수 있습니다.\n\
             무엇을 알고 싶으신가요?"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_seeds_welcome_first() {
        let convo = Conversation::new(Language::En);
        assert_eq!(convo.len(), 1);
        assert_eq!(convo.messages()[0].role, Role::Model);
        assert!(convo.messages()[0].text.starts_with("Konnichiwa"));
        assert!(convo.messages()[0].links.is_empty());
    }

    #[test]
    fn test_push_preserves_order() {
        let mut convo = Conversation::new(Language::En);
        convo.push(Message::user("first"));
        convo.push(Message::model("second", Vec::new()));
        let texts: Vec<&str> = convo.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts[1], "first");
        assert_eq!(texts[2], "second");
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id, b.id);
    }
}
