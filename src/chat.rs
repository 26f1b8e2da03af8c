//! Chat session state machine for the guide screen.
//!
//! A session is Idle or Awaiting-Response; at most one model call is in
//! flight. The async plumbing (spawning the call, polling the handle) lives
//! in the event handler; this type only owns the transcript and the state
//! transitions so they can be tested without a network.

use crate::gemini::ChatReply;
use crate::lang::Language;
use crate::state::{Conversation, Message};

pub struct ChatSession {
    conversation: Conversation,
    awaiting_response: bool,
}

impl ChatSession {
    pub fn new(language: Language) -> Self {
        Self {
            conversation: Conversation::new(language),
            awaiting_response: false,
        }
    }

    /// Accept a submitted message.
    ///
    /// On success the user turn is appended optimistically and the session
    /// enters Awaiting-Response; the returned snapshot is the full transcript
    /// (welcome included) to forward as history, paired with the new text.
    /// Blank input and re-entrant submission are rejected with no effect.
    pub fn begin_submit(&mut self, input: &str) -> Option<(Vec<Message>, String)> {
        if input.trim().is_empty() || self.awaiting_response {
            return None;
        }

        self.conversation.push(Message::user(input));
        self.awaiting_response = true;
        Some((self.conversation.messages().to_vec(), input.to_string()))
    }

    /// Record the client's reply and return to Idle.
    ///
    /// The client absorbs its own failures, so every in-flight call ends
    /// here with a reply to append.
    pub fn complete(&mut self, reply: ChatReply) {
        if !self.awaiting_response {
            return;
        }
        self.conversation.push(Message::model(reply.text, reply.links));
        self.awaiting_response = false;
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Role;

    #[test]
    fn test_first_submission_includes_welcome() {
        let mut session = ChatSession::new(Language::En);
        let (history, text) = session.begin_submit("Plan a trip to Kyoto").unwrap();
        assert_eq!(text, "Plan a trip to Kyoto");
        // Welcome first, then the just-appended user turn
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::Model);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].text, "Plan a trip to Kyoto");
    }

    #[test]
    fn test_blank_input_rejected() {
        let mut session = ChatSession::new(Language::En);
        assert!(session.begin_submit("").is_none());
        assert!(session.begin_submit("   \t").is_none());
        assert_eq!(session.conversation().len(), 1);
        assert!(!session.is_awaiting_response());
    }

    #[test]
    fn test_reentrant_submission_rejected() {
        let mut session = ChatSession::new(Language::En);
        assert!(session.begin_submit("first").is_some());
        let len_before = session.conversation().len();

        // Second submission while awaiting: no call, no duplicate message
        assert!(session.begin_submit("second").is_none());
        assert_eq!(session.conversation().len(), len_before);
        assert!(session.is_awaiting_response());
    }

    #[test]
    fn test_complete_appends_and_returns_to_idle() {
        let mut session = ChatSession::new(Language::En);
        session.begin_submit("hello").unwrap();
        session.complete(ChatReply {
            text: "Konnichiwa!".to_string(),
            links: Vec::new(),
        });

        assert!(!session.is_awaiting_response());
        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, Role::Model);
        assert_eq!(messages[2].text, "Konnichiwa!");

        // Idle again, next submission is accepted
        assert!(session.begin_submit("next").is_some());
    }

    #[test]
    fn test_complete_without_pending_call_ignored() {
        let mut session = ChatSession::new(Language::En);
        session.complete(ChatReply::apology());
        assert_eq!(session.conversation().len(), 1);
    }
}
