use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::lang::Language;
use crate::state::{GroundingLink, LinkSource, Message, Role};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Only the most recent messages are forwarded to keep context relevant
/// and bound prompt size
const HISTORY_WINDOW: usize = 10;

const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't generate a response.";
const CONNECTION_APOLOGY: &str = "Sorry, I'm having trouble connecting to the travel guide \
service right now. Please try again later.";

/// Normalized result of one model call
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub links: Vec<GroundingLink>,
}

impl ChatReply {
    /// The reply shown when the call could not be completed
    pub fn apology() -> Self {
        Self {
            text: CONNECTION_APOLOGY.to_string(),
            links: Vec::new(),
        }
    }
}

/// Per-request configuration, spelled out so there are no hidden defaults
pub struct RequestConfig {
    pub system_instruction: String,
    pub enable_maps_grounding: bool,
}

impl RequestConfig {
    pub fn guide(language: Language) -> Self {
        Self {
            system_instruction: system_instruction(language),
            enable_maps_grounding: true,
        }
    }
}

fn system_instruction(language: Language) -> String {
    format!(
        "You are \"NihonGo Guide\", an expert, friendly, and polite travel assistant \
         for international travelers visiting Japan.\n\
         Your goal is to help users plan trips, understand culture, find restaurants, \
         and navigate transportation.\n\
         - Always provide cultural context when relevant (e.g., etiquette).\n\
         - If asked about locations, try to provide specific recommendations.\n\
         - Keep answers concise but informative.\n\
         - Use formatting (bullet points, bold text) to make it readable.\n\
         - If you suggest a place, try to mention the nearest train station if known.\n\
         - Be enthusiastic about Japan!\n\
         - IMPORTANT: Please respond in the {} language.\n",
        language.english_name()
    )
}

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize, Clone)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Clone)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "googleMaps")]
    google_maps: EmptyConfig,
}

#[derive(Serialize)]
struct EmptyConfig {}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "groundingMetadata")]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct GroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    maps: Option<ChunkSource>,
    web: Option<ChunkSource>,
}

#[derive(Deserialize)]
struct ChunkSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one message with the trailing window of `history` for context.
    ///
    /// This never fails from the caller's point of view: transport and API
    /// errors are absorbed here and come back as an apology reply, so the
    /// chat degrades to a normal-looking message instead of an error state.
    pub async fn send(
        &self,
        history: &[Message],
        new_message: &str,
        language: Language,
    ) -> ChatReply {
        match self.request(history, new_message, language).await {
            Ok(reply) => reply,
            Err(_) => ChatReply::apology(),
        }
    }

    async fn request(
        &self,
        history: &[Message],
        new_message: &str,
        language: Language,
    ) -> Result<ChatReply> {
        let config = RequestConfig::guide(language);
        let request = GenerateRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: config.system_instruction,
                }],
            },
            contents: build_contents(history, new_message),
            tools: if config.enable_maps_grounding {
                vec![Tool {
                    google_maps: EmptyConfig {},
                }]
            } else {
                Vec::new()
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Gemini request failed with status: {}",
                response.status()
            ));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(reply_from_response(body))
    }
}

/// Map the trailing window of the conversation plus the new message into
/// role-tagged turns, oldest first
fn build_contents(history: &[Message], new_message: &str) -> Vec<Content> {
    let skip = history.len().saturating_sub(HISTORY_WINDOW);
    let mut contents: Vec<Content> = history[skip..]
        .iter()
        .map(|msg| Content {
            role: match msg.role {
                Role::User => "user",
                Role::Model => "model",
            }
            .to_string(),
            parts: vec![Part {
                text: msg.text.clone(),
            }],
        })
        .collect();

    contents.push(Content {
        role: "user".to_string(),
        parts: vec![Part {
            text: new_message.to_string(),
        }],
    });

    contents
}

fn reply_from_response(response: GenerateResponse) -> ChatReply {
    let (text, chunks) = match response.candidates.into_iter().next() {
        Some(candidate) => {
            let text = candidate
                .content
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .map(|p| p.text)
                        .collect::<Vec<_>>()
                        .join("")
                })
                .unwrap_or_default();
            let chunks = candidate
                .grounding_metadata
                .map(|m| m.grounding_chunks)
                .unwrap_or_default();
            (text, chunks)
        }
        None => (String::new(), Vec::new()),
    };

    let text = if text.is_empty() {
        EMPTY_REPLY_FALLBACK.to_string()
    } else {
        text
    };

    ChatReply {
        text,
        links: extract_links(chunks),
    }
}

fn extract_links(chunks: Vec<GroundingChunk>) -> Vec<GroundingLink> {
    chunks.into_iter().filter_map(link_from_chunk).collect()
}

/// Maps chunks win over web chunks; anything that is neither is dropped
fn link_from_chunk(chunk: GroundingChunk) -> Option<GroundingLink> {
    match chunk {
        GroundingChunk {
            maps: Some(ChunkSource {
                uri: Some(uri),
                title,
            }),
            ..
        } => Some(GroundingLink {
            title: title.unwrap_or_else(|| "View on Google Maps".to_string()),
            uri,
            source: LinkSource::Maps,
        }),
        GroundingChunk {
            web: Some(ChunkSource {
                uri: Some(uri),
                title,
            }),
            ..
        } => Some(GroundingLink {
            title: title.unwrap_or_else(|| "Source".to_string()),
            uri,
            source: LinkSource::Web,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("msg-{}", i))
                } else {
                    Message::model(format!("msg-{}", i), Vec::new())
                }
            })
            .collect()
    }

    #[test]
    fn test_short_history_forwarded_whole() {
        let history = history_of(4);
        let contents = build_contents(&history, "question");
        assert_eq!(contents.len(), 5);
        for (i, content) in contents.iter().take(4).enumerate() {
            assert_eq!(content.parts[0].text, format!("msg-{}", i));
        }
        assert_eq!(contents[4].parts[0].text, "question");
        assert_eq!(contents[4].role, "user");
    }

    #[test]
    fn test_long_history_trimmed_to_window() {
        let history = history_of(14);
        let contents = build_contents(&history, "question");
        // 10 history turns plus the new message
        assert_eq!(contents.len(), 11);
        assert_eq!(contents[0].parts[0].text, "msg-4");
        assert_eq!(contents[9].parts[0].text, "msg-13");
        assert_eq!(contents[10].parts[0].text, "question");
    }

    #[test]
    fn test_roles_mapped() {
        let history = vec![Message::user("a"), Message::model("b", Vec::new())];
        let contents = build_contents(&history, "c");
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
    }

    #[test]
    fn test_empty_history_sends_only_new_message() {
        let contents = build_contents(&[], "hello");
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
    }

    fn chunks_from_json(json: &str) -> Vec<GroundingChunk> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_links_dispatch() {
        let chunks = chunks_from_json(
            r#"[
                {"maps": {"uri": "u1"}},
                {"web": {"uri": "u2", "title": "T"}},
                {"retrievedContext": {}}
            ]"#,
        );
        let links = extract_links(chunks);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].source, LinkSource::Maps);
        assert_eq!(links[0].uri, "u1");
        assert_eq!(links[0].title, "View on Google Maps");
        assert_eq!(links[1].source, LinkSource::Web);
        assert_eq!(links[1].uri, "u2");
        assert_eq!(links[1].title, "T");
    }

    #[test]
    fn test_extract_links_keeps_metadata_order() {
        let chunks = chunks_from_json(
            r#"[
                {"web": {"uri": "w1"}},
                {"maps": {"uri": "m1", "title": "Shibuya"}},
                {"web": {"uri": "w2"}}
            ]"#,
        );
        let links = extract_links(chunks);
        let uris: Vec<&str> = links.iter().map(|l| l.uri.as_str()).collect();
        assert_eq!(uris, vec!["w1", "m1", "w2"]);
        assert_eq!(links[1].title, "Shibuya");
    }

    #[test]
    fn test_chunk_without_uri_dropped() {
        let chunks = chunks_from_json(r#"[{"maps": {"title": "no uri"}}, {"web": {}}]"#);
        assert!(extract_links(chunks).is_empty());
    }

    #[test]
    fn test_empty_reply_falls_back() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": []}}]}"#).unwrap();
        let reply = reply_from_response(response);
        assert_eq!(reply.text, EMPTY_REPLY_FALLBACK);
        assert!(reply.links.is_empty());
    }

    #[test]
    fn test_no_candidates_falls_back() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(reply_from_response(response).text, EMPTY_REPLY_FALLBACK);
    }

    #[tokio::test]
    async fn test_send_parses_text_and_links() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Try Ichiran in "}, {"text": "Shibuya."}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"maps": {"uri": "https://maps.google.com/x"}},
                        {"web": {"uri": "https://example.com", "title": "Ramen guide"}}
                    ]
                }
            }]
        }"#;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = GeminiClient::with_base_url("test-key", DEFAULT_MODEL, &server.url());
        let reply = client.send(&[], "best ramen?", Language::En).await;

        mock.assert_async().await;
        assert_eq!(reply.text, "Try Ichiran in Shibuya.");
        assert_eq!(reply.links.len(), 2);
        assert_eq!(reply.links[0].source, LinkSource::Maps);
        assert_eq!(reply.links[1].title, "Ramen guide");
    }

    #[tokio::test]
    async fn test_send_absorbs_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .with_status(500)
            .create_async()
            .await;

        let client = GeminiClient::with_base_url("test-key", DEFAULT_MODEL, &server.url());
        let reply = client.send(&[], "hello", Language::En).await;
        assert_eq!(reply, ChatReply::apology());
    }

    #[tokio::test]
    async fn test_send_absorbs_transport_error() {
        // Nothing listens here; the connection is refused
        let client = GeminiClient::with_base_url("test-key", DEFAULT_MODEL, "http://127.0.0.1:9");
        let reply = client.send(&[], "hello", Language::En).await;
        assert_eq!(reply, ChatReply::apology());
    }
}
