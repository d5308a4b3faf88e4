use serde::{Deserialize, Serialize};

// One turn of a chat conversation, in the upstream wire format
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

// Inbound /api/chat request body
#[derive(Deserialize, Clone)]
pub struct ChatRequest {
    pub developer_message: String,
    // The latest user turn; the frontend also appends it to
    // conversation_history, which is what gets forwarded
    pub user_message: String,
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub model: Option<String>,
    pub api_key: String,
}

// Upstream chat-completion request format
#[derive(Serialize, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

// One parsed SSE chunk of a streamed completion
#[derive(Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

#[derive(Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}
