pub mod conversation;

pub mod settings {
    use serde::{Deserialize, Serialize};

    /// Which upstream wire shape the ingestor speaks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum ProviderKind {
        /// OpenAI-compatible `/v1/chat/completions` streaming.
        #[default]
        OpenAI,
        /// Google `streamGenerateContent` with `alt=sse`.
        Gemini,
    }

    impl ProviderKind {
        pub fn as_str(&self) -> &'static str {
            match self {
                ProviderKind::OpenAI => "openai",
                ProviderKind::Gemini => "gemini",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim().to_lowercase().as_str() {
                "openai" | "claude" | "chat-completions" => Some(ProviderKind::OpenAI),
                "gemini" | "google" => Some(ProviderKind::Gemini),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Endpoint {
        pub base_url: String,
        pub model: String,
        #[serde(default)]
        pub api_key: Option<String>,
    }

    impl Endpoint {
        /// The configured key, if it is present and not blank.
        pub fn credential(&self) -> Option<&str> {
            self.api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SafetySetting {
        pub category: String,
        pub threshold: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct GenerationConfig {
        pub temperature: f64,
        pub top_k: u32,
        pub top_p: f64,
        pub max_output_tokens: u32,
        pub safety: Vec<SafetySetting>,
    }

    impl Default for GenerationConfig {
        fn default() -> Self {
            Self {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 8192,
                safety: vec![SafetySetting {
                    category: "HARM_CATEGORY_HARASSMENT".into(),
                    threshold: "BLOCK_MEDIUM_AND_ABOVE".into(),
                }],
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct StreamSettings {
        pub provider: ProviderKind,
        pub openai: Endpoint,
        pub gemini: Endpoint,
        pub generation: GenerationConfig,
        /// Overall request timeout. `None` leaves a stalled upstream blocking.
        pub request_timeout_secs: Option<u64>,
    }

    impl StreamSettings {
        pub fn active_endpoint(&self) -> &Endpoint {
            match self.provider {
                ProviderKind::OpenAI => &self.openai,
                ProviderKind::Gemini => &self.gemini,
            }
        }
    }

    impl Default for StreamSettings {
        fn default() -> Self {
            Self {
                provider: ProviderKind::OpenAI,
                openai: Endpoint {
                    base_url: "https://api.openai.com".into(),
                    model: "gpt-4o-mini".into(),
                    api_key: None,
                },
                gemini: Endpoint {
                    base_url: "https://generativelanguage.googleapis.com".into(),
                    model: "gemini-2.0-flash-exp".into(),
                    api_key: None,
                },
                generation: GenerationConfig::default(),
                request_timeout_secs: None,
            }
        }
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        User,
        Assistant,
    }

    impl Role {
        pub fn as_str(&self) -> &'static str {
            match self {
                Role::User => "user",
                Role::Assistant => "assistant",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: Role,
        pub content: String,
    }

    impl ChatMessage {
        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: Role::User,
                content: content.into(),
            }
        }

        pub fn assistant(content: impl Into<String>) -> Self {
            Self {
                role: Role::Assistant,
                content: content.into(),
            }
        }
    }

    /// One incremental fragment of assistant text.
    pub type TextDelta = String;
}
