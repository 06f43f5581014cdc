//! Scripted replies streamed word by word when no upstream is reachable.

use futures::Stream;
use rand::Rng;
use std::time::Duration;

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];
const CODING_WORDS: &[&str] = &["code", "build", "create", "app", "website", "api"];

const GREETING: &[&str] = &[
    "Hello! I'm Vibe Coder, your AI coding assistant. ",
    "I can generate code, debug problems, and set up live previews for your projects.\n\n",
    "I work well with React components, Node.js APIs, databases, and full-stack deployments. ",
    "What would you like to build today?",
];

const CODING: &[&str] = &[
    "I'll help you build that! Here is a starting structure you can preview right away.\n\n",
    "```tsx\n// Component.tsx\nimport React from 'react';\n\nconst Component = () => {\n  return (\n    <div className=\"p-8 bg-gradient-to-r from-blue-500 to-purple-600 text-white\">\n      <h1 className=\"text-4xl font-bold mb-4\">Hello Vibe Coder!</h1>\n      <p className=\"text-xl\">Generated just for you ⚡</p>\n    </div>\n  );\n};\n\nexport default Component;\n```\n\n",
    "```tsx\n// App.tsx\nimport React from 'react';\nimport Component from './Component';\n\nfunction App() {\n  return (\n    <div className=\"min-h-screen bg-gray-100\">\n      <Component />\n    </div>\n  );\n}\n\nexport default App;\n```\n\n",
    "✅ Files created! Open the project files to see what changed.",
];

const GENERAL: &[&str] = &[
    "That's a great question! I can help with coding, debugging, and general development work. ",
    "Full-stack apps, API integrations, and polished user interfaces are my specialty. ",
    "What project or feature would you like to work on?",
];

/// Which canned reply a message gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Greeting,
    Coding,
    General,
}

impl ReplyKind {
    pub fn sentences(&self) -> &'static [&'static str] {
        match self {
            ReplyKind::Greeting => GREETING,
            ReplyKind::Coding => CODING,
            ReplyKind::General => GENERAL,
        }
    }

    /// The full reply, exactly as its fragments concatenate.
    pub fn text(&self) -> String {
        self.sentences().concat()
    }
}

/// Case-insensitive substring match; greetings win over coding requests.
pub fn select_reply(last_user_text: &str) -> ReplyKind {
    let lower = last_user_text.to_lowercase();
    let has_any = |keys: &[&str]| keys.iter().any(|key| lower.contains(key));

    if has_any(GREETING_WORDS) {
        ReplyKind::Greeting
    } else if has_any(CODING_WORDS) {
        ReplyKind::Coding
    } else {
        ReplyKind::General
    }
}

/// Split on single spaces; every word after the first keeps one leading space.
pub fn word_fragments(sentence: &str) -> impl Iterator<Item = String> + '_ {
    sentence.split(' ').enumerate().map(|(i, word)| {
        if i == 0 {
            word.to_string()
        } else {
            format!(" {}", word)
        }
    })
}

/// Simulated typing latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub word_min: Duration,
    pub word_jitter: Duration,
    pub sentence_pause: Duration,
}

impl Pacing {
    pub fn typing() -> Self {
        Self {
            word_min: Duration::from_millis(30),
            word_jitter: Duration::from_millis(70),
            sentence_pause: Duration::from_millis(100),
        }
    }

    pub fn instant() -> Self {
        Self {
            word_min: Duration::ZERO,
            word_jitter: Duration::ZERO,
            sentence_pause: Duration::ZERO,
        }
    }

    fn word_delay(&self) -> Duration {
        let jitter = self.word_jitter.as_millis() as u64;
        if jitter == 0 {
            return self.word_min;
        }
        self.word_min + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::typing()
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Stream the canned reply for `last_user_text`. Never fails.
pub fn produce_mock_deltas(
    last_user_text: &str,
    pacing: Pacing,
) -> impl Stream<Item = String> + Send + 'static {
    let reply = select_reply(last_user_text);
    tracing::debug!(?reply, "streaming scripted reply");

    async_stream::stream! {
        let mut first = true;
        for (n, sentence) in reply.sentences().iter().enumerate() {
            if n > 0 {
                pause(pacing.sentence_pause).await;
            }
            for fragment in word_fragments(sentence) {
                if !first {
                    pause(pacing.word_delay()).await;
                }
                first = false;
                yield fragment;
            }
        }
    }
}
