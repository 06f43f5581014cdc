//! Pull fenced code blocks out of a finished assistant reply.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w+)?\n(.*?)\n```").expect("fence pattern"));

static FILENAME_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//\s*([A-Za-z0-9_./-]+\.(tsx?|jsx?|css|html|json))").expect("filename pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCode {
    pub filename: String,
    pub content: String,
    pub language: String,
}

fn extension_for(language: &str) -> &'static str {
    match language {
        "tsx" => ".tsx",
        "typescript" | "ts" => ".ts",
        "jsx" => ".jsx",
        "javascript" | "js" => ".js",
        "css" => ".css",
        "html" => ".html",
        "json" => ".json",
        _ => ".txt",
    }
}

/// Every fenced block in `response`, in order. A `// name.ext` comment inside
/// the block names the file; otherwise a timestamped name is generated.
pub fn extract_code_blocks(response: &str) -> Vec<ExtractedCode> {
    let stamp = chrono::Utc::now().timestamp_millis();

    FENCE
        .captures_iter(response)
        .enumerate()
        .map(|(i, caps)| {
            let language = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "javascript".to_string());
            let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

            let filename = match FILENAME_COMMENT.captures(body) {
                Some(named) => named[1].to_string(),
                None => format!("generated-{}-{}{}", stamp, i, extension_for(&language)),
            };

            ExtractedCode {
                filename,
                content: body.trim().to_string(),
                language,
            }
        })
        .collect()
}
