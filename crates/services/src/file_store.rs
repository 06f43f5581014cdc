//! In-memory project files generated during a chat session.
//!
//! The store is an ordinary owned value: whoever needs it is handed a
//! reference. Observers register with [`FileStore::subscribe`] and receive a
//! [`FileEvent`] after every mutation, in subscription order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::code_blocks::ExtractedCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    pub name: String,
    pub kind: FileKind,
    pub path: String,
    pub content: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(String),
    Updated(String),
    Deleted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&FileEvent) + Send + Sync>;

#[derive(Default)]
pub struct FileStore {
    files: BTreeMap<String, FileItem>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with a minimal Vite + React project.
    pub fn with_starter_project() -> Self {
        let mut store = Self::new();
        let package = serde_json::json!({
            "name": "vibe-coder-project",
            "private": true,
            "version": "1.0.0",
            "type": "module",
            "scripts": { "dev": "vite", "build": "vite build", "preview": "vite preview" },
            "dependencies": { "react": "^18.3.1", "react-dom": "^18.3.1" },
            "devDependencies": {
                "@vitejs/plugin-react": "^4.0.0",
                "@types/react": "^18.0.0",
                "@types/react-dom": "^18.0.0",
                "typescript": "^5.0.0",
                "vite": "^4.4.0"
            }
        });
        let package = serde_json::to_string_pretty(&package).unwrap_or_default();

        store.insert(file_item("package.json", &package, Some("json")));
        store.insert(file_item("index.html", STARTER_INDEX_HTML, Some("html")));
        store.insert(file_item("vite.config.ts", STARTER_VITE_CONFIG, Some("typescript")));
        store.insert(FileItem {
            name: "src".into(),
            kind: FileKind::Folder,
            path: "src".into(),
            content: None,
            language: None,
        });
        store.insert(file_item("src/main.tsx", STARTER_MAIN_TSX, Some("typescript")));
        store.insert(file_item("src/App.tsx", STARTER_APP_TSX, Some("typescript")));
        store.insert(file_item("src/index.css", STARTER_INDEX_CSS, Some("css")));
        store
    }

    fn insert(&mut self, item: FileItem) {
        self.files.insert(item.path.clone(), item);
    }

    /// Store `filename` under `src/` (unless it already lives there) and
    /// notify observers.
    pub fn create_file(&mut self, filename: &str, content: &str, language: Option<&str>) -> String {
        let path = if filename.starts_with("src/") {
            filename.to_string()
        } else {
            format!("src/{}", filename)
        };
        let language = language.map(str::to_string).unwrap_or_else(|| language_for(filename).to_string());
        let existed = self.files.contains_key(&path);

        self.insert(file_item(&path, content, Some(&language)));
        tracing::debug!(%path, existed, "stored generated file");

        let event = if existed {
            FileEvent::Updated(path.clone())
        } else {
            FileEvent::Created(path.clone())
        };
        self.notify(&event);
        path
    }

    pub fn get_file(&self, path: &str) -> Option<&FileItem> {
        self.files.get(path)
    }

    /// Folders first, then files, each group by name.
    pub fn all_files(&self) -> Vec<&FileItem> {
        let mut items: Vec<&FileItem> = self.files.values().collect();
        items.sort_by(|a, b| {
            let folder_first = (a.kind != FileKind::Folder).cmp(&(b.kind != FileKind::Folder));
            folder_first.then_with(|| a.name.cmp(&b.name))
        });
        items
    }

    /// Replace the content of an existing file. Unknown paths are left alone.
    pub fn update_file(&mut self, path: &str, content: &str) -> bool {
        let Some(item) = self.files.get_mut(path) else {
            return false;
        };
        item.content = Some(content.to_string());
        self.notify(&FileEvent::Updated(path.to_string()));
        true
    }

    pub fn delete_file(&mut self, path: &str) -> bool {
        let removed = self.files.remove(path).is_some();
        if removed {
            self.notify(&FileEvent::Deleted(path.to_string()));
        }
        removed
    }

    /// Store each block; returns the stored paths in block order.
    pub fn create_files_from_code(&mut self, blocks: &[ExtractedCode]) -> Vec<String> {
        blocks
            .iter()
            .map(|b| self.create_file(&b.filename, &b.content, Some(&b.language)))
            .collect()
    }

    /// Path → content for every file that has content.
    pub fn project_bundle(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .filter(|(_, item)| item.kind == FileKind::File)
            .filter_map(|(path, item)| item.content.clone().map(|c| (path.clone(), c)))
            .collect()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&FileEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn notify(&self, event: &FileEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

fn file_item(path: &str, content: &str, language: Option<&str>) -> FileItem {
    FileItem {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        kind: FileKind::File,
        path: path.to_string(),
        content: Some(content.to_string()),
        language: language.map(str::to_string),
    }
}

pub fn language_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "tsx" | "ts" => "typescript",
        "jsx" | "js" => "javascript",
        "css" => "css",
        "html" => "html",
        "json" => "json",
        "md" => "markdown",
        _ => "text",
    }
}

const STARTER_INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Vibe Coder Project</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>"#;

const STARTER_VITE_CONFIG: &str = r#"import { defineConfig } from 'vite'
import react from '@vitejs/plugin-react'

export default defineConfig({
  plugins: [react()],
  server: {
    port: 5173,
    host: true
  }
})"#;

const STARTER_MAIN_TSX: &str = r#"import React from 'react'
import ReactDOM from 'react-dom/client'
import App from './App'
import './index.css'

ReactDOM.createRoot(document.getElementById('root')!).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>,
)"#;

const STARTER_APP_TSX: &str = r#"function App() {
  return (
    <main className="min-h-screen flex items-center justify-center">
      <h1 className="text-4xl font-bold">Vibe Coder</h1>
    </main>
  )
}

export default App"#;

const STARTER_INDEX_CSS: &str = r#"@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap');

* {
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}

body {
  font-family: 'Inter', sans-serif;
  line-height: 1.5;
  -webkit-font-smoothing: antialiased;
  -moz-osx-font-smoothing: grayscale;
}

#root {
  width: 100%;
  min-height: 100vh;
}"#;
