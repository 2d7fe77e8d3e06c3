use std::collections::HashMap;

use crate::diagnostics::{self, Diagnostic};
use crate::syntax;
use crate::translate::TranslateOptions;

/// Everything the server knows about one open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub text: String,
    pub version: i32,
    pub syntax: Vec<syntax::Definition>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentState {
    pub fn analyze(text: String, version: i32, options: TranslateOptions) -> Self {
        let result = diagnostics::check(&text, options);
        Self {
            text,
            version,
            syntax: result.syntax,
            diagnostics: result.diagnostics,
        }
    }
}

/// Open documents keyed by URI
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, DocumentState>,
    options: TranslateOptions,
}

impl DocumentStore {
    pub fn new(options: TranslateOptions) -> Self {
        Self {
            documents: HashMap::new(),
            options,
        }
    }

    /// Store (or replace) the document and return its fresh analysis
    pub fn update(&mut self, uri: &str, text: String, version: i32) -> &DocumentState {
        let state = DocumentState::analyze(text, version, self.options);
        tracing::debug!(
            uri = %uri,
            version,
            diagnostics = state.diagnostics.len(),
            "Analyzed document"
        );
        self.documents.insert(uri.to_string(), state);
        &self.documents[uri]
    }

    pub fn close(&mut self, uri: &str) -> Option<DocumentState> {
        self.documents.remove(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&DocumentState> {
        self.documents.get(uri)
    }
}
