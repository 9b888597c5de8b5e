use serde::{Deserialize, Serialize};

/// One recognized word as returned by the recognition server.
///
/// The server's word schema (text, timing, confidence, ...) is treated as an
/// open record and carried through to the output untouched, so this is a
/// transparent wrapper around a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(pub serde_json::Map<String, serde_json::Value>);

impl Word {
    /// Convenience accessor for the word's text field, when present.
    pub fn text(&self) -> Option<&str> {
        self.0.get("word").and_then(|v| v.as_str())
    }
}

/// The ordered list of recognized words for a whole session.
///
/// Words are appended a whole reply-sequence at a time, in reply-arrival
/// order, which on a strict request/reply connection equals audio order.
#[derive(Debug, Default)]
pub struct Transcript {
    words: Vec<Word>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one reply's word sequence, preserving its internal order.
    pub fn append(&mut self, words: Vec<Word>) {
        self.words.extend(words);
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    /// Render the transcript as a single compact JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.words)
    }
}
