use crate::error::Result;
use crate::snapshot::RepositorySnapshot;
use serde::Serialize;
use serde_json::Value;

/// Serialized context, cut to the assembler's character budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPayload {
    text: String,
    truncated: bool,
}

impl ContextPayload {
    /// The payload text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether anything was cut off
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Consumes the payload, returning the text
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Packs repository material into prompt-sized JSON
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_chars: usize,
}

impl ContextAssembler {
    /// Creates an assembler with a character budget
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// The character budget
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Context for a freshly collected snapshot
    pub fn from_snapshot(&self, snapshot: &RepositorySnapshot) -> Result<ContextPayload> {
        self.serialize(snapshot)
    }

    /// Context supplied by a caller as arbitrary JSON
    pub fn from_value(&self, value: &Value) -> Result<ContextPayload> {
        self.serialize(value)
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<ContextPayload> {
        let json = serde_json::to_string(value)?;
        Ok(self.bound(json))
    }

    /// Cuts `text` to exactly the budget when it is longer; shorter text is untouched
    pub fn bound(&self, mut text: String) -> ContextPayload {
        let cut = text.char_indices().nth(self.max_chars).map(|(idx, _)| idx);
        match cut {
            Some(idx) => {
                text.truncate(idx);
                ContextPayload { text, truncated: true }
            }
            None => ContextPayload {
                text,
                truncated: false,
            },
        }
    }
}

/// Whether a JSON context carries a non-blank `readmeText`
pub fn readme_present(context: &Value) -> bool {
    context
        .get("readmeText")
        .and_then(Value::as_str)
        .map_or(false, |text| !text.trim().is_empty())
}
