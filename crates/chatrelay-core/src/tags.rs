//! Message tags: ordered key/value annotations carried with a line.

use serde::{Deserialize, Serialize};

/// A single IRCv3 message tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTag {
    pub name: String,
    pub value: Option<String>,
}

impl MessageTag {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// A valueless tag such as `+draft/typing`.
    pub fn flag(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

/// Ordered tag collection. `Clone` is a deep copy; nothing is shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTagSet {
    tags: Vec<MessageTag>,
}

impl MessageTagSet {
    pub fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Builder-style append.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.push(MessageTag::new(name, value));
        self
    }

    /// Append at the end.
    pub fn push(&mut self, tag: MessageTag) {
        self.tags.push(tag);
    }

    /// Insert at the front.
    pub fn prepend(&mut self, tag: MessageTag) {
        self.tags.insert(0, tag);
    }

    pub fn find(&self, name: &str) -> Option<&MessageTag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Value of the first tag called `name`, if it has one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(|t| t.value.as_deref())
    }

    /// Remove the first tag called `name`.
    pub fn remove(&mut self, name: &str) -> Option<MessageTag> {
        let idx = self.tags.iter().position(|t| t.name == name)?;
        Some(self.tags.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Wire prefix: `@a=1;b;c=x\sy `, or an empty string when there are no tags.
    pub fn to_prefix(&self) -> String {
        if self.tags.is_empty() {
            return String::new();
        }
        let mut out = String::from("@");
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            out.push_str(&tag.name);
            if let Some(value) = &tag.value {
                out.push('=');
                escape_value(value, &mut out);
            }
        }
        out.push(' ');
        out
    }
}

fn escape_value(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            ';' => out.push_str("\\:"),
            ' ' => out.push_str("\\s"),
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
}
