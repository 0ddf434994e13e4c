use serde::{Deserialize, Serialize};

use super::LanguageKey;

/// A chapter as stored in the library.
///
/// Numbers are kept as the strings the source reported them, an empty string
/// meaning the chapter has no number (oneshots, extras).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub chapter_number: String,
    #[serde(default)]
    pub volume_number: String,
    #[serde(default)]
    pub language_key: LanguageKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub time: i64,
}

impl Chapter {
    /// Group name with absent and empty treated the same.
    pub fn group(&self) -> &str {
        self.group_name.as_deref().unwrap_or_default()
    }

    pub fn has_chapter_number(&self) -> bool {
        !self.chapter_number.is_empty()
    }
}
