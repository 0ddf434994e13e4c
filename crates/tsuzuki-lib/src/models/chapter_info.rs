use serde::{Deserialize, Serialize};

use super::{Chapter, LanguageKey};

/// A type represent chapter, normalized across source
///
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterInfo {
    pub source_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub chapter_number: String,
    #[serde(default)]
    pub volume_number: String,
    #[serde(default)]
    pub language_key: LanguageKey,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub time: i64,
}

impl From<ChapterInfo> for Chapter {
    fn from(ch: ChapterInfo) -> Self {
        Self {
            id: None,
            source_id: ch.source_id,
            title: ch.title,
            chapter_number: ch.chapter_number,
            volume_number: ch.volume_number,
            language_key: ch.language_key,
            group_name: ch.group_name.filter(|g| !g.is_empty()),
            read: false,
            time: ch.time,
        }
    }
}
