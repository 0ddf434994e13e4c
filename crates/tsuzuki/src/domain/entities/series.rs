use serde::{Deserialize, Serialize};
use tsuzuki_lib::models::Chapter;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub title: String,
}

/// A series together with its stored chapters, the unit the library is
/// exported and imported in.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeriesEntry {
    pub series: Series,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}
