use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use tokio::sync::RwLock;
use tsuzuki_lib::models::Chapter;

use crate::domain::{
    entities::series::{Series, SeriesEntry},
    repositories::library::{LibraryRepository, LibraryRepositoryError},
};

fn generate_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Library store kept in memory. Clones share the same store.
#[derive(Clone, Default)]
pub struct InMemoryLibraryRepository {
    entries: Arc<RwLock<HashMap<String, SeriesEntry>>>,
}

impl InMemoryLibraryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<SeriesEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.series.id.clone(), entry))
            .collect();

        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Every stored series, ordered by id.
    pub async fn entries(&self) -> Vec<SeriesEntry> {
        let entries = self.entries.read().await;
        let mut entries: Vec<SeriesEntry> = entries.values().cloned().collect();
        entries.sort_by(|a, b| a.series.id.cmp(&b.series.id));
        entries
    }
}

#[async_trait]
impl LibraryRepository for InMemoryLibraryRepository {
    async fn fetch_series(&self, series_id: &str) -> Result<Series, LibraryRepositoryError> {
        self.entries
            .read()
            .await
            .get(series_id)
            .map(|entry| entry.series.clone())
            .ok_or_else(|| LibraryRepositoryError::SeriesNotFound(series_id.to_string()))
    }

    async fn upsert_series(&self, series: &Series) -> Result<(), LibraryRepositoryError> {
        let mut entries = self.entries.write().await;
        entries
            .entry(series.id.clone())
            .and_modify(|entry| entry.series = series.clone())
            .or_insert_with(|| SeriesEntry {
                series: series.clone(),
                chapters: vec![],
            });

        Ok(())
    }

    async fn fetch_chapters(
        &self,
        series_id: &str,
    ) -> Result<Vec<Chapter>, LibraryRepositoryError> {
        self.entries
            .read()
            .await
            .get(series_id)
            .map(|entry| entry.chapters.clone())
            .ok_or_else(|| LibraryRepositoryError::SeriesNotFound(series_id.to_string()))
    }

    async fn upsert_chapters(
        &self,
        chapters: &[Chapter],
        series: &Series,
    ) -> Result<(), LibraryRepositoryError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(series.id.clone())
            .or_insert_with(|| SeriesEntry {
                series: series.clone(),
                chapters: vec![],
            });

        for chapter in chapters {
            let position = chapter.id.as_deref().and_then(|id| {
                entry
                    .chapters
                    .iter()
                    .position(|c| c.id.as_deref() == Some(id))
            });

            match position {
                Some(pos) => entry.chapters[pos] = chapter.clone(),
                None => {
                    let mut chapter = chapter.clone();
                    if chapter.id.is_none() {
                        chapter.id = Some(generate_id());
                    }
                    entry.chapters.push(chapter);
                }
            }
        }

        debug!(
            "upserted {} chapters for series {}",
            chapters.len(),
            series.id
        );

        Ok(())
    }

    async fn delete_chapters(
        &self,
        series_id: &str,
        chapter_ids: &[String],
    ) -> Result<(), LibraryRepositoryError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(series_id)
            .ok_or_else(|| LibraryRepositoryError::SeriesNotFound(series_id.to_string()))?;

        entry.chapters.retain(|c| {
            c.id.as_ref()
                .map(|id| !chapter_ids.contains(id))
                .unwrap_or(true)
        });

        Ok(())
    }
}
