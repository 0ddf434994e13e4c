use async_trait::async_trait;

use thiserror::Error;
use tsuzuki_lib::models::Chapter;

use crate::domain::entities::series::Series;

#[derive(Debug, Error)]
pub enum LibraryRepositoryError {
    #[error("series not found: {0}")]
    SeriesNotFound(String),
}

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn fetch_series(&self, series_id: &str) -> Result<Series, LibraryRepositoryError>;

    /// Insert a series, or update its details keeping the stored chapters.
    async fn upsert_series(&self, series: &Series) -> Result<(), LibraryRepositoryError>;

    async fn fetch_chapters(&self, series_id: &str)
    -> Result<Vec<Chapter>, LibraryRepositoryError>;

    /// Chapters with a known id replace the stored one, the rest are inserted
    /// and given a fresh id.
    async fn upsert_chapters(
        &self,
        chapters: &[Chapter],
        series: &Series,
    ) -> Result<(), LibraryRepositoryError>;

    async fn delete_chapters(
        &self,
        series_id: &str,
        chapter_ids: &[String],
    ) -> Result<(), LibraryRepositoryError>;
}
