use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;
use tsuzuki_lib::{
    comparison::{
        UnnumberedPolicy, get_number_unread_chapters_with, grouping_key,
        select_most_similar_chapter,
    },
    models::{Chapter, ChapterInfo},
};

use crate::{
    domain::{
        entities::series::Series,
        repositories::library::{LibraryRepository, LibraryRepositoryError},
    },
    infrastructure::config::Config,
};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("repository error: {0}")]
    Repository(#[from] LibraryRepositoryError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub unnumbered_policy: UnnumberedPolicy,
    pub carry_read_state: bool,
    pub keep_removed_read_chapters: bool,
}

impl From<&Config> for ReconcileOptions {
    fn from(config: &Config) -> Self {
        Self {
            unnumbered_policy: config.unnumbered_policy,
            carry_read_state: config.carry_read_state,
            keep_removed_read_chapters: config.keep_removed_read_chapters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub added: usize,
    pub removed: usize,
    pub carried: usize,
    pub unread: f64,
}

pub struct LibraryService<R>
where
    R: LibraryRepository,
{
    repo: R,
    options: ReconcileOptions,
}

impl<R> LibraryService<R>
where
    R: LibraryRepository,
{
    pub fn new(repo: R, options: ReconcileOptions) -> Self {
        Self { repo, options }
    }

    pub async fn get_chapters(&self, series_id: &str) -> Result<Vec<Chapter>, LibraryError> {
        let chapters = self.repo.fetch_chapters(series_id).await?;

        Ok(chapters)
    }

    pub async fn get_unread_count(&self, series_id: &str) -> Result<f64, LibraryError> {
        let chapters = self.repo.fetch_chapters(series_id).await?;
        let unread = get_number_unread_chapters_with(&chapters, self.options.unnumbered_policy);
        if unread.is_nan() {
            warn!("series {series_id} has chapters without a usable number, unread count is NaN");
        }

        Ok(unread)
    }

    pub async fn set_chapters_read(
        &self,
        series_id: &str,
        chapter_ids: &[String],
        read: bool,
    ) -> Result<(), LibraryError> {
        let series = self.repo.fetch_series(series_id).await?;
        let ids: HashSet<&str> = chapter_ids.iter().map(String::as_str).collect();

        let changed = self
            .repo
            .fetch_chapters(series_id)
            .await?
            .into_iter()
            .filter(|c| c.id.as_deref().is_some_and(|id| ids.contains(id)) && c.read != read)
            .map(|mut c| {
                c.read = read;
                c
            })
            .collect_vec();

        debug!("mark {} chapters of {series_id} read={read}", changed.len());

        if !changed.is_empty() {
            self.repo.upsert_chapters(&changed, &series).await?;
        }

        Ok(())
    }

    pub fn find_similar_chapter<'a>(
        &self,
        original: &'a Chapter,
        candidates: &'a [Chapter],
    ) -> Option<&'a Chapter> {
        let selected = select_most_similar_chapter(original, candidates);
        match selected {
            Some(chapter) => debug!(
                "chapter {:?} matched {:?}",
                original.id, chapter.id
            ),
            None => debug!(
                "chapter {:?} ({}) no longer available",
                original.id, original.language_key
            ),
        }

        selected
    }

    /// Add a series to the library, or update its details, and reconcile its
    /// chapters with the ones just fetched.
    pub async fn import_series(
        &self,
        series: &Series,
        fresh: Vec<ChapterInfo>,
    ) -> Result<RefreshSummary, LibraryError> {
        self.repo.upsert_series(series).await?;
        debug!("imported series {} ({})", series.id, series.title);

        self.refresh_chapters(&series.id, fresh).await
    }

    /// Replace the stored chapter list of a series with a freshly fetched one,
    /// keeping ids and read state of chapters the source still lists.
    pub async fn refresh_chapters(
        &self,
        series_id: &str,
        fresh: Vec<ChapterInfo>,
    ) -> Result<RefreshSummary, LibraryError> {
        let series = self.repo.fetch_series(series_id).await?;
        let stored = self.repo.fetch_chapters(series_id).await?;

        let mut fresh: Vec<Chapter> = fresh.into_iter().map(Chapter::from).collect();

        let stored_by_source: HashMap<&str, &Chapter> = stored
            .iter()
            .map(|c| (c.source_id.as_str(), c))
            .collect();

        for chapter in fresh.iter_mut() {
            if let Some(existing) = stored_by_source.get(chapter.source_id.as_str()) {
                chapter.id = existing.id.clone();
                chapter.read = existing.read;
            }
        }

        let fresh_sources: HashSet<String> = fresh.iter().map(|c| c.source_id.clone()).collect();
        let vanished = stored
            .iter()
            .filter(|c| !fresh_sources.contains(&c.source_id))
            .collect_vec();

        let carried = if self.options.carry_read_state {
            Self::carry_read_state(&vanished, &mut fresh)
        } else {
            0
        };

        let added = fresh.iter().filter(|c| c.id.is_none()).count();

        let removed_ids = if fresh.is_empty() {
            warn!("source returned no chapters for {series_id}, keeping stored chapters");
            vec![]
        } else {
            vanished
                .iter()
                .filter(|c| !(c.read && self.options.keep_removed_read_chapters))
                .filter_map(|c| c.id.clone())
                .collect_vec()
        };

        if !fresh.is_empty() {
            self.repo.upsert_chapters(&fresh, &series).await?;
        }
        if !removed_ids.is_empty() {
            self.repo.delete_chapters(series_id, &removed_ids).await?;
        }

        let chapters = self.repo.fetch_chapters(series_id).await?;
        let unread = get_number_unread_chapters_with(&chapters, self.options.unnumbered_policy);

        info!(
            "refreshed {series_id}: {added} added, {} removed, {carried} carried, {unread} unread",
            removed_ids.len()
        );

        Ok(RefreshSummary {
            added,
            removed: removed_ids.len(),
            carried,
            unread,
        })
    }

    /// Read chapters that disappeared from the source pass their read state
    /// to the closest re-release of the same chapter.
    fn carry_read_state(vanished: &[&Chapter], fresh: &mut [Chapter]) -> usize {
        let candidates_by_key = fresh
            .iter()
            .cloned()
            .into_group_map_by(|c| grouping_key(c).to_string());

        let mut to_mark: HashSet<String> = HashSet::new();
        for original in vanished.iter().filter(|c| c.read) {
            let Some(candidates) = candidates_by_key.get(grouping_key(original)) else {
                continue;
            };

            if let Some(selected) = select_most_similar_chapter(original, candidates) {
                if !selected.read {
                    to_mark.insert(selected.source_id.clone());
                }
            }
        }

        let mut carried = 0;
        for chapter in fresh.iter_mut() {
            if to_mark.contains(&chapter.source_id) {
                chapter.read = true;
                carried += 1;
            }
        }

        carried
    }
}

#[cfg(test)]
mod test {
    use tsuzuki_lib::models::LanguageKey;

    use super::*;
    use crate::{
        domain::entities::series::SeriesEntry,
        infrastructure::domain::repositories::library::InMemoryLibraryRepository,
    };

    const SERIES_ID: &str = "space-adventures";

    fn info(source_id: &str, number: &str, group: &str, time: i64) -> ChapterInfo {
        ChapterInfo {
            source_id: source_id.to_string(),
            title: None,
            chapter_number: number.to_string(),
            volume_number: "".to_string(),
            language_key: LanguageKey::English,
            group_name: Some(group.to_string()),
            time,
        }
    }

    fn stored(id: &str, number: &str, group: &str, read: bool) -> Chapter {
        Chapter {
            id: Some(id.to_string()),
            read,
            ..Chapter::from(info(id, number, group, 0))
        }
    }

    fn service(
        chapters: Vec<Chapter>,
        options: ReconcileOptions,
    ) -> LibraryService<InMemoryLibraryRepository> {
        let repo = InMemoryLibraryRepository::from_entries(vec![SeriesEntry {
            series: Series {
                id: SERIES_ID.to_string(),
                source_id: "local".to_string(),
                title: "Space Adventures".to_string(),
            },
            chapters,
        }]);

        LibraryService::new(repo, options)
    }

    fn default_options() -> ReconcileOptions {
        ReconcileOptions {
            carry_read_state: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unread_count() {
        let svc = service(
            vec![
                stored("c1", "1", "A", true),
                stored("c2", "2", "A", true),
                stored("c4", "4", "A", false),
                stored("c5", "5", "A", false),
            ],
            default_options(),
        );

        assert_eq!(svc.get_unread_count(SERIES_ID).await.unwrap(), 2.0);
    }

    #[tokio::test]
    async fn test_unread_count_missing_series() {
        let svc = service(vec![], default_options());

        let res = svc.get_unread_count("missing").await;

        assert!(matches!(
            res,
            Err(LibraryError::Repository(
                LibraryRepositoryError::SeriesNotFound(_)
            ))
        ));
    }

    #[tokio::test]
    async fn test_set_chapters_read() {
        let svc = service(
            vec![stored("c1", "1", "A", false), stored("c2", "2", "A", false)],
            default_options(),
        );

        svc.set_chapters_read(SERIES_ID, &["c1".to_string()], true)
            .await
            .unwrap();

        let chapters = svc.get_chapters(SERIES_ID).await.unwrap();
        assert!(chapters.iter().find(|c| c.source_id == "c1").unwrap().read);
        assert!(!chapters.iter().find(|c| c.source_id == "c2").unwrap().read);
        assert_eq!(svc.get_unread_count(SERIES_ID).await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_refresh_keeps_read_state_and_adds() {
        let svc = service(
            vec![stored("c1", "1", "A", true), stored("c2", "2", "A", false)],
            default_options(),
        );

        let summary = svc
            .refresh_chapters(
                SERIES_ID,
                vec![info("c1", "1", "A", 1), info("c2", "2", "A", 2), info("c3", "3", "A", 3)],
            )
            .await
            .unwrap();

        assert_eq!(
            summary,
            RefreshSummary {
                added: 1,
                removed: 0,
                carried: 0,
                unread: 2.0,
            }
        );

        let chapters = svc.get_chapters(SERIES_ID).await.unwrap();
        assert_eq!(chapters.len(), 3);
        assert!(chapters.iter().all(|c| c.id.is_some()));
        let c1 = chapters.iter().find(|c| c.source_id == "c1").unwrap();
        assert_eq!(c1.id.as_deref(), Some("c1"));
        assert!(c1.read);
    }

    #[tokio::test]
    async fn test_refresh_carries_read_state_to_rerelease() {
        let svc = service(
            vec![stored("old-2", "2", "A", true), stored("c1", "1", "A", true)],
            default_options(),
        );

        let summary = svc
            .refresh_chapters(
                SERIES_ID,
                vec![
                    info("c1", "1", "A", 1),
                    info("new-2-b", "2", "B", 5),
                    info("new-2-a", "2", "A", 4),
                    info("c3", "3", "A", 6),
                ],
            )
            .await
            .unwrap();

        assert_eq!(summary.carried, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.unread, 1.0);

        let chapters = svc.get_chapters(SERIES_ID).await.unwrap();
        assert!(chapters.iter().find(|c| c.source_id == "new-2-a").unwrap().read);
        assert!(!chapters.iter().find(|c| c.source_id == "new-2-b").unwrap().read);
        assert!(chapters.iter().all(|c| c.source_id != "old-2"));
    }

    #[tokio::test]
    async fn test_refresh_without_carry() {
        let svc = service(
            vec![stored("old-2", "2", "A", true)],
            ReconcileOptions {
                carry_read_state: false,
                ..Default::default()
            },
        );

        let summary = svc
            .refresh_chapters(SERIES_ID, vec![info("new-2", "2", "A", 4)])
            .await
            .unwrap();

        assert_eq!(summary.carried, 0);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.unread, 1.0);
    }

    #[tokio::test]
    async fn test_refresh_keeps_removed_read_chapters() {
        let svc = service(
            vec![stored("c1", "1", "A", true), stored("c2", "2", "A", false)],
            ReconcileOptions {
                keep_removed_read_chapters: true,
                ..default_options()
            },
        );

        let summary = svc
            .refresh_chapters(SERIES_ID, vec![info("c3", "3", "A", 3)])
            .await
            .unwrap();

        assert_eq!(summary.removed, 1);
        let chapters = svc.get_chapters(SERIES_ID).await.unwrap();
        let sources: HashSet<&str> = chapters.iter().map(|c| c.source_id.as_str()).collect();
        assert_eq!(sources, HashSet::from(["c1", "c3"]));
    }

    #[tokio::test]
    async fn test_refresh_empty_source_keeps_chapters() {
        let svc = service(vec![stored("c1", "1", "A", false)], default_options());

        let summary = svc.refresh_chapters(SERIES_ID, vec![]).await.unwrap();

        assert_eq!(summary.removed, 0);
        assert_eq!(svc.get_chapters(SERIES_ID).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_new_series() {
        let svc = service(vec![], default_options());
        let series = Series {
            id: "super-duck".to_string(),
            source_id: "local".to_string(),
            title: "Super Duck".to_string(),
        };

        let summary = svc
            .import_series(&series, vec![info("d1", "1", "A", 1), info("d2", "2", "A", 2)])
            .await
            .unwrap();

        assert_eq!(summary.added, 2);
        assert_eq!(summary.unread, 2.0);
        assert_eq!(svc.get_chapters("super-duck").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_import_existing_series_keeps_read_state() {
        let svc = service(vec![stored("c1", "1", "A", true)], default_options());
        let series = Series {
            id: SERIES_ID.to_string(),
            source_id: "local".to_string(),
            title: "Space Adventures (Remastered)".to_string(),
        };

        let summary = svc
            .import_series(&series, vec![info("c1", "1", "A", 1), info("c2", "2", "A", 2)])
            .await
            .unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(summary.unread, 1.0);
        assert_eq!(svc.repo.fetch_series(SERIES_ID).await.unwrap(), series);
    }

    #[test]
    fn test_find_similar_chapter() {
        let svc = service(vec![], default_options());
        let original = stored("orig", "1", "A", true);
        let candidates = vec![
            Chapter::from(info("x", "1", "B", 10)),
            Chapter::from(info("y", "1", "A", 3)),
        ];

        let selected = svc.find_similar_chapter(&original, &candidates).unwrap();

        assert_eq!(selected.source_id, "y");
    }
}
