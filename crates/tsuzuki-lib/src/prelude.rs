pub use crate::comparison::{
    UnnumberedPolicy, consolidate_and_sort_chapters, get_number_unread_chapters,
    get_number_unread_chapters_with, grouping_key, parse_chapter_number,
    select_most_similar_chapter, unread_badge,
};
pub use crate::error::Error;
pub use crate::models::{Chapter, ChapterInfo, LanguageKey};
