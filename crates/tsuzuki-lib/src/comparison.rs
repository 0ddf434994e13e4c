//! Reconciling chapter lists across sources, languages and groups.
//!
//! Chapter numbers are handled as `f64`. A chapter without a parsable number
//! evaluates to `NaN` and flows through the arithmetic the same way it always
//! has, see [`UnnumberedPolicy`] to leave those chapters out instead.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::models::Chapter;

/// How chapters without a parsable number take part in unread counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnnumberedPolicy {
    /// Unnumbered chapters occupy a slot and their `NaN` carries into the gap
    /// of the next chapter.
    #[default]
    Sequential,
    /// Unnumbered chapters are left out of the walk.
    Skip,
}

/// Parse a chapter number the way a lenient float parser does: leading
/// whitespace is skipped and the longest decimal prefix is taken, so
/// `"12.5v2"` is `12.5`. Returns `NaN` when there is no numeric prefix.
pub fn parse_chapter_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // a bare trailing dot is not part of the number
        end = if frac_end > frac_start { frac_end } else { end };
    }

    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Key used to collapse duplicate releases of the same chapter.
pub fn grouping_key(chapter: &Chapter) -> &str {
    if chapter.has_chapter_number() {
        &chapter.chapter_number
    } else {
        &chapter.source_id
    }
}

/// Find the chapter in `candidates` that corresponds to `original`.
///
/// If `original` itself is among the candidates (same id) it is returned as
/// is. Otherwise the most recent candidate sharing both language and group
/// wins, then the most recent one sharing only the language. Equal `time`
/// keeps whichever candidate came first.
pub fn select_most_similar_chapter<'a>(
    original: &'a Chapter,
    candidates: &'a [Chapter],
) -> Option<&'a Chapter> {
    if let Some(id) = original.id.as_deref() {
        if candidates.iter().any(|c| c.id.as_deref() == Some(id)) {
            return Some(original);
        }
    }

    let mut best_match: Option<&Chapter> = None;
    let mut fallback_match: Option<&Chapter> = None;

    for candidate in candidates {
        if candidate.language_key != original.language_key {
            continue;
        }

        let slot = if candidate.group() == original.group() {
            &mut best_match
        } else {
            &mut fallback_match
        };

        let newer = match slot {
            Some(current) => candidate.time > current.time,
            None => true,
        };
        if newer {
            *slot = Some(candidate);
        }
    }

    best_match.or(fallback_match)
}

/// Collapse duplicate releases into one representative per chapter and sort
/// them by chapter number.
///
/// A read release represents its group over unread ones, otherwise the first
/// release seen does. Chapters with unparsable numbers keep their place in
/// first-appearance order, only the numbered ones are reordered around them.
pub fn consolidate_and_sort_chapters(chapters: &[Chapter]) -> Vec<&Chapter> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut representatives: Vec<&Chapter> = Vec::new();

    for chapter in chapters {
        let key = grouping_key(chapter);
        match index.get(key) {
            Some(&pos) => {
                if chapter.read && !representatives[pos].read {
                    representatives[pos] = chapter;
                }
            }
            None => {
                index.insert(key, representatives.len());
                representatives.push(chapter);
            }
        }
    }

    let (slots, mut numbered): (Vec<usize>, Vec<(f64, &Chapter)>) = representatives
        .iter()
        .enumerate()
        .map(|(pos, c)| (pos, (parse_chapter_number(&c.chapter_number), *c)))
        .filter(|(_, (number, _))| !number.is_nan())
        .unzip();
    // NaN never reaches the comparator, sort_by is stable
    numbered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    for (pos, (_, chapter)) in slots.into_iter().zip(numbered) {
        representatives[pos] = chapter;
    }

    representatives
}

// Math.max semantics, a NaN on either side wins
fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Number of unread chapter slots in `chapters`, see
/// [`get_number_unread_chapters_with`].
pub fn get_number_unread_chapters(chapters: &[Chapter]) -> f64 {
    get_number_unread_chapters_with(chapters, UnnumberedPolicy::default())
}

/// Count how many chapter slots lie past the highest read chapter.
///
/// Duplicate releases are consolidated first. Each chapter is then given an
/// absolute position that widens when the numbering skips more than one
/// chapter, so a series going 1, 2, 7 counts 7 as the seventh slot.
/// Fractional chapters round up into the next slot.
pub fn get_number_unread_chapters_with(chapters: &[Chapter], policy: UnnumberedPolicy) -> f64 {
    let consolidated = consolidate_and_sort_chapters(chapters);

    let numbers = consolidated
        .into_iter()
        .map(|c| (parse_chapter_number(&c.chapter_number), c.read))
        .filter(|(number, _)| policy == UnnumberedPolicy::Sequential || !number.is_nan());

    let mut highest_released = 0.0_f64;
    let mut highest_read = 0.0_f64;
    let mut cumulative_gaps = 1.0_f64;
    let mut previous_chap_number = 0.0_f64;

    for (i, (chapter_number, read)) in numbers.enumerate() {
        let mut absolute_number = cumulative_gaps + i as f64;

        let gap = (chapter_number - previous_chap_number).ceil() - 1.0;
        if gap > 1.0 {
            absolute_number += gap;
            cumulative_gaps += gap;
        }

        highest_released = nan_max(highest_released, absolute_number);
        if read {
            highest_read = nan_max(highest_read, absolute_number);
        }

        previous_chap_number = chapter_number;
    }

    (highest_released - highest_read).ceil()
}

/// Unread count as shown on a badge. `None` when the count is not a number.
pub fn unread_badge(count: f64) -> Option<u64> {
    if count.is_nan() {
        None
    } else {
        Some(count.max(0.0) as u64)
    }
}
