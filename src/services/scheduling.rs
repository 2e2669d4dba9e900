//! Spaced-repetition schedule.
//!
//! Mastery runs from 0 to 5. A correct answer moves one level up and the
//! next review is pushed out by the interval for the new level. A wrong
//! answer moves one level down and the word comes back the next day.

use chrono::{DateTime, Duration, Utc};

use crate::db::operations::ProgressRecord;

pub const MIN_MASTERY: i64 = 0;
pub const MAX_MASTERY: i64 = 5;

/// Days until the next review, indexed by mastery level.
pub const REVIEW_INTERVAL_DAYS: [i64; 6] = [1, 3, 7, 14, 30, 60];

pub const RETRY_INTERVAL_DAYS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub mastery_level: i64,
    pub next_review_date: DateTime<Utc>,
}

pub fn interval_days(mastery_level: i64) -> i64 {
    let idx = mastery_level.clamp(MIN_MASTERY, MAX_MASTERY) as usize;
    REVIEW_INTERVAL_DAYS[idx]
}

/// Pure transition `(old level, correctness) -> (new level, next review)`.
pub fn schedule(old_level: i64, correct: bool, now: DateTime<Utc>) -> ScheduleUpdate {
    let old_level = old_level.clamp(MIN_MASTERY, MAX_MASTERY);
    if correct {
        let mastery_level = (old_level + 1).min(MAX_MASTERY);
        ScheduleUpdate {
            mastery_level,
            next_review_date: now + Duration::days(interval_days(mastery_level)),
        }
    } else {
        ScheduleUpdate {
            mastery_level: (old_level - 1).max(MIN_MASTERY),
            next_review_date: now + Duration::days(RETRY_INTERVAL_DAYS),
        }
    }
}

/// Applies one answer to the learner's record for `word_id`, creating the
/// record on first exposure.
pub fn apply_answer(
    existing: Option<&ProgressRecord>,
    word_id: i64,
    correct: bool,
    now: DateTime<Utc>,
) -> ProgressRecord {
    let (old_level, review_count, correct_count) = existing
        .map(|p| (p.mastery_level, p.review_count, p.correct_count))
        .unwrap_or((MIN_MASTERY, 0, 0));

    let update = schedule(old_level, correct, now);

    ProgressRecord {
        word_id,
        mastery_level: update.mastery_level,
        review_count: review_count + 1,
        correct_count: correct_count + i64::from(correct),
        next_review_date: update.next_review_date,
        last_reviewed_at: now,
    }
}

/// Whether a word should be kept out of new quizzes: fully mastered and not
/// yet due again.
pub fn is_recently_mastered(progress: &ProgressRecord, now: DateTime<Utc>) -> bool {
    progress.mastery_level >= MAX_MASTERY && progress.next_review_date > now
}

pub fn mastery_label(level: i64) -> &'static str {
    match level {
        0 => "New/Struggling",
        1 => "Learning",
        2 => "Familiar",
        3 => "Comfortable",
        4 => "Good",
        _ => "Mastered",
    }
}
