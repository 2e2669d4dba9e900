//! Property tests for the review schedule, answer matching and distractor
//! selection.
//!
//! - a correct answer never lowers mastery and never exceeds the cap
//! - a wrong answer always schedules the next review one day out
//! - answer matching ignores case
//! - distractors never share an accepted answer with the target word or
//!   with each other

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use hanzi_tutor::db::operations::VocabularyEntry;
use hanzi_tutor::services::answers::{acceptable_answers, matches_any, normalize_answer};
use hanzi_tutor::services::quiz::pick_distractors;
use hanzi_tutor::services::scheduling::{
    apply_answer, interval_days, schedule, MAX_MASTERY, MIN_MASTERY,
};

fn fixed_now(offset_secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset_secs)
}

const GLOSSES: [&str; 12] = [
    "hello",
    "water",
    "cat",
    "dog",
    "to eat",
    "big",
    "Hello",
    "book",
    "big, large",
    "large",
    "small; little",
    "little",
];

fn synonyms(gloss: &str) -> HashSet<String> {
    let mut set: HashSet<String> = acceptable_answers(gloss).into_iter().collect();
    set.insert(normalize_answer(gloss));
    set
}

fn vocabulary_pool() -> impl Strategy<Value = Vec<VocabularyEntry>> {
    prop::collection::vec((1i64..=3, 0usize..GLOSSES.len()), 1..30).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(idx, (level, gloss))| VocabularyEntry {
                id: idx as i64 + 1,
                hanzi: format!("字{idx}"),
                pinyin: format!("zi{idx}"),
                english: GLOSSES[gloss].to_string(),
                hsk_level: level,
                word_type: None,
                example_sentence: None,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn correct_answer_never_lowers_mastery(level in MIN_MASTERY..=MAX_MASTERY, offset in 0i64..10_000_000) {
        let now = fixed_now(offset);
        let update = schedule(level, true, now);
        prop_assert!(update.mastery_level >= level);
        prop_assert!(update.mastery_level <= MAX_MASTERY);
        prop_assert_eq!(
            update.next_review_date,
            now + Duration::days(interval_days(update.mastery_level))
        );
    }

    #[test]
    fn wrong_answer_always_retries_next_day(level in MIN_MASTERY..=MAX_MASTERY, offset in 0i64..10_000_000) {
        let now = fixed_now(offset);
        let update = schedule(level, false, now);
        prop_assert_eq!(update.mastery_level, (level - 1).max(MIN_MASTERY));
        prop_assert_eq!(update.next_review_date, now + Duration::days(1));
    }

    #[test]
    fn answer_sequences_keep_counters_consistent(answers in prop::collection::vec(any::<bool>(), 1..40)) {
        let now = fixed_now(0);
        let mut record = apply_answer(None, 1, answers[0], now);
        for &correct in &answers[1..] {
            record = apply_answer(Some(&record), 1, correct, now);
        }
        let expected_correct = answers.iter().filter(|&&c| c).count() as i64;
        prop_assert_eq!(record.review_count, answers.len() as i64);
        prop_assert_eq!(record.correct_count, expected_correct);
        prop_assert!((MIN_MASTERY..=MAX_MASTERY).contains(&record.mastery_level));
        prop_assert!(record.next_review_date > now);
    }

    #[test]
    fn matching_ignores_case(word in "[a-z]{1,12}( [a-z]{1,8})?") {
        prop_assert!(matches_any(&word.to_uppercase(), &word));
        let padded = format!("  {word}  ");
        prop_assert!(matches_any(&padded, &word.to_uppercase()));
    }

    #[test]
    fn distractors_stay_at_level_and_skip_the_answer(pool in vocabulary_pool(), pick in any::<prop::sample::Index>(), seed in any::<u64>()) {
        let word = pool[pick.index(pool.len())].clone();
        let mut rng = StdRng::seed_from_u64(seed);
        let distractors = pick_distractors(&word, &pool, &mut rng);

        prop_assert!(distractors.len() <= 3);
        let mut seen = synonyms(&word.english);
        for d in &distractors {
            prop_assert_ne!(d.id, word.id);
            prop_assert_eq!(d.hsk_level, word.hsk_level);
            let own = synonyms(&d.english);
            prop_assert!(own.is_disjoint(&seen), "{:?} overlaps {:?}", d.english, seen);
            seen.extend(own);
        }
    }
}
