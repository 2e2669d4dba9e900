//! Quiz generation, answer checking and submission.
//!
//! A generated quiz is persisted as a pending row until its answers arrive;
//! submission scores every item, feeds each result to the scheduler and
//! appends to the quiz log inside one transaction. Pending quizzes older
//! than [`PENDING_QUIZ_TTL_HOURS`] are dropped whenever a new one is generated.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answers::{acceptable_answers, matches_any, matches_pinyin, normalize_answer};
use super::scheduling::{apply_answer, is_recently_mastered};
use super::{ensure_learner, ServiceError};
use crate::db::operations::{
    self, HskLevel, NewQuizResult, PendingQuizRow, ProgressRecord, QuizResultRecord,
    VocabularyEntry,
};
use crate::db::Database;

pub const DEFAULT_QUESTIONS: i64 = 5;
pub const MAX_QUESTIONS: i64 = 20;
pub const DEFAULT_HISTORY: i64 = 10;
pub const MAX_HISTORY: i64 = 50;
pub const CHOICES_PER_ITEM: usize = 4;
pub const PENDING_QUIZ_TTL_HOURS: i64 = 24;
const OPTION_LETTERS: [&str; CHOICES_PER_ITEM] = ["A", "B", "C", "D"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
    Translation,
    MultipleChoice,
}

impl QuizType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizType::Translation => "translation",
            QuizType::MultipleChoice => "multiple_choice",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "translation" => Some(Self::Translation),
            "multiple_choice" | "multiple-choice" => Some(Self::MultipleChoice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ChineseToEnglish,
    EnglishToChinese,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chinese_to_english" => Some(Self::ChineseToEnglish),
            "english_to_chinese" => Some(Self::EnglishToChinese),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub letter: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuizItemKind {
    Translation {
        direction: Direction,
        hanzi: String,
        pinyin: String,
        english: String,
    },
    MultipleChoice {
        options: Vec<QuizOption>,
        correct_letter: String,
    },
}

/// One question, including the data needed to grade it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub word_id: i64,
    pub prompt: String,
    pub kind: QuizItemKind,
}

impl QuizItem {
    pub fn expected_answer(&self) -> String {
        match &self.kind {
            QuizItemKind::Translation {
                direction: Direction::ChineseToEnglish,
                english,
                ..
            } => english.clone(),
            QuizItemKind::Translation { hanzi, pinyin, .. } => format!("{hanzi} ({pinyin})"),
            QuizItemKind::MultipleChoice {
                options,
                correct_letter,
            } => options
                .iter()
                .find(|o| &o.letter == correct_letter)
                .map(|o| format!("{}: {}", o.letter, o.text))
                .unwrap_or_else(|| correct_letter.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizRequest {
    pub hsk_level: HskLevel,
    pub num_questions: i64,
    pub quiz_type: QuizType,
    pub direction: Direction,
}

impl QuizRequest {
    /// Validates raw request arguments, applying the defaults.
    pub fn from_args(
        hsk_level: i64,
        num_questions: Option<i64>,
        quiz_type: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let hsk_level = super::parse_hsk_level(hsk_level)?;
        let num_questions =
            super::bounded_count("num_questions", num_questions, DEFAULT_QUESTIONS, MAX_QUESTIONS)?;
        let quiz_type = match quiz_type {
            Some(raw) => QuizType::parse(raw).ok_or_else(|| {
                ServiceError::validation(format!(
                    "unknown quiz_type '{raw}', expected translation or multiple_choice"
                ))
            })?,
            None => QuizType::Translation,
        };
        let direction = match direction {
            Some(raw) => Direction::parse(raw).ok_or_else(|| {
                ServiceError::validation(format!(
                    "unknown direction '{raw}', expected chinese_to_english or english_to_chinese"
                ))
            })?,
            None => Direction::ChineseToEnglish,
        };

        Ok(Self {
            hsk_level,
            num_questions,
            quiz_type,
            direction,
        })
    }
}

/// Client-facing question: the prompt and, for multiple choice, the options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub number: usize,
    pub word_id: i64,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<QuizOption>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuiz {
    pub quiz_id: String,
    pub hsk_level: HskLevel,
    pub quiz_type: QuizType,
    pub questions: Vec<QuestionView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCheck {
    pub is_correct: bool,
    pub correct_answer: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub question_number: usize,
    pub word_id: i64,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub feedback: String,
    pub mastery_level: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub quiz_id: String,
    pub result_id: i64,
    pub quiz_type: QuizType,
    pub hsk_level: HskLevel,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub score_percentage: f64,
    pub duration_seconds: i64,
    pub results: Vec<ItemResult>,
}

pub async fn generate_quiz(
    db: &Database,
    user_id: &str,
    request: &QuizRequest,
) -> Result<GeneratedQuiz, ServiceError> {
    if !(1..=MAX_QUESTIONS).contains(&request.num_questions) {
        return Err(ServiceError::validation(format!(
            "num_questions must be between 1 and {MAX_QUESTIONS}, got {}",
            request.num_questions
        )));
    }
    ensure_learner(db, user_id).await?;

    let level_vocab = operations::list_vocabulary_by_level(db, request.hsk_level, None).await?;
    let progress: HashMap<i64, ProgressRecord> = operations::mastery_by_word(db, user_id)
        .await?
        .into_iter()
        .map(|p| (p.word_id, p))
        .collect();

    let now = Utc::now();
    let candidates = quiz_candidates(&level_vocab, &progress, now);
    if candidates.is_empty() {
        return Err(ServiceError::validation(format!(
            "no vocabulary available for HSK {} quizzes",
            request.hsk_level
        )));
    }

    let items = build_items(&candidates, &level_vocab, request, &mut rand::rng())?;

    let quiz_id = Uuid::new_v4().to_string();
    let row = PendingQuizRow {
        id: quiz_id.clone(),
        user_id: user_id.to_string(),
        quiz_type: request.quiz_type.as_str().to_string(),
        hsk_level: i64::from(request.hsk_level),
        items: serde_json::to_value(&items)?,
        created_at: now,
    };
    let expired =
        operations::delete_stale_pending_quizzes(db, now - Duration::hours(PENDING_QUIZ_TTL_HOURS))
            .await?;
    if expired > 0 {
        tracing::debug!(expired, "dropped stale pending quizzes");
    }
    operations::insert_pending_quiz(db, &row).await?;

    tracing::info!(
        quiz_id = %quiz_id,
        user_id,
        hsk_level = %request.hsk_level,
        quiz_type = request.quiz_type.as_str(),
        questions = items.len(),
        "quiz generated"
    );

    Ok(GeneratedQuiz {
        quiz_id,
        hsk_level: request.hsk_level,
        quiz_type: request.quiz_type,
        questions: question_views(&items),
        created_at: now,
    })
}

pub async fn submit_answers(
    db: &Database,
    user_id: &str,
    quiz_id: &str,
    answers: &[String],
) -> Result<QuizOutcome, ServiceError> {
    let quiz_id = Uuid::parse_str(quiz_id.trim())
        .map_err(|_| ServiceError::validation(format!("malformed quiz id '{quiz_id}'")))?
        .to_string();

    let mut tx = db.pool().begin().await?;

    let pending = match operations::get_pending_quiz(&mut tx, &quiz_id).await? {
        Some(p) if p.user_id == user_id => p,
        _ => {
            return Err(ServiceError::not_found(format!(
                "quiz {quiz_id} not found or already completed"
            )))
        }
    };

    let items: Vec<QuizItem> = serde_json::from_value(pending.items.clone())?;
    if answers.len() != items.len() {
        return Err(ServiceError::validation(format!(
            "expected {} answers, got {}",
            items.len(),
            answers.len()
        )));
    }

    let now = Utc::now();
    let mut results = Vec::with_capacity(items.len());
    for (idx, (item, answer)) in items.iter().zip(answers).enumerate() {
        let check = check_answer(item, answer);
        let existing = operations::get_progress(&mut tx, user_id, item.word_id).await?;
        let updated = apply_answer(existing.as_ref(), item.word_id, check.is_correct, now);
        operations::upsert_progress(&mut tx, user_id, &updated).await?;

        results.push(ItemResult {
            question_number: idx + 1,
            word_id: item.word_id,
            question: item.prompt.clone(),
            user_answer: answer.clone(),
            correct_answer: check.correct_answer,
            is_correct: check.is_correct,
            feedback: check.feedback,
            mastery_level: updated.mastery_level,
        });
    }

    let total = results.len();
    let correct = results.iter().filter(|r| r.is_correct).count();
    let score_percentage = score_percentage(correct, total);
    let duration_seconds = (now - pending.created_at).num_seconds().max(0);
    let quiz_type = QuizType::parse(&pending.quiz_type).unwrap_or(QuizType::Translation);
    let hsk_level = HskLevel::new(pending.hsk_level)
        .ok_or_else(|| ServiceError::validation("stored quiz has an invalid HSK level"))?;

    let result_id = operations::insert_quiz_result(
        &mut tx,
        user_id,
        &NewQuizResult {
            quiz_type: pending.quiz_type.clone(),
            hsk_level: Some(pending.hsk_level),
            total_questions: total as i64,
            correct_answers: correct as i64,
            score_percentage,
            duration_seconds,
            details: serde_json::to_value(&results)?,
            created_at: now,
        },
    )
    .await?;
    if !operations::delete_pending_quiz(&mut tx, &quiz_id).await? {
        return Err(ServiceError::not_found(format!(
            "quiz {quiz_id} not found or already completed"
        )));
    }
    tx.commit().await?;

    tracing::info!(quiz_id = %quiz_id, user_id, correct, total, "quiz submitted");

    Ok(QuizOutcome {
        quiz_id,
        result_id,
        quiz_type,
        hsk_level,
        total_questions: total,
        correct_answers: correct,
        incorrect_answers: total - correct,
        score_percentage,
        duration_seconds,
        results,
    })
}

pub async fn history(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<QuizResultRecord>, ServiceError> {
    ensure_learner(db, user_id).await?;
    Ok(operations::list_quiz_results(db, user_id, limit).await?)
}

/// Words eligible for a new quiz: everything at the level except words that
/// are fully mastered and not yet due.
pub fn quiz_candidates<'a>(
    level_vocab: &'a [VocabularyEntry],
    progress: &HashMap<i64, ProgressRecord>,
    now: DateTime<Utc>,
) -> Vec<&'a VocabularyEntry> {
    level_vocab
        .iter()
        .filter(|entry| {
            progress
                .get(&entry.id)
                .map(|p| !is_recently_mastered(p, now))
                .unwrap_or(true)
        })
        .collect()
}

pub fn build_items<R: Rng + ?Sized>(
    candidates: &[&VocabularyEntry],
    level_vocab: &[VocabularyEntry],
    request: &QuizRequest,
    rng: &mut R,
) -> Result<Vec<QuizItem>, ServiceError> {
    let mut selected: Vec<&VocabularyEntry> = candidates.to_vec();
    selected.shuffle(rng);
    selected.truncate(request.num_questions as usize);

    selected
        .into_iter()
        .map(|word| match request.quiz_type {
            QuizType::Translation => Ok(translation_item(word, request.direction)),
            QuizType::MultipleChoice => multiple_choice_item(word, level_vocab, rng),
        })
        .collect()
}

pub fn translation_item(word: &VocabularyEntry, direction: Direction) -> QuizItem {
    let prompt = match direction {
        Direction::ChineseToEnglish => {
            format!("What does '{}' ({}) mean in English?", word.hanzi, word.pinyin)
        }
        Direction::EnglishToChinese => {
            format!("How do you say '{}' in Chinese?", word.english)
        }
    };
    QuizItem {
        word_id: word.id,
        prompt,
        kind: QuizItemKind::Translation {
            direction,
            hanzi: word.hanzi.clone(),
            pinyin: word.pinyin.clone(),
            english: word.english.clone(),
        },
    }
}

/// Three distractors from the same HSK level. A distractor never shares an
/// accepted answer with the word or with another distractor, so
/// `"large"` is never offered against `"big, large"`.
pub fn pick_distractors<'a, R: Rng + ?Sized>(
    word: &VocabularyEntry,
    pool: &'a [VocabularyEntry],
    rng: &mut R,
) -> Vec<&'a VocabularyEntry> {
    let mut seen: HashSet<String> = acceptable_answers(&word.english).into_iter().collect();
    seen.insert(normalize_answer(&word.english));

    let mut eligible: Vec<&VocabularyEntry> = pool
        .iter()
        .filter(|entry| entry.id != word.id && entry.hsk_level == word.hsk_level)
        .collect();
    eligible.shuffle(rng);

    let mut picked = Vec::with_capacity(CHOICES_PER_ITEM - 1);
    for entry in eligible {
        if picked.len() == CHOICES_PER_ITEM - 1 {
            break;
        }
        let mut synonyms = acceptable_answers(&entry.english);
        synonyms.push(normalize_answer(&entry.english));
        if synonyms.iter().any(|s| seen.contains(s)) {
            continue;
        }
        seen.extend(synonyms);
        picked.push(entry);
    }
    picked
}

pub fn multiple_choice_item<R: Rng + ?Sized>(
    word: &VocabularyEntry,
    pool: &[VocabularyEntry],
    rng: &mut R,
) -> Result<QuizItem, ServiceError> {
    let distractors = pick_distractors(word, pool, rng);
    if distractors.len() < CHOICES_PER_ITEM - 1 {
        return Err(ServiceError::validation(format!(
            "need at least {CHOICES_PER_ITEM} distinct words at HSK {} for multiple choice",
            word.hsk_level
        )));
    }

    let mut texts: Vec<&str> = distractors.iter().map(|d| d.english.as_str()).collect();
    texts.push(word.english.as_str());
    texts.shuffle(rng);

    let options: Vec<QuizOption> = OPTION_LETTERS
        .iter()
        .zip(texts)
        .map(|(letter, text)| QuizOption {
            letter: (*letter).to_string(),
            text: text.to_string(),
        })
        .collect();
    let correct_letter = options
        .iter()
        .find(|o| o.text == word.english)
        .map(|o| o.letter.clone())
        .unwrap_or_else(|| OPTION_LETTERS[0].to_string());

    Ok(QuizItem {
        word_id: word.id,
        prompt: format!("What does '{}' ({}) mean?", word.hanzi, word.pinyin),
        kind: QuizItemKind::MultipleChoice {
            options,
            correct_letter,
        },
    })
}

pub fn check_answer(item: &QuizItem, answer: &str) -> AnswerCheck {
    let is_correct = match &item.kind {
        QuizItemKind::Translation {
            direction: Direction::ChineseToEnglish,
            english,
            ..
        } => matches_any(answer, english),
        QuizItemKind::Translation { hanzi, pinyin, .. } => {
            answer.trim() == hanzi.trim() || matches_pinyin(answer, pinyin)
        }
        QuizItemKind::MultipleChoice {
            options,
            correct_letter,
        } => {
            let answer = answer.trim();
            answer.eq_ignore_ascii_case(correct_letter)
                || options
                    .iter()
                    .find(|o| &o.letter == correct_letter)
                    .map(|o| normalize_answer(answer) == normalize_answer(&o.text))
                    .unwrap_or(false)
        }
    };

    let correct_answer = item.expected_answer();
    let feedback = if is_correct {
        "Correct!".to_string()
    } else {
        format!("Incorrect. The correct answer is {correct_answer}")
    };

    AnswerCheck {
        is_correct,
        correct_answer,
        feedback,
    }
}

pub fn question_views(items: &[QuizItem]) -> Vec<QuestionView> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| QuestionView {
            number: idx + 1,
            word_id: item.word_id,
            prompt: item.prompt.clone(),
            choices: match &item.kind {
                QuizItemKind::MultipleChoice { options, .. } => Some(options.clone()),
                QuizItemKind::Translation { .. } => None,
            },
        })
        .collect()
}

/// Percentage rounded to one decimal place; 0 for an empty quiz.
pub fn score_percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = correct as f64 * 100.0 / total as f64;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(id: i64, hanzi: &str, english: &str, level: i64) -> VocabularyEntry {
        VocabularyEntry {
            id,
            hanzi: hanzi.to_string(),
            pinyin: format!("py{id}"),
            english: english.to_string(),
            hsk_level: level,
            word_type: None,
            example_sentence: None,
        }
    }

    fn level_one() -> Vec<VocabularyEntry> {
        vec![
            entry(1, "你好", "hello", 1),
            entry(2, "谢谢", "thank you, thanks", 1),
            entry(3, "再见", "goodbye", 1),
            entry(4, "水", "water", 1),
            entry(5, "猫", "cat", 1),
            entry(6, "嗨", "Hello", 1),
        ]
    }

    fn request(quiz_type: QuizType, n: i64) -> QuizRequest {
        QuizRequest {
            hsk_level: HskLevel::new(1).unwrap(),
            num_questions: n,
            quiz_type,
            direction: Direction::ChineseToEnglish,
        }
    }

    #[test]
    fn distractors_exclude_correct_word_and_gloss() {
        let mut pool = level_one();
        pool.push(entry(7, "书", "book", 2));
        let word = pool[0].clone();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let distractors = pick_distractors(&word, &pool, &mut rng);
            assert_eq!(distractors.len(), 3);
            for d in &distractors {
                assert_ne!(d.id, word.id);
                assert_ne!(d.english.to_lowercase(), "hello");
                assert_eq!(d.hsk_level, word.hsk_level);
            }
        }
    }

    #[test]
    fn distractors_never_share_a_synonym() {
        let pool = vec![
            entry(1, "大", "big, large", 1),
            entry(2, "巨", "large", 1),
            entry(3, "猫", "cat", 1),
            entry(4, "水", "water", 1),
            entry(5, "狗", "dog", 1),
            entry(6, "小", "small; little", 1),
            entry(7, "少", "little", 1),
        ];
        let word = pool[0].clone();

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let distractors = pick_distractors(&word, &pool, &mut rng);
            assert_eq!(distractors.len(), 3);
            assert!(distractors.iter().all(|d| d.id != 2), "seed {seed}");
            let littles = distractors
                .iter()
                .filter(|d| d.english.contains("little"))
                .count();
            assert!(littles <= 1, "seed {seed}");
        }
    }

    #[test]
    fn multiple_choice_has_four_distinct_options_with_one_correct() {
        let pool = level_one();
        let mut rng = StdRng::seed_from_u64(11);
        let item = multiple_choice_item(&pool[3], &pool, &mut rng).unwrap();
        let QuizItemKind::MultipleChoice {
            options,
            correct_letter,
        } = &item.kind
        else {
            panic!("expected multiple choice");
        };
        assert_eq!(options.len(), 4);
        let letters: Vec<&str> = options.iter().map(|o| o.letter.as_str()).collect();
        assert_eq!(letters, vec!["A", "B", "C", "D"]);
        let correct: Vec<_> = options.iter().filter(|o| o.text == "water").collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(&correct[0].letter, correct_letter);
    }

    #[test]
    fn multiple_choice_needs_enough_distinct_words() {
        let pool = vec![
            entry(1, "你好", "hello", 1),
            entry(2, "嗨", "hello", 1),
            entry(3, "再见", "goodbye", 1),
            entry(4, "水", "water", 1),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let err = multiple_choice_item(&pool[0], &pool, &mut rng).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn quiz_is_shortened_when_few_candidates() {
        let pool = level_one();
        let candidates: Vec<&VocabularyEntry> = pool.iter().take(2).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let items = build_items(&candidates, &pool, &request(QuizType::Translation, 5), &mut rng)
            .unwrap();
        assert_eq!(items.len(), 2);
        let ids: HashSet<i64> = items.iter().map(|i| i.word_id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn recently_mastered_words_are_not_candidates() {
        let pool = level_one();
        let now = Utc::now();
        let mut progress = HashMap::new();
        progress.insert(
            1,
            ProgressRecord {
                word_id: 1,
                mastery_level: 5,
                review_count: 9,
                correct_count: 9,
                next_review_date: now + Duration::days(30),
                last_reviewed_at: now,
            },
        );
        progress.insert(
            2,
            ProgressRecord {
                word_id: 2,
                mastery_level: 5,
                review_count: 9,
                correct_count: 9,
                next_review_date: now - Duration::days(1),
                last_reviewed_at: now,
            },
        );
        let ids: Vec<i64> = quiz_candidates(&pool, &progress, now)
            .iter()
            .map(|e| e.id)
            .collect();
        assert!(!ids.contains(&1));
        assert!(ids.contains(&2));
        assert_eq!(ids.len(), pool.len() - 1);
    }

    #[test]
    fn translation_answers_are_case_insensitive() {
        let item = translation_item(&entry(1, "你好", "hello", 1), Direction::ChineseToEnglish);
        assert!(check_answer(&item, "Hello").is_correct);
        let miss = check_answer(&item, "bye");
        assert!(!miss.is_correct);
        assert!(miss.feedback.contains("hello"));
    }

    #[test]
    fn english_to_chinese_accepts_hanzi_or_pinyin() {
        let mut word = entry(1, "你好", "hello", 1);
        word.pinyin = "nǐ hǎo".to_string();
        let item = translation_item(&word, Direction::EnglishToChinese);
        assert!(check_answer(&item, "你好").is_correct);
        assert!(check_answer(&item, "ni hao").is_correct);
        assert!(check_answer(&item, "ni3hao3").is_correct);
        assert!(!check_answer(&item, "xie xie").is_correct);
    }

    #[test]
    fn multiple_choice_accepts_letter_in_any_case_or_option_text() {
        let item = QuizItem {
            word_id: 1,
            prompt: "What does '你好' mean?".to_string(),
            kind: QuizItemKind::MultipleChoice {
                options: vec![
                    QuizOption { letter: "A".into(), text: "water".into() },
                    QuizOption { letter: "B".into(), text: "hello".into() },
                    QuizOption { letter: "C".into(), text: "cat".into() },
                    QuizOption { letter: "D".into(), text: "goodbye".into() },
                ],
                correct_letter: "B".to_string(),
            },
        };
        assert!(check_answer(&item, "b").is_correct);
        assert!(check_answer(&item, "B").is_correct);
        assert!(check_answer(&item, "Hello").is_correct);
        let miss = check_answer(&item, "A");
        assert!(!miss.is_correct);
        assert_eq!(miss.correct_answer, "B: hello");
    }

    #[test]
    fn question_views_hide_answers() {
        let item = translation_item(&entry(1, "你好", "hello", 1), Direction::ChineseToEnglish);
        let json = serde_json::to_string(&question_views(&[item])).unwrap();
        assert!(!json.contains("\"hello\""));
        assert!(json.contains("你好"));
    }

    #[test]
    fn score_is_rounded_to_one_decimal() {
        assert_eq!(score_percentage(1, 3), 33.3);
        assert_eq!(score_percentage(2, 3), 66.7);
        assert_eq!(score_percentage(0, 0), 0.0);
        assert_eq!(score_percentage(4, 4), 100.0);
    }

    #[test]
    fn request_defaults_and_validation() {
        let req = QuizRequest::from_args(2, None, None, None).unwrap();
        assert_eq!(req.num_questions, DEFAULT_QUESTIONS);
        assert_eq!(req.quiz_type, QuizType::Translation);
        assert_eq!(req.direction, Direction::ChineseToEnglish);

        assert!(QuizRequest::from_args(7, None, None, None).is_err());
        assert!(QuizRequest::from_args(1, Some(21), None, None).is_err());
        assert!(QuizRequest::from_args(1, Some(0), None, None).is_err());
        assert!(QuizRequest::from_args(1, None, Some("essay"), None).is_err());
        assert!(QuizRequest::from_args(1, None, None, Some("sideways")).is_err());
    }

    #[test]
    fn quiz_type_and_direction_parse() {
        assert_eq!(QuizType::parse("Multiple_Choice"), Some(QuizType::MultipleChoice));
        assert_eq!(QuizType::parse("essay"), None);
        assert_eq!(
            Direction::parse("english_to_chinese"),
            Some(Direction::EnglishToChinese)
        );
    }
}
