//! Plain-text rendering of tool results for MCP clients.

use std::fmt::Write as _;

use crate::db::operations::{ClearedProgress, QuizResultRecord, StudiedWord, VocabularyEntry};
use crate::services::export::ExportSummary;
use crate::services::progress::ProgressStats;
use crate::services::quiz::{GeneratedQuiz, QuizOutcome, QuizType};
use crate::services::scheduling::mastery_label;
use crate::services::vocabulary::VocabularyStatistics;

pub fn word_line(entry: &VocabularyEntry) -> String {
    let mut line = format!("{} ({}) - {}", entry.hanzi, entry.pinyin, entry.english);
    if let Some(word_type) = &entry.word_type {
        let _ = write!(line, " [{word_type}]");
    }
    line
}

pub fn word_list(title: &str, words: &[VocabularyEntry]) -> String {
    if words.is_empty() {
        return format!("{title}\n\nNo words found.");
    }
    let mut out = format!("{title} ({} words)\n", words.len());
    for (idx, entry) in words.iter().enumerate() {
        let _ = write!(out, "\n{}. {}", idx + 1, word_line(entry));
        if let Some(sentence) = &entry.example_sentence {
            let _ = write!(out, "\n   e.g. {sentence}");
        }
    }
    out
}

pub fn studied_words(title: &str, words: &[StudiedWord]) -> String {
    if words.is_empty() {
        return format!("{title}\n\nNo words found.");
    }
    let mut out = format!("{title} ({} words)\n", words.len());
    for (idx, word) in words.iter().enumerate() {
        let p = &word.progress;
        let _ = write!(
            out,
            "\n{}. {}\n   mastery {} ({}), reviewed {}x, {} correct, next review {}",
            idx + 1,
            word_line(&word.entry),
            p.mastery_level,
            mastery_label(p.mastery_level),
            p.review_count,
            p.correct_count,
            p.next_review_date.format("%Y-%m-%d"),
        );
    }
    out
}

pub fn progress_stats(stats: &ProgressStats) -> String {
    let mut out = format!("Learning progress for '{}'\n", stats.user_id);
    let _ = write!(
        out,
        "\nWords studied: {}\nTotal reviews: {}\nCorrect answers: {}\nAccuracy: {:.2}%\n",
        stats.words_studied, stats.total_reviews, stats.total_correct, stats.accuracy_percentage
    );

    out.push_str("\nMastery levels:");
    for bucket in &stats.mastery_breakdown {
        let _ = write!(
            out,
            "\n  {} {}: {} words",
            bucket.level, bucket.label, bucket.count
        );
    }

    if !stats.studied_by_level.is_empty() {
        out.push_str("\n\nStudied by HSK level:");
        for (level, count) in &stats.studied_by_level {
            let _ = write!(out, "\n  HSK {level}: {count} words");
        }
    }

    if !stats.recent_quizzes.is_empty() {
        out.push_str("\n\nRecent quizzes:");
        for result in &stats.recent_quizzes {
            let _ = write!(out, "\n  {}", quiz_result_line(result));
        }
    }
    out
}

pub fn vocabulary_statistics(stats: &VocabularyStatistics) -> String {
    let mut out = String::from("Vocabulary statistics\n");
    let _ = write!(
        out,
        "\nTotal words: {}\nLearned: {}\nNot yet studied: {}\n",
        stats.total_vocabulary, stats.learned_vocabulary, stats.new_vocabulary
    );
    out.push_str("\nBy HSK level:");
    for (level, count) in &stats.hsk_level_counts {
        let _ = write!(out, "\n  HSK {level}: {count} words");
    }
    if !stats.word_type_counts.is_empty() {
        out.push_str("\n\nBy word type:");
        for (word_type, count) in &stats.word_type_counts {
            let _ = write!(out, "\n  {word_type}: {count}");
        }
    }
    out
}

pub fn quiz(quiz: &GeneratedQuiz) -> String {
    let kind = match quiz.quiz_type {
        QuizType::Translation => "Translation",
        QuizType::MultipleChoice => "Multiple choice",
    };
    let mut out = format!(
        "{kind} quiz, HSK {} ({} questions)\nQuiz ID: {}\n",
        quiz.hsk_level,
        quiz.questions.len(),
        quiz.quiz_id
    );
    for question in &quiz.questions {
        let _ = write!(out, "\n{}. {}", question.number, question.prompt);
        if let Some(choices) = &question.choices {
            for choice in choices {
                let _ = write!(out, "\n   {}) {}", choice.letter, choice.text);
            }
        }
    }
    out.push_str("\n\nSubmit your answers with submit_quiz_answers, one per question in order.");
    out
}

/// Verdict line for a quiz score out of 100.
pub fn grade(score_percentage: f64) -> &'static str {
    match score_percentage {
        s if s >= 90.0 => "Excellent!",
        s if s >= 70.0 => "Good job!",
        s if s >= 50.0 => "Not bad!",
        _ => "Keep practicing!",
    }
}

pub fn quiz_outcome(outcome: &QuizOutcome) -> String {
    let mut out = format!(
        "Quiz results: {}/{} correct ({:.1}%) in {}s\n{}\n",
        outcome.correct_answers,
        outcome.total_questions,
        outcome.score_percentage,
        outcome.duration_seconds,
        grade(outcome.score_percentage)
    );
    for item in &outcome.results {
        let mark = if item.is_correct { "[x]" } else { "[ ]" };
        let _ = write!(
            out,
            "\n{mark} {}. {}\n    your answer: {}\n    {}",
            item.question_number, item.question, item.user_answer, item.feedback
        );
    }
    out
}

pub fn quiz_history(results: &[QuizResultRecord]) -> String {
    if results.is_empty() {
        return "No quizzes taken yet.".to_string();
    }
    let mut out = format!("Quiz history ({} quizzes)\n", results.len());
    for result in results {
        let _ = write!(out, "\n{}", quiz_result_line(result));
    }
    out
}

fn quiz_result_line(result: &QuizResultRecord) -> String {
    let level = result
        .hsk_level
        .map(|l| format!("HSK {l}"))
        .unwrap_or_else(|| "mixed".to_string());
    format!(
        "{} {} {}: {}/{} ({:.1}%)",
        result.created_at.format("%Y-%m-%d %H:%M"),
        result.quiz_type,
        level,
        result.correct_answers,
        result.total_questions,
        result.score_percentage
    )
}

pub fn export_summary(summary: &ExportSummary) -> String {
    format!(
        "Exported {} words to {}\nColumns: hanzi, pinyin, english, hsk_level, mastery_level",
        summary.rows,
        summary.path.display()
    )
}

pub fn cleared(user_id: &str, cleared: &ClearedProgress) -> String {
    format!(
        "Cleared progress for '{user_id}': {} progress records, {} quiz results, {} pending quizzes. Vocabulary is unchanged.",
        cleared.progress_records, cleared.quiz_results, cleared.pending_quizzes
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> VocabularyEntry {
        VocabularyEntry {
            id: 1,
            hanzi: "你好".to_string(),
            pinyin: "nǐ hǎo".to_string(),
            english: "hello".to_string(),
            hsk_level: 1,
            word_type: Some("phrase".to_string()),
            example_sentence: None,
        }
    }

    #[test]
    fn word_line_includes_type() {
        assert_eq!(word_line(&entry()), "你好 (nǐ hǎo) - hello [phrase]");
    }

    #[test]
    fn empty_lists_say_so() {
        assert!(word_list("HSK 1", &[]).contains("No words found"));
        assert_eq!(quiz_history(&[]), "No quizzes taken yet.");
    }

    #[test]
    fn grade_tiers() {
        assert_eq!(grade(100.0), "Excellent!");
        assert_eq!(grade(90.0), "Excellent!");
        assert_eq!(grade(89.9), "Good job!");
        assert_eq!(grade(70.0), "Good job!");
        assert_eq!(grade(50.0), "Not bad!");
        assert_eq!(grade(49.9), "Keep practicing!");
        assert_eq!(grade(0.0), "Keep practicing!");
    }

    #[test]
    fn word_list_is_numbered() {
        let text = word_list("HSK 1", &[entry(), entry()]);
        assert!(text.starts_with("HSK 1 (2 words)"));
        assert!(text.contains("\n2. 你好"));
    }
}
