//! Tool catalogue and dispatch.

use serde_json::{json, Value};

use super::{format, McpToolResult};
use crate::config::Config;
use crate::db::Database;
use crate::services::export::{self, ExportRequest};
use crate::services::quiz::{self, QuizRequest, DEFAULT_HISTORY, MAX_HISTORY};
use crate::services::vocabulary::{
    self, DEFAULT_BATCH, DEFAULT_LIST_LIMIT, MAX_BATCH, MAX_LIST_LIMIT,
};
use crate::services::{bounded_count, parse_hsk_level, progress, ServiceError};

#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn tool(name: &'static str, description: &'static str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name,
        description,
        input_schema,
    }
}

fn user_id_schema() -> Value {
    json!({ "type": "string", "description": "Learner id (defaults to the local learner)" })
}

fn hsk_level_schema() -> Value {
    json!({ "type": "integer", "minimum": 1, "maximum": 6, "description": "HSK level 1-6" })
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool(
            "get_progress_stats",
            "Show the learner's overall progress: words studied, accuracy and mastery breakdown.",
            json!({
                "type": "object",
                "properties": { "user_id": user_id_schema() }
            }),
        ),
        tool(
            "learn_vocabulary",
            "Get a batch of words the learner has not studied yet at an HSK level.",
            json!({
                "type": "object",
                "properties": {
                    "hsk_level": hsk_level_schema(),
                    "count": { "type": "integer", "minimum": 1, "maximum": MAX_BATCH, "default": DEFAULT_BATCH },
                    "user_id": user_id_schema()
                },
                "required": ["hsk_level"]
            }),
        ),
        tool(
            "get_vocabulary_by_level",
            "List vocabulary at an HSK level.",
            json!({
                "type": "object",
                "properties": {
                    "hsk_level": hsk_level_schema(),
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_LIST_LIMIT, "default": DEFAULT_LIST_LIMIT }
                },
                "required": ["hsk_level"]
            }),
        ),
        tool(
            "get_vocabulary_by_word_type",
            "List vocabulary of a word type (noun, verb, adjective, ...), optionally at one HSK level.",
            json!({
                "type": "object",
                "properties": {
                    "word_type": { "type": "string" },
                    "hsk_level": hsk_level_schema(),
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_LIST_LIMIT, "default": DEFAULT_LIST_LIMIT }
                },
                "required": ["word_type"]
            }),
        ),
        tool(
            "search_vocabulary",
            "Search vocabulary by hanzi, pinyin or English meaning.",
            json!({
                "type": "object",
                "properties": {
                    "search_term": { "type": "string" },
                    "hsk_level": hsk_level_schema()
                },
                "required": ["search_term"]
            }),
        ),
        tool(
            "get_vocabulary_statistics",
            "Count vocabulary by HSK level and word type, and how much of it the learner has studied.",
            json!({
                "type": "object",
                "properties": { "user_id": user_id_schema() }
            }),
        ),
        tool(
            "review_vocabulary",
            "List words that are due for spaced-repetition review.",
            json!({
                "type": "object",
                "properties": {
                    "hsk_level": hsk_level_schema(),
                    "count": { "type": "integer", "minimum": 1, "maximum": MAX_LIST_LIMIT, "default": DEFAULT_LIST_LIMIT },
                    "user_id": user_id_schema()
                }
            }),
        ),
        tool(
            "get_random_vocabulary",
            "Pick random words, optionally at one HSK level.",
            json!({
                "type": "object",
                "properties": {
                    "hsk_level": hsk_level_schema(),
                    "count": { "type": "integer", "minimum": 1, "maximum": MAX_BATCH, "default": DEFAULT_BATCH }
                }
            }),
        ),
        tool(
            "get_vocabulary_by_mastery",
            "List words the learner has at a given mastery level (0-5).",
            json!({
                "type": "object",
                "properties": {
                    "mastery_level": { "type": "integer", "minimum": 0, "maximum": 5 },
                    "hsk_level": hsk_level_schema(),
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_LIST_LIMIT, "default": DEFAULT_LIST_LIMIT },
                    "user_id": user_id_schema()
                },
                "required": ["mastery_level"]
            }),
        ),
        tool(
            "take_quiz",
            "Generate a quiz at an HSK level. Answers are submitted with submit_quiz_answers.",
            json!({
                "type": "object",
                "properties": {
                    "hsk_level": hsk_level_schema(),
                    "num_questions": { "type": "integer", "minimum": 1, "maximum": quiz::MAX_QUESTIONS, "default": quiz::DEFAULT_QUESTIONS },
                    "quiz_type": { "type": "string", "enum": ["translation", "multiple_choice"], "default": "translation" },
                    "direction": { "type": "string", "enum": ["chinese_to_english", "english_to_chinese"], "default": "chinese_to_english" },
                    "user_id": user_id_schema()
                },
                "required": ["hsk_level"]
            }),
        ),
        tool(
            "submit_quiz_answers",
            "Submit answers for a quiz, one per question in order. Updates the review schedule.",
            json!({
                "type": "object",
                "properties": {
                    "quiz_id": { "type": "string" },
                    "answers": { "type": "array", "items": { "type": "string" } },
                    "user_id": user_id_schema()
                },
                "required": ["quiz_id", "answers"]
            }),
        ),
        tool(
            "get_quiz_history",
            "Show recent quiz results, newest first.",
            json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_HISTORY, "default": DEFAULT_HISTORY },
                    "user_id": user_id_schema()
                }
            }),
        ),
        tool(
            "export_to_anki",
            "Export vocabulary with mastery levels to a CSV file that Anki can import.",
            json!({
                "type": "object",
                "properties": {
                    "hsk_level": hsk_level_schema(),
                    "filename": { "type": "string" },
                    "learned_only": { "type": "boolean", "default": false },
                    "user_id": user_id_schema()
                }
            }),
        ),
        tool(
            "clear_progress",
            "Delete all of the learner's progress and quiz history. Requires confirm: true.",
            json!({
                "type": "object",
                "properties": {
                    "confirm": { "type": "boolean" },
                    "user_id": user_id_schema()
                },
                "required": ["confirm"]
            }),
        ),
    ]
}

/// Runs a tool and renders its outcome. Invalid input and missing records
/// are reported back as error results; nothing here fails the JSON-RPC call.
pub async fn call_tool(db: &Database, config: &Config, name: &str, args: &Value) -> McpToolResult {
    let outcome = match name {
        "get_progress_stats" => get_progress_stats(db, config, args).await,
        "learn_vocabulary" => learn_vocabulary(db, config, args).await,
        "get_vocabulary_by_level" => get_vocabulary_by_level(db, args).await,
        "get_vocabulary_by_word_type" => get_vocabulary_by_word_type(db, args).await,
        "search_vocabulary" => search_vocabulary(db, args).await,
        "get_vocabulary_statistics" => get_vocabulary_statistics(db, config, args).await,
        "review_vocabulary" => review_vocabulary(db, config, args).await,
        "get_random_vocabulary" => get_random_vocabulary(db, args).await,
        "get_vocabulary_by_mastery" => get_vocabulary_by_mastery(db, config, args).await,
        "take_quiz" => take_quiz(db, config, args).await,
        "submit_quiz_answers" => submit_quiz_answers(db, config, args).await,
        "get_quiz_history" => get_quiz_history(db, config, args).await,
        "export_to_anki" => export_to_anki(db, config, args).await,
        "clear_progress" => clear_progress(db, config, args).await,
        _ => return McpToolResult::error(format!("Unknown tool: {name}")),
    };

    match outcome {
        Ok(text) => McpToolResult::text(text),
        Err(ServiceError::Validation(message)) => {
            McpToolResult::error(format!("Invalid input: {message}"))
        }
        Err(ServiceError::NotFound(message)) => McpToolResult::error(format!("Not found: {message}")),
        Err(err) => {
            tracing::error!(tool = name, error = %err, "tool call failed");
            McpToolResult::error(format!("Error: {err}"))
        }
    }
}

async fn get_progress_stats(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let stats = progress::stats(db, &user_id).await?;
    Ok(format::progress_stats(&stats))
}

async fn learn_vocabulary(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let level = parse_hsk_level(required_i64(args, "hsk_level")?)?;
    let count = bounded_count("count", optional_i64(args, "count")?, DEFAULT_BATCH, MAX_BATCH)?;

    let words = vocabulary::learn_new(db, &user_id, level, count).await?;
    if words.is_empty() {
        return Ok(format!(
            "You have studied every HSK {level} word. Try review_vocabulary or a higher level."
        ));
    }
    Ok(format::word_list(&format!("New HSK {level} words"), &words))
}

async fn get_vocabulary_by_level(db: &Database, args: &Value) -> Result<String, ServiceError> {
    let level = parse_hsk_level(required_i64(args, "hsk_level")?)?;
    let limit = list_limit(args)?;
    let words = vocabulary::list_by_level(db, level, limit).await?;
    Ok(format::word_list(&format!("HSK {level} vocabulary"), &words))
}

async fn get_vocabulary_by_word_type(db: &Database, args: &Value) -> Result<String, ServiceError> {
    let word_type = required_str(args, "word_type")?;
    let level = optional_level(args)?;
    let limit = list_limit(args)?;
    let words = vocabulary::list_by_word_type(db, word_type, level, limit).await?;

    let title = match level {
        Some(level) => format!("HSK {level} {word_type}s"),
        None => format!("Vocabulary of type '{word_type}'"),
    };
    Ok(format::word_list(&title, &words))
}

async fn search_vocabulary(db: &Database, args: &Value) -> Result<String, ServiceError> {
    let term = required_str(args, "search_term")?;
    let level = optional_level(args)?;
    let words = vocabulary::search(db, term, level).await?;
    Ok(format::word_list(&format!("Search results for '{term}'"), &words))
}

async fn get_vocabulary_statistics(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let stats = vocabulary::statistics(db, &user_id).await?;
    Ok(format::vocabulary_statistics(&stats))
}

async fn review_vocabulary(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let level = optional_level(args)?;
    let count = bounded_count(
        "count",
        optional_i64(args, "count")?,
        DEFAULT_LIST_LIMIT,
        MAX_LIST_LIMIT,
    )?;

    let words = vocabulary::review_due(db, &user_id, level, count).await?;
    if words.is_empty() {
        return Ok("No words are due for review right now.".to_string());
    }
    Ok(format::studied_words("Words due for review", &words))
}

async fn get_random_vocabulary(db: &Database, args: &Value) -> Result<String, ServiceError> {
    let level = optional_level(args)?;
    let count = bounded_count("count", optional_i64(args, "count")?, DEFAULT_BATCH, MAX_BATCH)?;
    let words = vocabulary::random(db, level, count).await?;
    Ok(format::word_list("Random vocabulary", &words))
}

async fn get_vocabulary_by_mastery(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let mastery = required_i64(args, "mastery_level")?;
    let level = optional_level(args)?;
    let limit = list_limit(args)?;

    let words = vocabulary::list_by_mastery(db, &user_id, mastery, level, limit).await?;
    Ok(format::studied_words(
        &format!("Words at mastery level {mastery}"),
        &words,
    ))
}

async fn take_quiz(db: &Database, config: &Config, args: &Value) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let request = QuizRequest::from_args(
        required_i64(args, "hsk_level")?,
        optional_i64(args, "num_questions")?,
        optional_str(args, "quiz_type")?,
        optional_str(args, "direction")?,
    )?;
    let generated = quiz::generate_quiz(db, &user_id, &request).await?;
    Ok(format::quiz(&generated))
}

async fn submit_quiz_answers(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let quiz_id = required_str(args, "quiz_id")?;
    let answers = string_list(args, "answers")?;
    let outcome = quiz::submit_answers(db, &user_id, quiz_id, &answers).await?;
    Ok(format::quiz_outcome(&outcome))
}

async fn get_quiz_history(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let limit = bounded_count(
        "limit",
        optional_i64(args, "limit")?,
        DEFAULT_HISTORY,
        MAX_HISTORY,
    )?;
    let results = quiz::history(db, &user_id, limit).await?;
    Ok(format::quiz_history(&results))
}

async fn export_to_anki(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let request = ExportRequest {
        hsk_level: optional_level(args)?,
        learned_only: optional_bool(args, "learned_only")?.unwrap_or(false),
    };
    let filename = optional_str(args, "filename")?;
    let summary =
        export::export_to_file(db, &user_id, &request, &config.export_dir, filename).await?;
    Ok(format::export_summary(&summary))
}

async fn clear_progress(
    db: &Database,
    config: &Config,
    args: &Value,
) -> Result<String, ServiceError> {
    let user_id = user_id(args, config)?;
    let confirm = optional_bool(args, "confirm")?.unwrap_or(false);
    let cleared = progress::clear(db, &user_id, confirm).await?;
    Ok(format::cleared(&user_id, &cleared))
}

// Argument helpers. Clients are inconsistent about numbers and booleans, so
// their string forms are accepted too.

fn user_id(args: &Value, config: &Config) -> Result<String, ServiceError> {
    Ok(optional_str(args, "user_id")?
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| config.default_user_id.clone()))
}

fn list_limit(args: &Value) -> Result<i64, ServiceError> {
    bounded_count(
        "limit",
        optional_i64(args, "limit")?,
        DEFAULT_LIST_LIMIT,
        MAX_LIST_LIMIT,
    )
}

fn optional_level(
    args: &Value,
) -> Result<Option<crate::db::operations::HskLevel>, ServiceError> {
    optional_i64(args, "hsk_level")?.map(parse_hsk_level).transpose()
}

pub fn optional_i64(args: &Value, key: &str) -> Result<Option<i64>, ServiceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ServiceError::validation(format!("{key} must be an integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ServiceError::validation(format!("{key} must be an integer"))),
        Some(_) => Err(ServiceError::validation(format!("{key} must be an integer"))),
    }
}

pub fn required_i64(args: &Value, key: &str) -> Result<i64, ServiceError> {
    optional_i64(args, key)?
        .ok_or_else(|| ServiceError::validation(format!("{key} is required")))
}

pub fn optional_str<'a>(args: &'a Value, key: &str) -> Result<Option<&'a str>, ServiceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ServiceError::validation(format!("{key} must be a string"))),
    }
}

pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ServiceError> {
    optional_str(args, key)?
        .ok_or_else(|| ServiceError::validation(format!("{key} is required")))
}

pub fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>, ServiceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ServiceError::validation(format!("{key} must be a boolean"))),
        },
        Some(_) => Err(ServiceError::validation(format!("{key} must be a boolean"))),
    }
}

/// A list of answers. Numbers are kept as their text; a string holding a
/// JSON array is unpacked.
pub fn string_list(args: &Value, key: &str) -> Result<Vec<String>, ServiceError> {
    let items = match args.get(key) {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) if s.trim_start().starts_with('[') => {
            serde_json::from_str::<Vec<Value>>(s)
                .map_err(|_| ServiceError::validation(format!("{key} must be a list")))?
        }
        None | Some(Value::Null) => {
            return Err(ServiceError::validation(format!("{key} is required")))
        }
        Some(_) => return Err(ServiceError::validation(format!("{key} must be a list"))),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(ServiceError::validation(format!(
                "{key} must contain only strings"
            ))),
        })
        .collect()
}
