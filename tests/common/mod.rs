#![allow(dead_code)]

use axum::Router;
use tempfile::TempDir;

use hanzi_tutor::config::Config;
use hanzi_tutor::db::config::DbConfig;
use hanzi_tutor::db::Database;
use hanzi_tutor::seed;

pub const SAMPLE_DATASET: &str = r#"{
  "hsk1": [
    {"chinese": "你好", "pinyin": "nǐ hǎo", "english": "hello", "word_type": "phrase"},
    {"chinese": "谢谢", "pinyin": "xiè xie", "english": "thank you, thanks", "word_type": "verb"},
    {"chinese": "水", "pinyin": "shuǐ", "english": "water", "word_type": "noun"},
    {"chinese": "猫", "pinyin": "māo", "english": "cat", "word_type": "noun"},
    {"chinese": "吃", "pinyin": "chī", "english": "to eat", "word_type": "verb"},
    {"chinese": "大", "pinyin": "dà", "english": "big, large", "word_type": "adjective"}
  ],
  "hsk2": [
    {"chinese": "咖啡", "pinyin": "kā fēi", "english": "coffee", "word_type": "noun"},
    {"chinese": "旅游", "pinyin": "lǚ yóu", "english": "to travel", "word_type": "verb"},
    {"chinese": "便宜", "pinyin": "pián yi", "english": "cheap", "word_type": "adjective"}
  ]
}"#;

pub const HSK1_WORDS: usize = 6;

/// A seeded database in a temporary directory. The directory lives as long
/// as the context.
pub struct TestContext {
    pub db: Database,
    pub config: Config,
    pub dir: TempDir,
}

pub async fn setup() -> TestContext {
    let dir = TempDir::new().expect("temp dir");
    let db = Database::connect(DbConfig::at_path(dir.path().join("learning.db")))
        .await
        .expect("open database");

    let words = seed::parse_dataset(SAMPLE_DATASET).expect("sample dataset");
    seed::load_vocabulary(&db, &words).await.expect("seed vocabulary");

    let mut config = Config::for_database(DbConfig::at_path(db.path()));
    config.export_dir = dir.path().join("exports");

    TestContext { db, config, dir }
}

pub async fn create_test_app() -> (Router, TestContext) {
    let ctx = setup().await;
    let app = hanzi_tutor::create_app(ctx.db.clone(), ctx.config.clone());
    (app, ctx)
}
