use serde_json::{json, Value};

use hanzi_tutor::mcp::McpServer;
use hanzi_tutor::services::users;

mod common;

async fn server() -> (McpServer, common::TestContext) {
    let ctx = common::setup().await;
    let server = McpServer::new(ctx.db.clone(), ctx.config.clone());
    (server, ctx)
}

async fn request(server: &McpServer, message: Value) -> Value {
    let response = server
        .handle_line(&message.to_string())
        .await
        .expect("request with an id gets a response");
    serde_json::to_value(response).unwrap()
}

async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> (bool, String) {
    let response = request(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await;
    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap().to_string();
    (result["isError"].as_bool().unwrap(), text)
}

fn quiz_id(text: &str) -> String {
    text.lines()
        .find_map(|line| line.strip_prefix("Quiz ID: "))
        .unwrap()
        .trim()
        .to_string()
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let (server, _ctx) = server().await;

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "hanzi-tutor");

    let response = request(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    let tools = response["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    for expected in [
        "get_progress_stats",
        "learn_vocabulary",
        "take_quiz",
        "submit_quiz_answers",
        "export_to_anki",
        "clear_progress",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let (server, _ctx) = server().await;

    let line = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
    assert!(server.handle_line(&line).await.is_none());
}

#[tokio::test]
async fn test_protocol_errors() {
    let (server, _ctx) = server().await;

    let parse = serde_json::to_value(server.handle_line("{not json").await.unwrap()).unwrap();
    assert_eq!(parse["error"]["code"], -32700);
    assert_eq!(parse["id"], Value::Null);

    let unknown = request(&server, json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})).await;
    assert_eq!(unknown["error"]["code"], -32601);

    let version = request(&server, json!({"jsonrpc": "1.0", "id": 4, "method": "ping"})).await;
    assert_eq!(version["error"]["code"], -32600);

    let missing = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {}}),
    )
    .await;
    assert_eq!(missing["error"]["code"], -32602);
}

#[tokio::test]
async fn test_tool_errors_are_results() {
    let (server, _ctx) = server().await;

    let (is_error, text) = call_tool(&server, "no_such_tool", json!({})).await;
    assert!(is_error);
    assert!(text.contains("Unknown tool"));

    let (is_error, text) = call_tool(&server, "get_vocabulary_by_level", json!({"hsk_level": 9})).await;
    assert!(is_error);
    assert!(text.starts_with("Invalid input"));

    let (is_error, text) = call_tool(&server, "clear_progress", json!({})).await;
    assert!(is_error);
    assert!(text.contains("confirm"));

    let (is_error, text) = call_tool(&server, "get_progress_stats", json!({"user_id": "ghost"})).await;
    assert!(is_error);
    assert!(text.starts_with("Not found"));
}

#[tokio::test]
async fn test_configured_default_learner_is_seeded() {
    let ctx = common::setup().await;
    let mut config = ctx.config.clone();
    config.default_user_id = "alice".to_string();

    assert!(users::ensure_default_learner(&ctx.db, &config.default_user_id)
        .await
        .unwrap());
    assert!(!users::ensure_default_learner(&ctx.db, &config.default_user_id)
        .await
        .unwrap());

    let server = McpServer::new(ctx.db.clone(), config);
    let (is_error, text) = call_tool(&server, "get_progress_stats", json!({})).await;
    assert!(!is_error, "{text}");
    assert!(text.contains("'alice'"));
}

#[tokio::test]
async fn test_vocabulary_tools() {
    let (server, _ctx) = server().await;

    let (is_error, text) = call_tool(&server, "get_vocabulary_by_level", json!({"hsk_level": "1", "limit": 3})).await;
    assert!(!is_error, "{text}");
    assert!(text.contains("你好"));

    let (is_error, text) = call_tool(&server, "search_vocabulary", json!({"search_term": "coffee"})).await;
    assert!(!is_error);
    assert!(text.contains("咖啡"));

    let (is_error, text) = call_tool(&server, "learn_vocabulary", json!({"hsk_level": 2})).await;
    assert!(!is_error);
    assert!(text.contains("便宜"));
}

#[tokio::test]
async fn test_quiz_through_tools() {
    let (server, _ctx) = server().await;

    let (is_error, text) = call_tool(&server, "take_quiz", json!({"hsk_level": 1, "num_questions": 2})).await;
    assert!(!is_error, "{text}");
    let id = quiz_id(&text);

    let (is_error, text) = call_tool(
        &server,
        "submit_quiz_answers",
        json!({"quiz_id": id, "answers": ["only one"]}),
    )
    .await;
    assert!(is_error);
    assert!(text.contains("expected 2 answers"));

    let (is_error, text) = call_tool(
        &server,
        "submit_quiz_answers",
        json!({"quiz_id": id, "answers": ["nope", "nope"]}),
    )
    .await;
    assert!(!is_error, "{text}");
    assert!(text.starts_with("Quiz results: 0/2 correct"));
    assert!(text.contains("Keep practicing!"));

    let (is_error, text) = call_tool(&server, "get_progress_stats", json!({})).await;
    assert!(!is_error);
    assert!(text.contains("Words studied: 2"));

    let (is_error, _) = call_tool(&server, "clear_progress", json!({"confirm": true})).await;
    assert!(!is_error);
}

#[tokio::test]
async fn test_export_tool_writes_into_export_dir() {
    let (server, ctx) = server().await;

    let (is_error, text) = call_tool(&server, "export_to_anki", json!({"hsk_level": 2, "filename": "hsk2"})).await;
    assert!(!is_error, "{text}");
    let path = ctx.config.export_dir.join("hsk2.csv");
    assert!(text.contains("Exported 3 words"));
    assert!(path.exists());
}

#[tokio::test]
async fn test_serve_answers_each_line() {
    let (server, _ctx) = server().await;

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}).to_string(),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        String::new(),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}).to_string(),
    ]
    .join("\n");
    let mut output = Vec::new();

    server
        .serve(tokio::io::BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    let responses: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], json!({}));
}
