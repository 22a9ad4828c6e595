//! HTTP server tests with an in-memory meal source.
//!
//! These exercise the real router (`run_server`) end to end: tool listing,
//! tool dispatch and its error contract, the plain-text meal endpoint, and
//! the MCP mount.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use school_meal::config::Config;
use school_meal::meal::build_service_with_fetcher;
use school_meal::server::run_server;
use school_meal_core::{MealDate, MealDocument, MealFetcher};

// ─── Test fixtures ──────────────────────────────────────────────────

/// Serves one lunch for the Seoul school and nothing for anyone else.
struct LunchFetcher;

#[async_trait]
impl MealFetcher for LunchFetcher {
    async fn fetch(&self, _office: &str, school: &str, _date: MealDate) -> Result<MealDocument> {
        if school == "7010083" {
            Ok(MealDocument::with_rows(vec![json!({
                "DDISH_NM": "카레라이스<br/>우유(2.)",
                "MMEAL_SC_NM": "중식",
                "CAL_INFO": "690.0 Kcal"
            })]))
        } else {
            Ok(MealDocument::with_result("INFO-200", "해당하는 데이터가 없습니다."))
        }
    }
}

fn test_config(tmp: &TempDir, port: u16) -> Config {
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("schools.json"),
        json!([
            {
                "ATPT_OFCDC_SC_CODE": "B10",
                "ATPT_OFCDC_SC_NM": "서울특별시교육청",
                "SD_SCHUL_CODE": "7010083",
                "SCHUL_NM": "서울고등학교"
            },
            {
                "ATPT_OFCDC_SC_CODE": "B10",
                "ATPT_OFCDC_SC_NM": "서울특별시교육청",
                "SD_SCHUL_CODE": "7091455",
                "SCHUL_NM": "삼성초등학교"
            },
            {
                "ATPT_OFCDC_SC_CODE": "J10",
                "ATPT_OFCDC_SC_NM": "경기도교육청",
                "SD_SCHUL_CODE": "7530560",
                "SCHUL_NM": "삼성초등학교"
            }
        ])
        .to_string(),
    )
    .unwrap();

    let config_content = format!(
        r#"[corpus]
dir = "{}"

[server]
bind = "127.0.0.1:{}"
"#,
        data.display(),
        port
    );
    toml::from_str(&config_content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Start the server in the background; returns its base URL.
async fn start_server(tmp: &TempDir) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let cfg = test_config(tmp, port);
    let service = build_service_with_fetcher(&cfg, Arc::new(LunchFetcher)).unwrap();

    let handle = tokio::spawn(async move {
        run_server(&cfg, service).await.ok();
    });
    wait_for_server(port).await;

    (format!("http://127.0.0.1:{}", port), handle)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_school_count() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["schools"], 3);

    handle.abort();
}

#[tokio::test]
async fn test_tools_list() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;

    let body: Value = reqwest::get(format!("{}/tools/list", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_school_meal", "find_school"]);
    assert_eq!(
        body["tools"][0]["parameters"]["properties"]["date"]["default"],
        "오늘"
    );

    handle.abort();
}

#[tokio::test]
async fn test_meal_tool_call() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/tools/get_school_meal", base))
        .json(&json!({ "school_name": "서울고등학교", "date": "20250408" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["result"],
        "[서울특별시교육청] 서울고등학교 2025-04-08 meal info:\n\n[중식] 690.0 Kcal\n카레라이스\n우유"
    );

    handle.abort();
}

#[tokio::test]
async fn test_meal_tool_input_errors() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;
    let client = reqwest::Client::new();
    let url = format!("{}/tools/get_school_meal", base);

    let resp = client.post(&url).json(&json!({})).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert_eq!(body["error"]["message"], "missing required parameter: school_name");

    let resp = client
        .post(&url)
        .json(&json!({ "school_name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "school_name must not be empty");

    let resp = client
        .post(&url)
        .json(&json!({ "school_name": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    handle.abort();
}

#[tokio::test]
async fn test_tool_call_body_must_be_json() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;
    let client = reqwest::Client::new();
    let url = format!("{}/tools/get_school_meal", base);

    let resp = client.post(&url).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{ school_name: ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(!body["error"]["message"].as_str().unwrap().is_empty());

    handle.abort();
}

#[tokio::test]
async fn test_school_name_is_not_trimmed() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/tools/find_school", base))
        .json(&json!({ "school_name": " 삼성초등학교" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["result"]["identities"].as_array().unwrap().is_empty());
    assert_eq!(body["result"]["suggestions"], json!(["삼성초등학교"]));

    let resp = client
        .post(format!("{}/tools/get_school_meal", base))
        .json(&json!({ "school_name": "서울고등학교 ", "date": "20250408" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["result"],
        "No school found matching \"서울고등학교 \".\n\nSimilar school names: 서울고등학교"
    );

    handle.abort();
}

#[tokio::test]
async fn test_unknown_tool_is_404() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/tools/search", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    handle.abort();
}

#[tokio::test]
async fn test_find_school_tool() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/tools/find_school", base))
        .json(&json!({ "school_name": "삼성초등학교" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let identities = body["result"]["identities"].as_array().unwrap();
    assert_eq!(identities.len(), 2);
    assert_eq!(identities[0]["office_code"], "J10");
    assert_eq!(identities[1]["office_code"], "B10");
    assert!(body["result"]["suggestions"].as_array().unwrap().is_empty());

    handle.abort();
}

#[tokio::test]
async fn test_plain_text_meal_endpoint() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/meals", base))
        .query(&[("school", "삼성초등학교"), ("date", "20250408")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let text = resp.text().await.unwrap();
    assert_eq!(
        text,
        format!(
            "Found 2 schools named \"삼성초등학교\".\n\n\
             [경기도교육청] 삼성초등학교: no meal data for 20250408\n\n{}\n\n\
             [서울특별시교육청] 삼성초등학교: no meal data for 20250408",
            "-".repeat(50)
        )
    );

    let resp = client
        .get(format!("{}/api/meals", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    handle.abort();
}

#[tokio::test]
async fn test_mcp_endpoint_accepts_initialize() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/mcp", base))
        .header("accept", "application/json, text/event-stream")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "0.0.0" }
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    handle.abort();
}
