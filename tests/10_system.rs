mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn root_reports_service_banner() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{}/", server.base_url)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["name"], "edvirons-api");
    assert!(body["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_reports_database_state() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // Healthy with a database, degraded without; both are well-formed
    let status = resp.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected health status {}",
        status
    );

    let body: serde_json::Value = resp.json().await?;
    match status {
        StatusCode::OK => assert_eq!(body["status"], "healthy"),
        _ => assert_eq!(body["status"], "degraded"),
    }
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_404() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/no-such-route", server.base_url))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}
