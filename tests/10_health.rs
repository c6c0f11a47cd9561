mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_database_ok() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };

    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };

    let res = reqwest::get(format!("{}/", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["data"]["name"], "Wayfarer API");
    assert!(payload["data"]["endpoints"]["tours"].is_string());
    Ok(())
}
