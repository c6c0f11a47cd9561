mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

// List-surface behavior: filtering, sorting, projection and pagination as
// translated from the query string.

struct Fixture {
    ids: Vec<String>,
    group_size: i64,
}

/// Three tours sharing a unique `max_group_size` sentinel so the suite
/// only ever sees its own records.
async fn create_fixture(server: &common::TestServer) -> Result<Fixture> {
    let client = reqwest::Client::new();
    // A sentinel in a range no real payload uses
    let group_size = 1000 + (uuid::Uuid::new_v4().as_u128() % 100_000) as i64;

    let mut ids = Vec::new();
    for (idx, price) in [(1, 100.0), (2, 200.0), (3, 300.0)] {
        let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
        let payload = json!({
            "name": format!("Query Tour {} {}", idx, suffix),
            "duration": 3,
            "max_group_size": group_size,
            "difficulty": "medium",
            "price": price,
            "summary": "Fixture tour for query translation tests",
            "image_cover": "query-cover.jpg",
        });
        let res = client
            .post(format!("{}/api/tours", server.base_url))
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED, "fixture create failed");
        let body = res.json::<Value>().await?;
        ids.push(body["data"]["data"]["id"].as_str().unwrap().to_string());
    }
    Ok(Fixture { ids, group_size })
}

async fn drop_fixture(server: &common::TestServer, fixture: &Fixture) -> Result<()> {
    let client = reqwest::Client::new();
    for id in &fixture.ids {
        client.delete(format!("{}/api/tours/{}", server.base_url, id)).send().await?;
    }
    Ok(())
}

async fn list(server: &common::TestServer, query: &str) -> Result<(StatusCode, Value)> {
    let res = reqwest::get(format!("{}/api/tours?{}", server.base_url, query)).await?;
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}

#[tokio::test]
async fn comparison_filters_select_matching_records() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };
    let fixture = create_fixture(server).await?;

    // price >= 200 keeps the boundary record
    let (status, body) = list(
        server,
        &format!("max_group_size={}&price[gte]=200", fixture.group_size),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["results"], 2);
    for record in body["data"]["data"].as_array().unwrap() {
        assert!(record["price"].as_f64().unwrap() >= 200.0);
    }

    // Strict comparison excludes it
    let (_, body) = list(
        server,
        &format!("max_group_size={}&price[gt]=200", fixture.group_size),
    )
    .await?;
    assert_eq!(body["results"], 1);

    drop_fixture(server, &fixture).await?;
    Ok(())
}

#[tokio::test]
async fn sort_orders_primary_then_secondary() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };
    let fixture = create_fixture(server).await?;

    let (status, body) = list(
        server,
        &format!("max_group_size={}&sort=-price,name", fixture.group_size),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<f64> = body["data"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![300.0, 200.0, 100.0]);

    drop_fixture(server, &fixture).await?;
    Ok(())
}

#[tokio::test]
async fn projection_returns_exactly_the_requested_fields() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };
    let fixture = create_fixture(server).await?;

    let (status, body) = list(
        server,
        &format!("max_group_size={}&fields=name,price", fixture.group_size),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    for record in body["data"]["data"].as_array().unwrap() {
        let mut keys: Vec<&str> =
            record.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["id", "name", "price"]);
    }

    // The default projection hides the internal version column
    let (_, body) = list(server, &format!("max_group_size={}", fixture.group_size)).await?;
    for record in body["data"]["data"].as_array().unwrap() {
        assert!(record.get("version").is_none(), "version leaked: {}", record);
    }

    // Mixing inclusion and exclusion is rejected
    let (status, body) = list(
        server,
        &format!("max_group_size={}&fields=name,-price", fixture.group_size),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");

    drop_fixture(server, &fixture).await?;
    Ok(())
}

#[tokio::test]
async fn pagination_windows_the_result_set() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };
    let fixture = create_fixture(server).await?;

    let (_, body) = list(
        server,
        &format!("max_group_size={}&sort=price&limit=2&page=1", fixture.group_size),
    )
    .await?;
    assert_eq!(body["results"], 2);

    let (_, body) = list(
        server,
        &format!("max_group_size={}&sort=price&limit=2&page=2", fixture.group_size),
    )
    .await?;
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["data"][0]["price"], 300.0);

    // Malformed pagination values fall back to defaults instead of erroring
    let (status, body) = list(
        server,
        &format!("max_group_size={}&page=abc&limit=xyz", fixture.group_size),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 3);

    drop_fixture(server, &fixture).await?;
    Ok(())
}

#[tokio::test]
async fn unknown_filter_fields_are_rejected() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };

    let (status, body) = list(server, "not_a_column=5").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");

    let (status, _) = list(server, "price[within]=5").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
