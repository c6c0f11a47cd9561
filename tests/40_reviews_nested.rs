mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

// Nested review routes plus the rating-aggregate hook on the parent tour.

async fn create_user(server: &common::TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let email = format!("reviewer-{}@example.com", uuid::Uuid::new_v4().simple());
    let res = client
        .post(format!("{}/api/users", server.base_url))
        .json(&json!({ "name": "Review Tester", "email": email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json::<Value>().await?["data"]["data"]["id"].as_str().unwrap().to_string())
}

async fn create_tour(server: &common::TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..10];
    let res = client
        .post(format!("{}/api/tours", server.base_url))
        .json(&json!({
            "name": format!("Review Tour {}", suffix),
            "duration": 2,
            "max_group_size": 6,
            "difficulty": "easy",
            "price": 99.0,
            "summary": "Fixture tour for the review aggregate tests",
            "image_cover": "review-cover.jpg",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json::<Value>().await?["data"]["data"]["id"].as_str().unwrap().to_string())
}

async fn fetch_tour(server: &common::TestServer, id: &str) -> Result<Value> {
    let res = reqwest::get(format!("{}/api/tours/{}", server.base_url, id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(res.json::<Value>().await?["data"]["data"].clone())
}

#[tokio::test]
async fn nested_reviews_scope_and_recompute_ratings() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();

    let user_id = create_user(server).await?;
    let tour_id = create_tour(server).await?;

    // Nested create: the tour reference comes from the path
    let res = client
        .post(format!("{}/api/tours/{}/reviews", server.base_url, tour_id))
        .json(&json!({
            "review": "Short but sweet, would go again",
            "rating": 4,
            "user_id": user_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let review = res.json::<Value>().await?["data"]["data"].clone();
    assert_eq!(review["tour_id"], tour_id.as_str());
    let review_id = review["id"].as_str().unwrap().to_string();

    // Nested list is scoped to the tour
    let res = client
        .get(format!("{}/api/tours/{}/reviews", server.base_url, tour_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["data"][0]["id"], review_id.as_str());

    // The ratings hook recomputed the parent tour's aggregates, and the
    // expansion inlines the review on single-item retrieval
    let tour = fetch_tour(server, &tour_id).await?;
    assert_eq!(tour["ratings_quantity"], 1);
    assert_eq!(tour["ratings_average"], 4.0);
    assert_eq!(tour["reviews"].as_array().unwrap().len(), 1);

    // One review per user per tour
    let res = client
        .post(format!("{}/api/tours/{}/reviews", server.base_url, tour_id))
        .json(&json!({
            "review": "Trying to review twice",
            "rating": 1,
            "user_id": user_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Deleting the review resets the aggregates to their defaults
    let res = client
        .delete(format!("{}/api/reviews/{}", server.base_url, review_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let tour = fetch_tour(server, &tour_id).await?;
    assert_eq!(tour["ratings_quantity"], 0);
    assert_eq!(tour["ratings_average"], 4.5);

    // Cleanup
    client.delete(format!("{}/api/tours/{}", server.base_url, tour_id)).send().await?;
    client.delete(format!("{}/api/users/{}", server.base_url, user_id)).send().await?;
    Ok(())
}

#[tokio::test]
async fn review_payloads_are_validated() -> Result<()> {
    let Some(server) = common::server_or_skip().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();

    let user_id = create_user(server).await?;
    let tour_id = create_tour(server).await?;

    let res = client
        .post(format!("{}/api/tours/{}/reviews", server.base_url, tour_id))
        .json(&json!({
            "review": "Rating out of range",
            "rating": 9,
            "user_id": user_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "fail");
    assert!(body["errors"]["rating"].is_string());

    client.delete(format!("{}/api/tours/{}", server.base_url, tour_id)).send().await?;
    client.delete(format!("{}/api/users/{}", server.base_url, user_id)).send().await?;
    Ok(())
}
