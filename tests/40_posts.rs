mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{result_id, TestApp};

#[tokio::test]
async fn members_post_and_everyone_reads() -> Result<()> {
    let app = TestApp::new()?;
    let member = app.member_token("writer@example.com").await?;

    let res = app
        .post("/api/posts", None, json!({ "title": "t", "content": "c" }))
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .post(
            "/api/posts",
            Some(&member),
            json!({ "title": "Breakout watch", "content": "AAPL above 200", "imageUrl": "/uploads/a.png" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["result"]["author"]["name"], "Test writer");
    let id = result_id(&res);

    let res = app.get("/api/posts", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"][0]["title"], "Breakout watch");
    assert_eq!(res.body["result"][0]["imageUrl"], "/uploads/a.png");

    let res = app.get(&format!("/api/posts/{}", id), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Post retrieved successfully");
    Ok(())
}

#[tokio::test]
async fn comments_are_populated() -> Result<()> {
    let app = TestApp::new()?;
    let member = app.member_token("writer@example.com").await?;

    let post = app
        .post("/api/posts", Some(&member), json!({ "title": "Q", "content": "Thoughts?" }))
        .await?;
    let id = result_id(&post);

    let res = app
        .post(&format!("/api/posts/{}/comments", id), Some(&member), json!({ "text": "Bullish" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&format!("/api/posts/{}", id), None).await?;
    assert_eq!(res.body["result"]["comments"][0]["text"], "Bullish");
    assert!(res.body["result"]["comments"][0]["id"].is_string());
    Ok(())
}

#[tokio::test]
async fn like_toggles() -> Result<()> {
    let app = TestApp::new()?;
    let member = app.member_token("writer@example.com").await?;

    let post = app
        .post("/api/posts", Some(&member), json!({ "title": "Q", "content": "Like me" }))
        .await?;
    let uri = format!("/api/posts/{}/like", result_id(&post));

    let res = app.post(&uri, Some(&member), json!({})).await?;
    assert_eq!(res.body["message"], "Post liked successfully");
    assert_eq!(res.body["result"]["likes"].as_array().map(Vec::len), Some(1));

    let res = app.post(&uri, Some(&member), json!({})).await?;
    assert_eq!(res.body["result"]["likes"], json!([]));
    Ok(())
}

#[tokio::test]
async fn only_author_deletes() -> Result<()> {
    let app = TestApp::new()?;
    let author = app.member_token("writer@example.com").await?;
    let other = app.member_token("reader@example.com").await?;

    let post = app
        .post("/api/posts", Some(&author), json!({ "title": "Mine", "content": "Hands off" }))
        .await?;
    let uri = format!("/api/posts/{}", result_id(&post));

    let res = app.delete(&uri, Some(&other)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "User not authorized");

    let res = app.delete(&uri, Some(&author)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Post removed");

    let res = app.get(&uri, None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
