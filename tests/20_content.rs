mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{result_id, TestApp};

#[tokio::test]
async fn quote_lifecycle() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let res = app
        .post("/api/quotes", Some(&admin), json!({ "text": "Plan the trade, trade the plan" }))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], "Quote created successfully");
    let id = result_id(&res);
    assert!(!id.is_empty());
    assert!(res.body["result"]["createdAt"].is_string());

    let res = app.get(&format!("/api/quotes/{}", id), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"]["text"], "Plan the trade, trade the plan");

    let res = app
        .put(&format!("/api/quotes/{}", id), Some(&admin), json!({ "image": "/uploads/q.png" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"]["text"], "Plan the trade, trade the plan");
    assert_eq!(res.body["result"]["image"], "/uploads/q.png");

    let res = app.delete(&format!("/api/quotes/{}", id), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Quote deleted successfully");

    let res = app.get(&format!("/api/quotes/{}", id), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Quote not found");
    Ok(())
}

#[tokio::test]
async fn quote_requires_text_or_image() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let res = app.post("/api/quotes", Some(&admin), json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Either text or image is required");
    Ok(())
}

#[tokio::test]
async fn guards_on_quotes_and_comments() -> Result<()> {
    let app = TestApp::new()?;
    let member = app.member_token("member@example.com").await?;

    let res = app.get("/api/quotes", None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get("/api/comments", Some(&member)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"], json!([]));

    let res = app.post("/api/comments", Some(&member), json!({ "text": "hi" })).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Not authorized as an admin");
    Ok(())
}

#[tokio::test]
async fn malformed_ids_are_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let res = app.get("/api/quotes/not-a-uuid", Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.delete("/api/videos/not-a-uuid", Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn charts_list_newest_first_and_delete_removes_image() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let upload = app
        .upload("/api/upload/images", Some(&admin), &[("images", "chart.png", &b"png-bytes"[..])])
        .await?;
    let image_url = upload.body["result"]["image_urls"][0]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let file_name = image_url.rsplit('/').next().unwrap_or_default().to_string();
    assert!(app.uploads.path().join(&file_name).exists());

    let first = app
        .post("/api/charts", Some(&admin), json!({ "imageUrl": image_url, "description": "SPY daily" }))
        .await?;
    assert_eq!(first.status, StatusCode::CREATED);
    let second = app
        .post("/api/charts", Some(&admin), json!({ "imageUrl": "/uploads/other.png", "description": "QQQ weekly" }))
        .await?;
    assert_eq!(second.status, StatusCode::CREATED);

    let res = app.get("/api/charts", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Charts of the Day retrieved successfully");
    assert_eq!(res.body["result"][0]["description"], "QQQ weekly");
    assert_eq!(res.body["result"][1]["description"], "SPY daily");

    let res = app.get(&format!("/api/charts/{}", result_id(&first)), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.delete(&format!("/api/charts/{}", result_id(&first)), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!app.uploads.path().join(&file_name).exists());

    // The second chart's file never existed; deletion still succeeds
    let res = app.delete(&format!("/api/charts/{}", result_id(&second)), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn videos_need_url_or_file() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let res = app.post("/api/videos", Some(&admin), json!({ "youtubeUrl": "" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Either youtubeUrl or a video file path is required.");

    let res = app
        .post("/api/videos", Some(&admin), json!({ "filePath": "/uploads/lesson.mp4" }))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.get("/api/videos", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"][0]["filePath"], "/uploads/lesson.mp4");
    Ok(())
}

#[tokio::test]
async fn quiz_manual_flag_follows_options() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let res = app
        .post(
            "/api/quizzes",
            Some(&admin),
            json!({ "question": "Why did it gap?", "video": "https://youtu.be/abc" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["result"]["isManual"], true);
    let id = result_id(&res);

    let res = app
        .put(
            &format!("/api/quizzes/{}", id),
            Some(&admin),
            json!({ "options": ["Earnings", "Macro"] }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"]["isManual"], false);
    assert_eq!(res.body["result"]["question"], "Why did it gap?");

    let res = app.get(&format!("/api/quizzes/{}", id), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn stocks_validate_option_type_and_list_publicly() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let res = app
        .post(
            "/api/stocks",
            Some(&admin),
            json!({ "image": "/uploads/s.png", "description": "Cup and handle", "optionType": "short" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post(
            "/api/stocks",
            Some(&admin),
            json!({ "image": "/uploads/s.png", "description": "Cup and handle", "optionType": "swing" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = result_id(&res);

    let res = app.get("/api/stocks/list", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"][0]["optionType"], "swing");

    let res = app.get(&format!("/api/stocks/{}", id), None).await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .put(&format!("/api/stocks/{}", id), None, json!({ "optionType": "long" }))
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn stock_routes_wait_for_the_transaction_lock() -> Result<()> {
    let app = TestApp::new()?;
    let wait = std::time::Duration::from_millis(100);

    let guard = app.state.transactions.lock().await;
    let blocked = tokio::time::timeout(wait, app.get("/api/stocks/list", None)).await;
    assert!(blocked.is_err());

    let res = tokio::time::timeout(wait, app.get("/api/videos", None)).await??;
    assert_eq!(res.status, StatusCode::OK);

    drop(guard);
    let res = tokio::time::timeout(wait, app.get("/api/stocks/list", None)).await??;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deleting_quote_video_and_stock_removes_their_uploads() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin_token().await?;

    let upload = app
        .upload(
            "/api/upload/images",
            Some(&admin),
            &[
                ("images", "quote.png", &b"q"[..]),
                ("images", "lesson.mp4", &b"v"[..]),
                ("images", "setup.jpg", &b"s"[..]),
            ],
        )
        .await?;
    let urls: Vec<String> = upload.body["result"]["image_urls"]
        .as_array()
        .map(|urls| urls.iter().filter_map(|u| u.as_str().map(String::from)).collect())
        .unwrap_or_default();
    assert_eq!(urls.len(), 3);

    let quote = app
        .post("/api/quotes", Some(&admin), json!({ "image": urls[0] }))
        .await?;
    let video = app
        .post("/api/videos", Some(&admin), json!({ "filePath": urls[1] }))
        .await?;
    let stock = app
        .post(
            "/api/stocks",
            Some(&admin),
            json!({ "image": urls[2], "description": "Flag", "optionType": "swing" }),
        )
        .await?;

    for (base, created) in [("/api/quotes", &quote), ("/api/videos", &video), ("/api/stocks", &stock)] {
        let res = app
            .delete(&format!("{}/{}", base, result_id(created)), Some(&admin))
            .await?;
        assert_eq!(res.status, StatusCode::OK);
    }

    assert_eq!(std::fs::read_dir(app.uploads.path())?.count(), 0);
    Ok(())
}
