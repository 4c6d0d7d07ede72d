mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::TestApp;

#[tokio::test]
async fn health_reports_store_backend() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/health", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["result"]["status"], "ok");
    assert_eq!(res.body["result"]["database"], "memory");
    Ok(())
}

#[tokio::test]
async fn root_banner_lists_endpoints() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["result"]["name"], "Chini API");
    assert!(res.body["result"]["endpoints"]["auth"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let res = app.get("/api/does-not-exist", None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
