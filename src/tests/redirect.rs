use axum::http::StatusCode;

use crate::storage::Memory;
use crate::tests::helper;

#[tokio::test]
async fn test_redirect_counts_down() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let link = helper::create_link(&mut app, &access_token, "example.com/path", "abc123").await;

    let (status_code, location, refresh) = helper::redirect(&mut app, "/s/abc123").await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(None, location);
    assert_eq!(
        Some("5; url=https://example.com/path".to_string()),
        refresh
    );

    let (_, link, _) = helper::single_link(&mut app, &access_token, &link.id).await;
    assert_eq!(1, link.unwrap().click_count);
}

#[tokio::test]
async fn test_redirect_skip() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let link = helper::create_link(&mut app, &access_token, "example.com/path", "abc123").await;

    let (status_code, location, refresh) = helper::redirect(&mut app, "/s/abc123?skip=true").await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, status_code);
    assert_eq!(Some("https://example.com/path".to_string()), location);
    assert_eq!(None, refresh);

    // not skipping is the same as leaving it out
    let (status_code, location, _) = helper::redirect(&mut app, "/s/abc123?skip=false").await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(None, location);

    let (_, link, _) = helper::single_link(&mut app, &access_token, &link.id).await;
    assert_eq!(2, link.unwrap().click_count);
}

#[tokio::test]
async fn test_redirect_without_countdown() {
    let mut config = helper::app_config();
    config.countdown_seconds = 0;

    let mut app = helper::setup_test_app_with_storage(Memory::new(), &config);

    let access_token = helper::login(&mut app).await;

    helper::create_link(&mut app, &access_token, "example.com", "abc123").await;

    let (status_code, location, _) = helper::redirect(&mut app, "/s/abc123").await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, status_code);
    assert_eq!(Some("https://example.com/".to_string()), location);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let mut app = helper::setup_test_app().await;

    let (status_code, location, refresh) = helper::redirect(&mut app, "/s/missing").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(None, location);
    assert_eq!(None, refresh);

    let (status_code, _, _) = helper::redirect(&mut app, "/s/missing?skip=true").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
}

#[tokio::test]
async fn test_redirect_with_invalid_query() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let link = helper::create_link(&mut app, &access_token, "example.com", "abc123").await;

    let (status_code, _, _) = helper::redirect(&mut app, "/s/abc123?skip=maybe").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    // rejected before the lookup, no click
    let (_, link, _) = helper::single_link(&mut app, &access_token, &link.id).await;
    assert_eq!(0, link.unwrap().click_count);
}
