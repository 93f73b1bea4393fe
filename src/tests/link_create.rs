use axum::http::StatusCode;

use crate::slugs;
use crate::tests::helper;

#[tokio::test]
async fn test_create_link() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, link, _) =
        helper::maybe_create_link(&mut app, &access_token, "example.com", Some("abc123")).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let link = link.unwrap();
    assert_eq!("https://example.com".to_string(), link.original_url);
    assert_eq!("abc123".to_string(), link.short_code);
    assert_eq!(0, link.click_count);

    let (status_code, single, _) = helper::single_link(&mut app, &access_token, &link.id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(link.short_code, single.unwrap().short_code);
}

#[tokio::test]
async fn test_create_link_generates_short_code() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    for short_code in [None, Some(""), Some("   ")] {
        let (status_code, link, _) = helper::maybe_create_link(
            &mut app,
            &access_token,
            "https://www.example.com/some/long/path",
            short_code,
        )
        .await;
        assert_eq!(StatusCode::CREATED, status_code);

        let link = link.unwrap();
        assert_eq!(slugs::GENERATED_LENGTH, link.short_code.len());
        assert!(
            link.short_code
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric())
        );
    }
}

#[tokio::test]
async fn test_create_link_with_duplicate_short_code() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;
    let other_access_token = helper::login_as(&mut app, "other@example.com").await;

    helper::create_link(&mut app, &access_token, "example.com", "abc123").await;

    // unique across all users
    let (status_code, link, error) =
        helper::maybe_create_link(&mut app, &other_access_token, "example.org", Some("abc123"))
            .await;
    assert_eq!(StatusCode::CONFLICT, status_code);
    assert!(link.is_none());
    assert_eq!("Short code `abc123` already exists".to_string(), error.unwrap());

    // case-sensitive
    let (status_code, _, _) =
        helper::maybe_create_link(&mut app, &other_access_token, "example.org", Some("ABC123"))
            .await;
    assert_eq!(StatusCode::CREATED, status_code);
}

#[tokio::test]
async fn test_create_link_with_invalid_input() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let invalid = [
        ("example.com", Some("ab")),
        ("example.com", Some("abcdefghijklmnopqrstu")),
        ("example.com", Some("no spaces")),
        ("example.com", Some("emoji-🦀")),
        ("example.com", Some("slash/es")),
        ("", Some("abc123")),
        ("ftp://example.com", Some("abc123")),
        ("https://", Some("abc123")),
    ];

    for (original_url, short_code) in invalid {
        let (status_code, link, error) =
            helper::maybe_create_link(&mut app, &access_token, original_url, short_code).await;
        assert_eq!(
            StatusCode::BAD_REQUEST,
            status_code,
            "{original_url} {short_code:?}"
        );
        assert!(link.is_none());
        assert!(error.is_some());
    }

    // nothing stored
    let (_, links) = helper::list_links(&mut app, &access_token).await;
    assert!(links.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_link_requires_token() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _, error) =
        helper::maybe_create_link(&mut app, "", "example.com", Some("abc123")).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!("Missing API token".to_string(), error.unwrap());
}
