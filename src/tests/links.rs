use axum::http::StatusCode;
use uuid::Uuid;

use crate::tests::helper;

#[tokio::test]
async fn test_list_links_newest_first() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (_, links) = helper::list_links(&mut app, &access_token).await;
    assert!(links.unwrap().is_empty());

    for short_code in ["first", "second", "third"] {
        helper::create_link(&mut app, &access_token, "example.com", short_code).await;
    }

    let (status_code, links) = helper::list_links(&mut app, &access_token).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(
        vec!["third", "second", "first"],
        links
            .unwrap()
            .iter()
            .map(|link| link.short_code.as_str())
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_links_are_owned() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;
    let other_access_token = helper::login_as(&mut app, "other@example.com").await;

    let link = helper::create_link(&mut app, &access_token, "example.com", "abc123").await;

    // not listed for others
    let (_, links) = helper::list_links(&mut app, &other_access_token).await;
    assert!(links.unwrap().is_empty());

    // does not exist for others
    let (status_code, _, error) =
        helper::single_link(&mut app, &other_access_token, &link.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Link not found".to_string(), error.unwrap());

    let (status_code, _, _) = helper::maybe_update_link(
        &mut app,
        &other_access_token,
        &link.id,
        Some("evil.example.com"),
        None,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    let (status_code, _) = helper::maybe_delete_link(&mut app, &other_access_token, &link.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    let (status_code, _, _) =
        helper::analytics(&mut app, &other_access_token, &link.id, "").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    // untouched for the owner
    let (status_code, link, _) = helper::single_link(&mut app, &access_token, &link.id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("https://example.com".to_string(), link.unwrap().original_url);
}

#[tokio::test]
async fn test_single_link_missing() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, _, error) =
        helper::single_link(&mut app, &access_token, &Uuid::new_v4()).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Link not found".to_string(), error.unwrap());
}
