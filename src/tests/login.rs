use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_login() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;
    assert!(access_token.len() > 10);
}

#[tokio::test]
async fn test_login_normalizes_email() {
    let mut app = helper::setup_test_app().await;

    helper::login(&mut app).await;

    let (status_code, access_token) =
        helper::maybe_login(&mut app, "  SomeOne@Example.COM ", helper::PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(access_token.is_some());
}

#[tokio::test]
async fn test_login_with_invalid_credentials() {
    let mut app = helper::setup_test_app().await;

    helper::login(&mut app).await;

    let (status_code, access_token) =
        helper::maybe_login(&mut app, helper::EMAIL, "wrongpassword").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(access_token.is_none());

    let (status_code, access_token) =
        helper::maybe_login(&mut app, "nobody@example.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(access_token.is_none());
}

#[tokio::test]
async fn test_invalid_tokens_are_forbidden() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _) = helper::current_user(&mut app, "Bearer not-a-token").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);

    let (status_code, _) = helper::list_links(&mut app, "").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
}

#[tokio::test]
async fn test_token_from_other_secret_is_forbidden() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let mut config = helper::app_config();
    config.jwt_secret = "othersecret".to_string();

    let mut other_app = helper::setup_test_app_with_storage(crate::storage::Memory::new(), &config);

    let (status_code, _) = helper::current_user(&mut other_app, &access_token).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
}

#[tokio::test]
async fn test_logout_invalidates_tokens() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, error) = helper::logout(&mut app, &access_token).await;
    assert_eq!(StatusCode::NO_CONTENT, status_code);
    assert!(error.is_none());

    let (status_code, _) = helper::current_user(&mut app, &access_token).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);

    let (status_code, error) = helper::logout(&mut app, &access_token).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(Some("Token expired".to_string()), error);

    // a new login starts a new session
    let (status_code, access_token) =
        helper::maybe_login(&mut app, helper::EMAIL, helper::PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, user) = helper::current_user(&mut app, &access_token.unwrap()).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(helper::EMAIL, user.unwrap().email);
}
