use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_invalid_json() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    // missing data
    let body = r"{}";
    let (status_code, _, error) =
        helper::maybe_create_link_with_raw_body(&mut app, &access_token, body, true).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(error.is_some());
    let error = error.unwrap();
    assert_eq!("Data error".to_string(), error.error);
    assert_eq!(
        Some(
            "Failed to deserialize the JSON body into the target type: missing field `original_url` at line 1 column 2"
                .to_string()
        ),
        error.description
    );

    // wrong type
    let body = r#"{"original_url":42}"#;
    let (status_code, _, error) =
        helper::maybe_create_link_with_raw_body(&mut app, &access_token, body, true).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Data error".to_string(), error.unwrap().error);

    // syntax error
    let body = r#"{"}"#;
    let (status_code, _, error) =
        helper::maybe_create_link_with_raw_body(&mut app, &access_token, body, true).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(error.is_some());
    let error = error.unwrap();
    assert_eq!("JSON syntax error".to_string(), error.error);
    assert_eq!(
        Some("EOF while parsing a string at line 1 column 3".to_string()),
        error.description
    );

    // missing content type
    let body = r"{}";
    let (status_code, _, error) =
        helper::maybe_create_link_with_raw_body(&mut app, &access_token, body, false).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(error.is_some());
    let error = error.unwrap();
    assert_eq!(
        "Missing `application/json` content type".to_string(),
        error.error
    );

    // nothing was created along the way
    let (_, links) = helper::list_links(&mut app, &access_token).await;
    assert!(links.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_path_parameter() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, error) =
        helper::single_link_with_str(&mut app, &access_token, "not-a-uuid").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid path parameter".to_string(), error.unwrap().error);
}
