//! User API management

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::hash;
use crate::password::verify;
use crate::storage;
use crate::storage::CreateUserValues;
use crate::storage::Storage;
use crate::users::MIN_PASSWORD_LENGTH;
use crate::users::User;
use crate::users::normalize_email;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::current_user::Token;
use super::current_user::generate_token;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The (normalized) email address
    pub email: String,

    /// When the user registered
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Credentials form, used to register and to login
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    /// Email address of the user
    email: String,
    /// Password of the user
    password: String,
}

/// Register a new user
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "someone@example.com", "password": "verysecret" }' \
///     http://localhost:6000/api/users
/// ```
///
/// Response
/// ```json
/// { "data": { "id": "<uuid>", "email": "someone@example.com", "created_at": "..." } }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    Form(form): Form<CredentialsForm>,
) -> Result<Success<UserResponse>, Error> {
    let email =
        normalize_email(&form.email).ok_or_else(|| Error::bad_request("Invalid email address"))?;

    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let hashed_password = hash(&form.password).map_err(Error::internal_server_error)?;

    let values = CreateUserValues {
        session_id: &Uuid::new_v4(),
        email: &email,
        hashed_password: &hashed_password,
    };

    let user = storage.create_user(&values).await.map_err(|err| match err {
        storage::Error::DuplicateUser(_) => Error::bad_request("User already exists"),
        err => Error::from(err),
    })?;

    tracing::info!("Registered user {}", user.id);

    Ok(Success::created(UserResponse::from_user(&user)))
}

/// Get a token for a user "session"
///
/// The token can then be used to access the rest of the API routes by using it in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "someone@example.com", "password": "verysecret" }' \
///     http://localhost:6000/api/users/token
/// ```
///
/// Response
/// ```json
/// { "data": { "token_type": "Bearer", "expires_in": 3600, "access_token": "some token" } }
/// ```
pub async fn token<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<CredentialsForm>,
) -> Result<Success<Token>, Error> {
    let Some(email) = normalize_email(&form.email) else {
        return Err(Error::bad_request("Invalid user"));
    };

    let user = storage.find_single_user_by_email(&email).await?;

    if let Some(user) = user {
        if verify(&user.hashed_password, &form.password) {
            let token = generate_token(&jwt_keys, &user)?;

            Ok(Success::ok(token))
        } else {
            Err(Error::bad_request("Invalid user"))
        }
    } else {
        Err(Error::bad_request("Invalid user"))
    }
}

/// Get the current user
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/users/me
/// ```
pub async fn me<S: Storage>(current_user: CurrentUser<S>) -> Success<UserResponse> {
    Success::ok(UserResponse::from_user(&current_user))
}

/// Sign out everywhere
///
/// A new session is started for the user, every token handed out before stops working
///
/// Request:
/// ```sh
/// curl -v -XPOST -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/users/logout
/// ```
pub async fn logout<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<&'static str>, Error> {
    storage
        .change_session(&current_user, &Uuid::new_v4())
        .await?;

    tracing::info!("Signed out user {}", current_user.id);

    Ok(Success::<&'static str>::no_content())
}
