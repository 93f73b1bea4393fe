//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use request::RequestHit;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod analytics;
mod current_user;
mod links;
mod request;
mod resolve;
mod response;
mod users;
mod utils;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let users = Router::new()
        .route("/", post(users::create::<S>))
        .route("/token", post(users::token::<S>))
        .route("/me", get(users::me::<S>))
        .route("/logout", post(users::logout::<S>));

    let links = Router::new()
        .route("/", get(links::list::<S>).post(links::create::<S>))
        .route(
            "/{link}",
            get(links::single::<S>)
                .patch(links::update::<S>)
                .delete(links::delete::<S>),
        )
        .route("/{link}/analytics", get(analytics::daily_clicks::<S>));

    Router::new()
        .nest("/users", users)
        .nest("/links", links)
        .route("/resolve/{short_code}", get(resolve::resolve::<S>))
}
