use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::id::{marker::UserMarker, Id};
use crate::types::user::User;

impl HttpClient {
    pub async fn current_user(&self) -> Result<User, HttpError> {
        let route = Route::new(Method::GET, "/users/@me");
        self.request_json(&route, &Body::Empty).await
    }

    pub async fn user(&self, user_id: Id<UserMarker>) -> Result<User, HttpError> {
        let route = Route::new(Method::GET, "/users/{user_id}").param("user_id", user_id);
        self.request_json(&route, &Body::Empty).await
    }
}
