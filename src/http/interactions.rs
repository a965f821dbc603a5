use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::id::{
    marker::{ApplicationMarker, InteractionMarker},
    Id,
};
use crate::types::message::{EditMessage, Message};
use crate::types::response::InteractionResponse;

fn original(method: Method, application_id: Id<ApplicationMarker>, token: &str) -> Route {
    Route::new(
        method,
        "/webhooks/{webhook_id}/{webhook_token}/messages/@original",
    )
    .param("webhook_id", application_id)
    .param("webhook_token", token)
    .without_auth()
}

impl HttpClient {
    /// Send the initial response to an interaction.
    ///
    /// Uploads as multipart when the response carries files.
    pub async fn create_interaction_response(
        &self,
        interaction_id: Id<InteractionMarker>,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<(), HttpError> {
        let route = Route::new(
            Method::POST,
            "/interactions/{webhook_id}/{webhook_token}/callback",
        )
        .param("webhook_id", interaction_id)
        .param("webhook_token", token)
        .without_auth();
        let payload = response.payload_json().map_err(|source| HttpError::Decode {
            route: route.display(),
            source,
        })?;
        let body = Body::with_files(payload, response.files());
        self.request_empty(&route, &body).await
    }

    pub async fn original_response(
        &self,
        application_id: Id<ApplicationMarker>,
        token: &str,
    ) -> Result<Message, HttpError> {
        let route = original(Method::GET, application_id, token);
        self.request_json(&route, &Body::Empty).await
    }

    pub async fn edit_original_response(
        &self,
        application_id: Id<ApplicationMarker>,
        token: &str,
        edit: &EditMessage,
    ) -> Result<Message, HttpError> {
        let route = original(Method::PATCH, application_id, token);
        self.request_json(&route, &Body::json(edit)?).await
    }

    pub async fn delete_original_response(
        &self,
        application_id: Id<ApplicationMarker>,
        token: &str,
    ) -> Result<(), HttpError> {
        let route = original(Method::DELETE, application_id, token);
        self.request_empty(&route, &Body::Empty).await
    }
}
