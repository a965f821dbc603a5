use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::id::{
    marker::{ApplicationMarker, MessageMarker},
    Id,
};
use crate::types::message::{CreateMessage, EditMessage, Message};

fn followup(
    method: Method,
    application_id: Id<ApplicationMarker>,
    token: &str,
    message_id: Id<MessageMarker>,
) -> Route {
    Route::new(
        method,
        "/webhooks/{webhook_id}/{webhook_token}/messages/{message_id}",
    )
    .param("webhook_id", application_id)
    .param("webhook_token", token)
    .param("message_id", message_id)
    .without_auth()
}

impl HttpClient {
    /// Send a followup message on an interaction token.
    pub async fn create_followup(
        &self,
        application_id: Id<ApplicationMarker>,
        token: &str,
        message: &CreateMessage,
    ) -> Result<Message, HttpError> {
        let route = Route::new(Method::POST, "/webhooks/{webhook_id}/{webhook_token}")
            .param("webhook_id", application_id)
            .param("webhook_token", token)
            .query("wait", true)
            .without_auth();
        let payload = message.payload_json().map_err(|source| HttpError::Decode {
            route: route.display(),
            source,
        })?;
        self.request_json(&route, &Body::with_files(payload, &message.files))
            .await
    }

    pub async fn followup(
        &self,
        application_id: Id<ApplicationMarker>,
        token: &str,
        message_id: Id<MessageMarker>,
    ) -> Result<Message, HttpError> {
        let route = followup(Method::GET, application_id, token, message_id);
        self.request_json(&route, &Body::Empty).await
    }

    pub async fn edit_followup(
        &self,
        application_id: Id<ApplicationMarker>,
        token: &str,
        message_id: Id<MessageMarker>,
        edit: &EditMessage,
    ) -> Result<Message, HttpError> {
        let route = followup(Method::PATCH, application_id, token, message_id);
        self.request_json(&route, &Body::json(edit)?).await
    }

    pub async fn delete_followup(
        &self,
        application_id: Id<ApplicationMarker>,
        token: &str,
        message_id: Id<MessageMarker>,
    ) -> Result<(), HttpError> {
        let route = followup(Method::DELETE, application_id, token, message_id);
        self.request_empty(&route, &Body::Empty).await
    }
}
