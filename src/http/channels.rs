use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::channel::Channel;
use crate::types::id::{
    marker::{ChannelMarker, MessageMarker},
    Id,
};
use crate::types::message::{CreateMessage, EditMessage, Message};

impl HttpClient {
    pub async fn channel(&self, channel_id: Id<ChannelMarker>) -> Result<Channel, HttpError> {
        let route = Route::new(Method::GET, "/channels/{channel_id}").param("channel_id", channel_id);
        self.request_json(&route, &Body::Empty).await
    }

    /// Post a message (embeds, components, files, replies) to a channel.
    pub async fn create_message(
        &self,
        channel_id: Id<ChannelMarker>,
        message: &CreateMessage,
    ) -> Result<Message, HttpError> {
        let route = Route::new(Method::POST, "/channels/{channel_id}/messages")
            .param("channel_id", channel_id);
        let payload = message.payload_json().map_err(|source| HttpError::Decode {
            route: route.display(),
            source,
        })?;
        self.request_json(&route, &Body::with_files(payload, &message.files))
            .await
    }

    /// Send a plain text message.
    pub async fn send_message(
        &self,
        channel_id: Id<ChannelMarker>,
        content: &str,
    ) -> Result<Message, HttpError> {
        self.create_message(channel_id, &CreateMessage::new().content(content))
            .await
    }

    pub async fn message(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<Message, HttpError> {
        let route = Route::new(Method::GET, "/channels/{channel_id}/messages/{message_id}")
            .param("channel_id", channel_id)
            .param("message_id", message_id);
        self.request_json(&route, &Body::Empty).await
    }

    pub async fn edit_message(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
        edit: &EditMessage,
    ) -> Result<Message, HttpError> {
        let route = Route::new(Method::PATCH, "/channels/{channel_id}/messages/{message_id}")
            .param("channel_id", channel_id)
            .param("message_id", message_id);
        self.request_json(&route, &Body::json(edit)?).await
    }

    pub async fn delete_message(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<(), HttpError> {
        let route = Route::new(Method::DELETE, "/channels/{channel_id}/messages/{message_id}")
            .param("channel_id", channel_id)
            .param("message_id", message_id);
        self.request_empty(&route, &Body::Empty).await
    }
}
