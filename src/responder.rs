//! Responding to a single interaction.
//!
//! Discord accepts exactly one initial response per interaction, within
//! three seconds. Everything after that (edits, followups) goes through the
//! interaction webhook, valid for fifteen minutes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::command::CommandOptionChoice;
use crate::types::id::{
    marker::{ApplicationMarker, InteractionMarker, MessageMarker},
    Id,
};
use crate::types::interaction::{Interaction, InteractionType};
use crate::types::message::{CreateMessage, EditMessage, Message};
use crate::types::response::{InteractionCallbackData, InteractionResponse};
use crate::ui::Modal;

/// Per-interaction response handle. Clones share the "responded" flag.
#[derive(Clone, Debug)]
pub struct InteractionResponder {
    http: HttpClient,
    interaction_id: Id<InteractionMarker>,
    application_id: Id<ApplicationMarker>,
    token: Arc<str>,
    kind: InteractionType,
    /// Component interactions, and modals opened from a component.
    has_message: bool,
    responded: Arc<AtomicBool>,
}

fn kind_name(kind: InteractionType) -> &'static str {
    match kind {
        InteractionType::Ping => "ping",
        InteractionType::ApplicationCommand => "application command",
        InteractionType::MessageComponent => "component",
        InteractionType::ApplicationCommandAutocomplete => "autocomplete",
        InteractionType::ModalSubmit => "modal submit",
        InteractionType::Unknown(_) => "unknown interaction",
    }
}

impl InteractionResponder {
    pub fn new(http: HttpClient, interaction: &Interaction) -> Self {
        Self {
            http,
            interaction_id: interaction.id,
            application_id: interaction.application_id,
            token: Arc::from(interaction.token.as_str()),
            kind: interaction.kind,
            has_message: interaction.message.is_some(),
            responded: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn kind(&self) -> InteractionType {
        self.kind
    }

    /// Whether the initial response has been sent.
    pub fn is_done(&self) -> bool {
        self.responded.load(Ordering::Acquire)
    }

    fn invalid(&self, reason: &'static str) -> Error {
        Error::InvalidResponse {
            interaction: kind_name(self.kind),
            reason,
        }
    }

    /// Send the initial response. Fails without a request if one was
    /// already sent; a failed request leaves the slot open.
    pub async fn respond(&self, response: InteractionResponse) -> Result<()> {
        if self
            .responded
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::InteractionResponded);
        }
        debug!(
            interaction_id = %self.interaction_id,
            kind = ?response.kind,
            "sending interaction response"
        );
        let result = self
            .http
            .create_interaction_response(self.interaction_id, &self.token, &response)
            .await;
        if result.is_err() {
            self.responded.store(false, Ordering::Release);
        }
        Ok(result?)
    }

    pub async fn pong(&self) -> Result<()> {
        if self.kind != InteractionType::Ping {
            return Err(self.invalid("only pings can be answered with a pong"));
        }
        self.respond(InteractionResponse::pong()).await
    }

    pub async fn send_message(&self, message: impl Into<InteractionCallbackData>) -> Result<()> {
        if matches!(
            self.kind,
            InteractionType::Ping | InteractionType::ApplicationCommandAutocomplete
        ) {
            return Err(self.invalid("cannot send a message"));
        }
        self.respond(InteractionResponse::message(message)).await
    }

    /// Plain text visible only to the invoking user.
    pub async fn send_ephemeral(&self, content: impl Into<String>) -> Result<()> {
        self.send_message(CreateMessage::new().content(content).ephemeral(true))
            .await
    }

    /// Acknowledge now, respond later.
    ///
    /// Components and modal submits default to a silent deferred update;
    /// `thinking` shows a "thinking..." message instead, as commands do.
    pub async fn defer(&self, ephemeral: bool, thinking: bool) -> Result<()> {
        let update = match self.kind {
            InteractionType::ApplicationCommand => false,
            InteractionType::MessageComponent | InteractionType::ModalSubmit => !thinking,
            InteractionType::Ping
            | InteractionType::ApplicationCommandAutocomplete
            | InteractionType::Unknown(_) => {
                return Err(self.invalid("cannot be deferred"));
            }
        };
        self.respond(InteractionResponse::deferred(ephemeral, update))
            .await
    }

    /// Edit the message the component is attached to.
    pub async fn edit_message(&self, message: impl Into<InteractionCallbackData>) -> Result<()> {
        let allowed = match self.kind {
            InteractionType::MessageComponent => true,
            InteractionType::ModalSubmit => self.has_message,
            _ => false,
        };
        if !allowed {
            return Err(self.invalid("has no message to edit"));
        }
        self.respond(InteractionResponse::update(message)).await
    }

    /// Open a modal. The caller tracks it for submission dispatch.
    pub async fn send_modal(&self, modal: &Modal) -> Result<()> {
        if matches!(
            self.kind,
            InteractionType::Ping
                | InteractionType::ApplicationCommandAutocomplete
                | InteractionType::ModalSubmit
        ) {
            return Err(self.invalid("cannot open a modal"));
        }
        self.respond(modal.to_response()?).await
    }

    /// Answer an autocomplete request. Extra choices past 25 are dropped.
    pub async fn autocomplete(&self, choices: Vec<CommandOptionChoice>) -> Result<()> {
        if self.kind != InteractionType::ApplicationCommandAutocomplete {
            return Err(self.invalid("only autocomplete interactions take choices"));
        }
        self.respond(InteractionResponse::autocomplete(choices))
            .await
    }

    /// Launch the application's activity.
    pub async fn launch_activity(&self) -> Result<()> {
        if !matches!(
            self.kind,
            InteractionType::ApplicationCommand | InteractionType::MessageComponent
        ) {
            return Err(self.invalid("cannot launch an activity"));
        }
        self.respond(InteractionResponse::launch_activity()).await
    }

    // ------------------------------------------------------------------
    // After the initial response
    // ------------------------------------------------------------------

    pub async fn original_response(&self) -> Result<Message> {
        Ok(self
            .http
            .original_response(self.application_id, &self.token)
            .await?)
    }

    pub async fn edit_original_response(&self, edit: &EditMessage) -> Result<Message> {
        Ok(self
            .http
            .edit_original_response(self.application_id, &self.token, edit)
            .await?)
    }

    pub async fn delete_original_response(&self) -> Result<()> {
        Ok(self
            .http
            .delete_original_response(self.application_id, &self.token)
            .await?)
    }

    pub async fn followup(&self, message: &CreateMessage) -> Result<Message> {
        Ok(self
            .http
            .create_followup(self.application_id, &self.token, message)
            .await?)
    }

    pub async fn edit_followup(
        &self,
        message_id: Id<MessageMarker>,
        edit: &EditMessage,
    ) -> Result<Message> {
        Ok(self
            .http
            .edit_followup(self.application_id, &self.token, message_id, edit)
            .await?)
    }

    pub async fn delete_followup(&self, message_id: Id<MessageMarker>) -> Result<()> {
        Ok(self
            .http
            .delete_followup(self.application_id, &self.token, message_id)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::interaction::tests::interaction_json;
    use serde_json::Value;

    fn responder(kind: u8) -> InteractionResponder {
        let interaction: Interaction =
            serde_json::from_value(interaction_json(kind, Value::Null)).unwrap();
        let http = HttpClient::from_token("t").unwrap();
        InteractionResponder::new(http, &interaction)
    }

    #[tokio::test]
    async fn rejects_wrong_response_kinds_without_sending() {
        let command = responder(2);
        assert!(matches!(
            command.autocomplete(vec![]).await,
            Err(Error::InvalidResponse { .. })
        ));
        assert!(matches!(
            command.edit_message(CreateMessage::new()).await,
            Err(Error::InvalidResponse { .. })
        ));
        assert!(command.pong().await.is_err());
        assert!(!command.is_done());

        let autocomplete = responder(4);
        assert!(autocomplete.defer(false, false).await.is_err());
        assert!(autocomplete.send_message(CreateMessage::new()).await.is_err());
    }

    #[tokio::test]
    async fn second_response_is_rejected() {
        let responder = responder(2);
        responder.responded.store(true, Ordering::Release);
        assert!(matches!(
            responder.send_ephemeral("again").await,
            Err(Error::InteractionResponded)
        ));
    }

    #[test]
    fn clones_share_state() {
        let a = responder(3);
        let b = a.clone();
        a.responded.store(true, Ordering::Release);
        assert!(b.is_done());
    }
}
