//! The event loop tying the gateway to the command tree and the view store.
//!
//! ```ignore
//! let mut client = Client::new(ClientConfig::from_env()?)?;
//! client.tree_mut().add_command(ping, None, false)?;
//! client.start().await?;
//! ```

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

use crate::commands::CommandTree;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::events::{GatewayEvent, ReadyEvent};
use crate::gateway::{self, GatewayConfig};
use crate::http::HttpClient;
use crate::responder::InteractionResponder;
use crate::types::interaction::{Interaction, InteractionType};
use crate::ui::{DispatchOutcome, ViewStore};

/// How often timed-out views and modals are swept.
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(5);

/// Called with every event after the client has routed it.
pub type EventHook = Arc<dyn Fn(Client, GatewayEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Owns the REST client, the command tree and the view store.
///
/// Clones share the HTTP client and the store. The tree is frozen once
/// [`start`](Self::start) runs.
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    tree: Arc<CommandTree>,
    store: ViewStore,
    sync_commands: bool,
    prune_interval: Duration,
    on_event: Option<EventHook>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("http", &self.http)
            .field("tree", &self.tree)
            .field("sync_commands", &self.sync_commands)
            .field("prune_interval", &self.prune_interval)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_http(HttpClient::new(config)?))
    }

    pub fn from_http(http: HttpClient) -> Self {
        Self {
            http,
            tree: Arc::new(CommandTree::new()),
            store: ViewStore::new(),
            sync_commands: false,
            prune_interval: DEFAULT_PRUNE_INTERVAL,
            on_event: None,
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Mutable access for registering commands before [`start`](Self::start).
    pub fn tree_mut(&mut self) -> &mut CommandTree {
        Arc::make_mut(&mut self.tree)
    }

    pub fn store(&self) -> &ViewStore {
        &self.store
    }

    /// Overwrite the registered commands with the tree on READY.
    pub fn sync_commands(mut self, sync: bool) -> Self {
        self.sync_commands = sync;
        self
    }

    pub fn prune_interval(mut self, interval: Duration) -> Self {
        self.prune_interval = interval;
        self
    }

    pub fn on_event<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Client, GatewayEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_event = Some(Arc::new(move |client, event| f(client, event).boxed()));
        self
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    /// Route one gateway event.
    pub async fn handle_event(&self, event: GatewayEvent) -> Result<()> {
        let result = match &event {
            GatewayEvent::Ready(ready) => self.on_ready(ready).await,
            GatewayEvent::InteractionCreate(interaction) => {
                self.handle_interaction(interaction.as_ref().clone()).await
            }
            GatewayEvent::MessageUpdate(update) => {
                if let Some(components) = &update.components {
                    self.store.update_from_message(update.id, components).await;
                }
                Ok(())
            }
            GatewayEvent::MessageDelete(deleted) => {
                if self.store.remove_message_tracking(deleted.id).await.is_some() {
                    debug!(message_id = %deleted.id, "stopped tracking view of deleted message");
                }
                Ok(())
            }
            GatewayEvent::MessageDeleteBulk(deleted) => {
                for id in &deleted.ids {
                    self.store.remove_message_tracking(*id).await;
                }
                Ok(())
            }
            GatewayEvent::EntitlementCreate(entitlement) => {
                info!(entitlement = %entitlement.id, sku = %entitlement.sku_id, "entitlement created");
                Ok(())
            }
            GatewayEvent::Unknown { event_name: Some(name), .. } => {
                trace!(event = %name, "unhandled gateway event");
                Ok(())
            }
            _ => Ok(()),
        };

        if let Some(hook) = &self.on_event {
            hook(self.clone(), event).await;
        }
        result
    }

    /// Route an interaction to the command tree or the view store.
    pub async fn handle_interaction(&self, interaction: Interaction) -> Result<()> {
        let responder = InteractionResponder::new(self.http.clone(), &interaction);
        let interaction = Arc::new(interaction);
        match interaction.kind {
            InteractionType::Ping => responder.pong().await,
            InteractionType::ApplicationCommand => self.tree.dispatch(interaction, responder).await,
            InteractionType::ApplicationCommandAutocomplete => {
                self.tree.autocomplete(interaction, responder).await
            }
            InteractionType::MessageComponent => {
                let outcome = self.store.dispatch_view(interaction.clone(), responder).await?;
                log_unhandled(&interaction, outcome);
                Ok(())
            }
            InteractionType::ModalSubmit => {
                let outcome = self.store.dispatch_modal(interaction.clone(), responder).await?;
                log_unhandled(&interaction, outcome);
                Ok(())
            }
            InteractionType::Unknown(kind) => {
                warn!(interaction_id = %interaction.id, kind, "unsupported interaction type");
                Ok(())
            }
        }
    }

    async fn on_ready(&self, ready: &ReadyEvent) -> Result<()> {
        let application_id = ready.application.id;
        self.http.set_application_id(application_id);
        info!(
            user = %ready.user.name,
            application_id = %application_id,
            "ready"
        );

        if !self.sync_commands {
            return Ok(());
        }
        self.tree.sync(&self.http, application_id, None).await?;
        for guild in self.tree.guild_ids() {
            self.tree.sync(&self.http, application_id, Some(guild)).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Connect to the gateway and process events until it shuts down.
    ///
    /// Interactions run on their own tasks. Other events are handled in
    /// order on the loop.
    pub async fn start(self) -> Result<()> {
        let mut config = GatewayConfig::from(self.http.config());
        match self.http.gateway_bot().await {
            Ok(info) => {
                debug!(
                    shards = info.shards,
                    remaining = info.session_start_limit.remaining,
                    "fetched gateway info"
                );
                config = config.with_url(info.url);
            }
            Err(e) => warn!(error = %e, "GET /gateway/bot failed, using the default gateway URL"),
        }
        if config.intents.is_privileged() {
            info!(intents = config.intents.bits(), "requesting privileged intents");
        }

        let gateway = gateway::connect(config);
        info!("gateway connecting, entering event loop");

        let mut prune = tokio::time::interval(self.prune_interval);
        loop {
            tokio::select! {
                event = gateway.next_event() => {
                    let Some(event) = event else { break };
                    self.dispatch(event).await;
                }
                _ = prune.tick() => {
                    let pruned = self.store.prune_expired(Instant::now()).await;
                    if pruned > 0 {
                        debug!(pruned, "pruned expired views and modals");
                    }
                }
            }
        }

        gateway.join().await.map_err(Error::from)
    }

    async fn dispatch(&self, event: GatewayEvent) {
        if let GatewayEvent::InteractionCreate(_) = &event {
            let client = self.clone();
            tokio::spawn(async move {
                if let Err(e) = client.handle_event(event).await {
                    error!(error = %e, "failed to handle interaction");
                }
            });
            return;
        }
        let name = event.name().to_string();
        if let Err(e) = self.handle_event(event).await {
            error!(event = %name, error = %e, "failed to handle event");
        }
    }
}

fn log_unhandled(interaction: &Interaction, outcome: DispatchOutcome) {
    if outcome == DispatchOutcome::Unhandled {
        debug!(interaction_id = %interaction.id, "no view or modal for interaction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, ContextMenu};
    use crate::events::{MessageDelete, ReadyApplication};
    use crate::types::guild::UnavailableGuild;
    use crate::types::id::Id;
    use crate::types::interaction::tests::{interaction_json, user_json};
    use crate::types::message::CreateMessage;
    use crate::ui::{Button, View};
    use serde_json::json;
    use static_assertions::assert_impl_all;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    assert_impl_all!(Client: Clone, Send, Sync);

    fn client(server: &MockServer) -> Client {
        let http = HttpClient::new(ClientConfig::new("t").with_api_base(server.uri())).unwrap();
        Client::from_http(http)
    }

    async fn mock_callback(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/interactions/\d+/[^/]+/callback$"))
            .respond_with(ResponseTemplate::new(204))
            .mount(server)
            .await;
    }

    fn interaction(kind: u8, data: serde_json::Value) -> Interaction {
        serde_json::from_value(interaction_json(kind, data)).unwrap()
    }

    #[tokio::test]
    async fn ping_gets_pong() {
        let server = MockServer::start().await;
        mock_callback(&server).await;
        let client = client(&server);

        let mut raw = interaction_json(1, json!(null));
        raw.as_object_mut().unwrap().remove("data");
        let ping: Interaction = serde_json::from_value(raw).unwrap();
        client.handle_interaction(ping).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["type"], 1);
    }

    #[tokio::test]
    async fn unknown_interaction_types_are_skipped() {
        let server = MockServer::start().await;
        mock_callback(&server).await;
        let client = client(&server);

        client
            .handle_interaction(interaction(6, json!({"id": "1"})))
            .await
            .unwrap();
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commands_route_to_the_tree() {
        let server = MockServer::start().await;
        mock_callback(&server).await;
        let mut client = client(&server);
        client
            .tree_mut()
            .add_command(
                Command::new("ping", "Pong!", |ctx| async move {
                    ctx.responder.send_message(CreateMessage::new().content("pong")).await
                }),
                None,
                false,
            )
            .unwrap();

        let event = GatewayEvent::InteractionCreate(Box::new(interaction(
            2,
            json!({"id": "1", "name": "ping", "type": 1}),
        )));
        client.handle_event(event).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["type"], 4);
        assert_eq!(body["data"]["content"], "pong");
    }

    #[tokio::test]
    async fn deleted_messages_drop_view_tracking() {
        let server = MockServer::start().await;
        let client = client(&server);
        let mut view = View::new();
        view.add_item(Button::new("Hi").custom_id("hi")).unwrap();
        client.store().add_view(view, Some(Id::new(5))).await.unwrap();
        assert!(client.store().is_message_tracked(Id::new(5)).await);

        client
            .handle_event(GatewayEvent::MessageDelete(MessageDelete {
                id: Id::new(5),
                channel_id: Id::new(6),
                guild_id: None,
            }))
            .await
            .unwrap();
        assert!(!client.store().is_message_tracked(Id::new(5)).await);
    }

    #[tokio::test]
    async fn ready_records_application_and_syncs() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/applications/77/commands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/applications/77/guilds/9/commands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client(&server).sync_commands(true);
        client
            .tree_mut()
            .add_command(
                ContextMenu::user("User Info", |_ctx, _target| async { Ok(()) }),
                Some(Id::new(9)),
                false,
            )
            .unwrap();

        let ready = ReadyEvent {
            version: 10,
            user: serde_json::from_value(user_json("77")).unwrap(),
            guilds: vec![UnavailableGuild { id: Id::new(9), unavailable: true }],
            session_id: "s".into(),
            resume_gateway_url: "wss://example.invalid".into(),
            shard: None,
            application: ReadyApplication { id: Id::new(77), flags: None },
        };
        client
            .handle_event(GatewayEvent::Ready(Box::new(ready)))
            .await
            .unwrap();
        assert_eq!(client.http().application_id(), Some(Id::new(77)));
    }

    #[tokio::test]
    async fn event_hook_sees_every_event() {
        let server = MockServer::start().await;
        let (tx, rx) = async_channel::unbounded();
        let client = client(&server).on_event(move |_client, event| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(event.name().to_string()).await;
            }
        });
        client.handle_event(GatewayEvent::Resumed).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "RESUMED");
    }
}
