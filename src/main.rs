//! Demo bot.
//!
//! Registers a handful of slash commands, a user context menu and a
//! persistent counter button, then runs the gateway event loop.
//!
//! Set `DISCORD_DEV_GUILD` to register everything in one guild, where
//! changes show up immediately instead of after global propagation.

use async_trait::async_trait;
use chrono::Utc;
use std::any::Any;
use std::time::Duration;
use tracing::{error, info};

use cordial::commands::{Command, CommandContext, ContextMenu, ContextMenuTarget};
use cordial::error::{Error, Result};
use cordial::events::GatewayEvent;
use cordial::types::{
    ButtonStyle, Component, ComponentType, CreateMessage, EmbedBuilder, EntitlementQuery,
    GuildMarker, Id, Interaction, TextInputStyle,
};
use cordial::ui::{Button, DynamicItem, Item, ItemContext, Modal, TemplateMatch, TextInput, View};
use cordial::{Client, ClientConfig};

// ---------------------------------------------------------------------------
// Counter: a button whose custom id carries its own state
// ---------------------------------------------------------------------------

struct Counter {
    count: u64,
    button: Button,
}

impl Counter {
    fn new(count: u64) -> Self {
        Self {
            count,
            button: Button::new(format!("Clicked {count} times"))
                .style(ButtonStyle::Primary)
                .custom_id(format!("counter:{count}")),
        }
    }
}

#[async_trait]
impl Item for Counter {
    fn component_type(&self) -> ComponentType {
        self.button.component_type()
    }

    fn custom_id(&self) -> Option<&str> {
        Item::custom_id(&self.button)
    }

    fn to_component(&self) -> Component {
        self.button.to_component()
    }

    async fn callback(&mut self, ctx: ItemContext) -> Result<()> {
        *self = Counter::new(self.count + 1);
        ctx.refresh_view();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl DynamicItem for Counter {
    fn template() -> &'static str {
        r"counter:(?P<count>\d+)"
    }

    fn from_custom_id(_interaction: &Interaction, captures: &TemplateMatch) -> Result<Self> {
        captures
            .get("count")
            .and_then(|count| count.parse().ok())
            .map(Counter::new)
            .ok_or_else(|| Error::custom("counter id without a count"))
    }
}

// ---------------------------------------------------------------------------
// Slash commands
// ---------------------------------------------------------------------------

async fn ping(ctx: CommandContext) -> Result<()> {
    let latency = Utc::now() - ctx.interaction.created_at();
    ctx.responder
        .send_message(CreateMessage::new().content(format!(
            "Pong! ({} ms)",
            latency.num_milliseconds().max(0)
        )))
        .await
}

async fn appinfo(ctx: CommandContext) -> Result<()> {
    let app = ctx.http().application_info().await?;
    let mut embed = EmbedBuilder::new()
        .title(app.name.clone())
        .field("Public bot", app.bot_public.to_string(), true)
        .field(
            "Owners",
            app.owners()
                .iter()
                .map(|user| user.tag())
                .collect::<Vec<_>>()
                .join(", "),
            true,
        )
        .timestamp(app.created_at());
    if !app.description.is_empty() {
        embed = embed.description(app.description.clone());
    }
    if let Some(count) = app.approximate_guild_count {
        embed = embed.field("Guilds", count.to_string(), true);
    }
    if let Some(icon) = app.icon() {
        embed = embed.thumbnail(icon.url());
    }
    if let Some(url) = app.install_url() {
        embed = embed.url(url);
    }
    ctx.responder
        .send_message(CreateMessage::new().embed(embed.build()))
        .await
}

async fn store(ctx: CommandContext) -> Result<()> {
    let application_id = ctx.interaction.application_id;
    let skus: Vec<_> = ctx
        .http()
        .skus(application_id)
        .await?
        .into_iter()
        .filter(|sku| sku.is_available())
        .collect();
    if skus.is_empty() {
        return ctx.responder.send_ephemeral("Nothing for sale yet.").await;
    }

    let mut view = View::new();
    let mut lines = Vec::new();
    for sku in skus.iter().take(25) {
        lines.push(format!("**{}**: <{}>", sku.name, sku.url()));
        view.add_item(Button::premium(sku.id))?;
    }
    ctx.responder
        .send_message(
            CreateMessage::new()
                .content(lines.join("\n"))
                .components(view.to_components()?),
        )
        .await
}

async fn entitlements(ctx: CommandContext) -> Result<()> {
    let Some(user) = ctx.interaction.author_id() else {
        return ctx.responder.send_ephemeral("Who are you?").await;
    };
    let query = EntitlementQuery::new()
        .user(user)
        .exclude_ended(true)
        .limit(100);
    let owned = ctx
        .http()
        .entitlements(ctx.interaction.application_id, &query)
        .await?;

    let text = if owned.is_empty() {
        "You don't own anything yet.".to_string()
    } else {
        owned
            .iter()
            .map(|e| {
                let ends = e
                    .ends_at
                    .map(|t| format!(", ends <t:{}:R>", t.timestamp()))
                    .unwrap_or_default();
                format!("- SKU `{}`{ends}", e.sku_id)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    ctx.responder.send_ephemeral(text).await
}

async fn counter(ctx: CommandContext) -> Result<()> {
    let view = View::new().with_timeout(None).item(Counter::new(0))?;
    ctx.responder
        .send_message(
            CreateMessage::new()
                .content("This counter survives restarts.")
                .components(view.to_components()?),
        )
        .await
}

fn feedback_modal() -> Result<Modal> {
    let modal = Modal::new("Feedback")
        .with_timeout(Some(Duration::from_secs(600)))
        .item(
            TextInput::new("What should we improve?")
                .custom_id("feedback:body")
                .style(TextInputStyle::Paragraph)
                .min_length(10)
                .max_length(1000),
        )?
        .on_submit(|ctx, values| async move {
            let body = values.text("feedback:body").unwrap_or_default();
            info!(len = body.len(), "feedback received");
            ctx.responder
                .send_ephemeral("Thanks for the feedback!")
                .await
        });
    Ok(modal)
}

// ---------------------------------------------------------------------------
// Context menu
// ---------------------------------------------------------------------------

async fn user_info(ctx: CommandContext, target: ContextMenuTarget) -> Result<()> {
    let ContextMenuTarget::User(user, member) = target else {
        return Err(Error::custom("user menu got a non-user target"));
    };
    let mut embed = EmbedBuilder::new()
        .title(user.tag())
        .field("ID", user.id.to_string(), true)
        .field(
            "Created",
            format!("<t:{}:R>", user.created_at().timestamp()),
            true,
        );
    if let Some(nick) = member.as_ref().and_then(|m| m.nick.as_deref()) {
        embed = embed.field("Nickname", nick, true);
    }
    if let Some(avatar) = user.avatar() {
        embed = embed.thumbnail(avatar.url());
    }
    ctx.responder
        .send_message(CreateMessage::new().embed(embed.build()).ephemeral(true))
        .await
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn dev_guild() -> Result<Option<Id<GuildMarker>>> {
    match std::env::var("DISCORD_DEV_GUILD") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("DISCORD_DEV_GUILD is not a snowflake: {e}"))),
        Err(_) => Ok(None),
    }
}

async fn run() -> Result<()> {
    let config = ClientConfig::from_env()?;
    let guild = dev_guild()?;

    let mut client = Client::new(config)?.sync_commands(true).on_event(|_client, event| async move {
        if let GatewayEvent::GuildCreate(guild) = event {
            info!(guild = %guild.name, "joined guild");
        }
    });
    client.store().add_dynamic_items::<Counter>().await?;

    let modal_store = client.store().clone();
    let tree = client.tree_mut();
    tree.add_command(Command::new("ping", "Check bot latency", ping), guild, false)?;
    tree.add_command(Command::new("appinfo", "Show application info", appinfo), guild, false)?;
    tree.add_command(Command::new("store", "Browse the shop", store), guild, false)?;
    tree.add_command(
        Command::new("entitlements", "List what you own", entitlements),
        guild,
        false,
    )?;
    tree.add_command(Command::new("counter", "Post a counter button", counter), guild, false)?;

    tree.add_command(
        Command::new("feedback", "Send feedback through a form", move |ctx| {
            let store = modal_store.clone();
            async move {
                let modal = feedback_modal()?;
                ctx.responder.send_modal(&modal).await?;
                if let Some(user) = ctx.interaction.author_id() {
                    store.add_modal(user, modal).await;
                }
                Ok(())
            }
        }),
        guild,
        false,
    )?;
    tree.add_command(ContextMenu::user("User Info", user_info), guild, false)?;
    tree.on_error(|ctx, err| async move {
        error!(command = %ctx.qualified_name, error = %err, "command failed");
        if !ctx.responder.is_done() {
            let _ = ctx.responder.send_ephemeral(format!("Something went wrong: {err}")).await;
        }
    });

    client.start().await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "bot stopped");
        std::process::exit(1);
    }
}
