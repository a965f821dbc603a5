//! Prebuilt command checks.
//!
//! ```ignore
//! Command::new("ban", "Ban a member", ban)
//!     .with_check(checks::guild_only())
//!     .with_check(checks::has_permissions(Permissions::BAN_MEMBERS));
//! ```

use futures::FutureExt;
use std::sync::Arc;

use super::{Check, CommandContext, CommandError};
use crate::error::Error;
use crate::types::id::{marker::SkuMarker, Id};
use crate::types::permissions::Permissions;

/// Reject invocations outside a guild.
pub fn guild_only() -> Check {
    Arc::new(|ctx: CommandContext| {
        async move {
            if ctx.interaction.guild_id.is_none() {
                return Err(Error::from(CommandError::NoPrivateMessage));
            }
            Ok(())
        }
        .boxed()
    })
}

/// Require the invoking member to hold every flag in `required`.
///
/// Administrators pass. Outside a guild there are no member permissions
/// and the check fails.
pub fn has_permissions(required: Permissions) -> Check {
    Arc::new(move |ctx: CommandContext| {
        async move {
            let held = ctx.interaction.member_permissions().unwrap_or_else(Permissions::empty);
            missing(held, required)
        }
        .boxed()
    })
}

/// Require the bot itself to hold `required` in the invoking channel.
pub fn bot_has_permissions(required: Permissions) -> Check {
    Arc::new(move |ctx: CommandContext| {
        async move {
            let held = ctx.interaction.app_permissions.unwrap_or_else(Permissions::empty);
            missing(held, required)
        }
        .boxed()
    })
}

fn missing(held: Permissions, required: Permissions) -> crate::error::Result<()> {
    let lacking = held.missing(required);
    if lacking.is_empty() {
        Ok(())
    } else {
        Err(CommandError::MissingPermissions(lacking).into())
    }
}

/// Require an active entitlement to `sku` on the user or guild.
pub fn has_entitlement(sku: Id<SkuMarker>) -> Check {
    Arc::new(move |ctx: CommandContext| {
        async move {
            if ctx.interaction.has_entitlement(sku) {
                Ok(())
            } else {
                Err(Error::from(CommandError::MissingEntitlement(sku)))
            }
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClient;
    use crate::responder::InteractionResponder;
    use crate::types::interaction::tests::interaction_json;
    use crate::types::interaction::Interaction;
    use serde_json::{json, Value};

    fn context(mutate: impl FnOnce(&mut Value)) -> CommandContext {
        let mut raw = interaction_json(2, json!({"id": "1", "name": "x", "type": 1}));
        mutate(&mut raw);
        let interaction: Interaction = serde_json::from_value(raw).unwrap();
        let http = HttpClient::from_token("test-token").unwrap();
        CommandContext {
            responder: InteractionResponder::new(http, &interaction),
            interaction: Arc::new(interaction),
            args: Default::default(),
            qualified_name: "x".into(),
        }
    }

    fn command_error(result: crate::error::Result<()>) -> Option<CommandError> {
        match result {
            Err(Error::Command(err)) => Some(err),
            _ => None,
        }
    }

    #[tokio::test]
    async fn guild_only_rejects_dms() {
        assert!(guild_only()(context(|_| {})).await.is_ok());
        let dm = context(|raw| {
            raw["guild_id"] = Value::Null;
        });
        assert_eq!(
            command_error(guild_only()(dm).await),
            Some(CommandError::NoPrivateMessage)
        );
    }

    #[tokio::test]
    async fn permissions_report_what_is_missing() {
        let moderator = context(|raw| raw["member"]["permissions"] = json!("8192"));
        assert!(has_permissions(Permissions::MANAGE_MESSAGES)(moderator.clone()).await.is_ok());
        assert_eq!(
            command_error(
                has_permissions(Permissions::MANAGE_MESSAGES | Permissions::BAN_MEMBERS)(moderator).await
            ),
            Some(CommandError::MissingPermissions(Permissions::BAN_MEMBERS))
        );

        let admin = context(|raw| raw["member"]["permissions"] = json!("8"));
        assert!(has_permissions(Permissions::BAN_MEMBERS)(admin).await.is_ok());

        let bot = context(|raw| raw["app_permissions"] = json!("0"));
        assert_eq!(
            command_error(bot_has_permissions(Permissions::SEND_MESSAGES)(bot).await),
            Some(CommandError::MissingPermissions(Permissions::SEND_MESSAGES))
        );
    }

    #[tokio::test]
    async fn entitlement_required() {
        let sku = Id::new(1088510058284990888);
        assert_eq!(
            command_error(has_entitlement(sku)(context(|_| {})).await),
            Some(CommandError::MissingEntitlement(sku))
        );
    }
}
