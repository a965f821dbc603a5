//! Markers for the resource types an [`Id`] can point at.
//!
//! Markers perform no logic of their own. They only exist so that a SKU id
//! can't be passed where an entitlement id is expected: `Id<SkuMarker>` and
//! `Id<EntitlementMarker>` are distinct types even though both are 64-bit
//! snowflakes on the wire.
//!
//! [`Id`]: super::Id

/// Marker for application ids.
///
/// Used by [`AppInfo`], [`Sku`], [`Entitlement`] and [`Interaction`].
///
/// [`AppInfo`]: crate::types::application::AppInfo
/// [`Sku`]: crate::types::sku::Sku
/// [`Entitlement`]: crate::types::entitlement::Entitlement
/// [`Interaction`]: crate::types::interaction::Interaction
#[derive(Debug)]
#[non_exhaustive]
pub struct ApplicationMarker;

/// Marker for attachment ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct AttachmentMarker;

/// Marker for channel ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct ChannelMarker;

/// Marker for application command ids.
///
/// [`ApplicationCommand`] uses this marker.
///
/// [`ApplicationCommand`]: crate::types::command::ApplicationCommand
#[derive(Debug)]
#[non_exhaustive]
pub struct CommandMarker;

/// Marker for command versions.
#[derive(Debug)]
#[non_exhaustive]
pub struct CommandVersionMarker;

/// Marker for custom emoji ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct EmojiMarker;

/// Marker for entitlement ids.
///
/// [`Entitlement`]: crate::types::entitlement::Entitlement
#[derive(Debug)]
#[non_exhaustive]
pub struct EntitlementMarker;

/// Marker for gift batch ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct GiftBatchMarker;

/// Marker for generic ids, such as a mentionable option that may be a user
/// or a role, or a context menu target.
#[derive(Debug)]
#[non_exhaustive]
pub struct GenericMarker;

/// Marker for guild ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct GuildMarker;

/// Marker for interaction ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct InteractionMarker;

/// Marker for message ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct MessageMarker;

/// Marker for payment ids.
///
/// [`Payment`]: crate::types::payment::Payment
#[derive(Debug)]
#[non_exhaustive]
pub struct PaymentMarker;

/// Marker for role ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct RoleMarker;

/// Marker for SKU ids.
///
/// [`Sku`]: crate::types::sku::Sku
#[derive(Debug)]
#[non_exhaustive]
pub struct SkuMarker;

/// Marker for subscription ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct SubscriptionMarker;

/// Marker for subscription plan ids, referenced by gifts.
#[derive(Debug)]
#[non_exhaustive]
pub struct SubscriptionPlanMarker;

/// Marker for developer team ids.
///
/// [`Team`]: crate::types::team::Team
#[derive(Debug)]
#[non_exhaustive]
pub struct TeamMarker;

/// Marker for user ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct UserMarker;

/// Marker for webhook ids.
#[derive(Debug)]
#[non_exhaustive]
pub struct WebhookMarker;
