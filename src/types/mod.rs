//! Discord API v10 resource types.
//!
//! Every type maps one-to-one onto Discord's JSON: field names follow the
//! wire format (renamed where Rust reserves the word, e.g. `type` becomes
//! `kind`), unknown enum values are tolerated where Discord adds values
//! without a version bump, and bitfields keep bits this crate doesn't name.
//!
//! Derived values that need no network access (CDN URLs, creation
//! timestamps, store links) are plain methods. Operations that call the API
//! take an [`HttpClient`](crate::http::HttpClient) argument.

// ===========================================================================
// Foundations
// ===========================================================================

/// Type-safe IDs with marker types.
pub mod id;

/// Serde helpers shared across modules.
pub(crate) mod util;

/// CDN assets.
pub mod asset;

/// Permission bitfield.
pub mod permissions;

// ===========================================================================
// Resources
// ===========================================================================

pub mod application;
pub mod channel;
pub mod emoji;
pub mod entitlement;
pub mod gift;
pub mod guild;
pub mod message;
pub mod payment;
pub mod sku;
pub mod subscription;
pub mod team;
pub mod user;

// ===========================================================================
// Components, interactions, and commands
// ===========================================================================

pub mod command;
pub mod component;
pub mod interaction;
pub mod response;

// ===========================================================================
// Convenience re-exports
// ===========================================================================

// ---- IDs ------------------------------------------------------------------
pub use self::id::marker::{
    ApplicationMarker, AttachmentMarker, ChannelMarker, CommandMarker, EntitlementMarker,
    GenericMarker, GuildMarker, InteractionMarker, MessageMarker, PaymentMarker, RoleMarker,
    SkuMarker, SubscriptionMarker, TeamMarker, UserMarker,
};
pub use self::id::Id;

// ---- Application / team / user ---------------------------------------------
pub use self::application::{
    oauth_url, AppInfo, AppInstallParams, ApplicationFlags, EditApplication, IntegrationType,
    IntegrationTypeConfig, PartialAppInfo,
};
pub use self::asset::Asset;
pub use self::permissions::Permissions;
pub use self::team::{Team, TeamMember, TeamMemberRole, TeamMembershipState};
pub use self::user::{User, UserFlags};

// ---- Monetization -----------------------------------------------------------
pub use self::entitlement::{
    Entitlement, EntitlementQuery, EntitlementType, TestEntitlementOwner,
};
pub use self::gift::{Gift, GiftFlags, GiftStyle};
pub use self::payment::{
    fetch_payment, fetch_payments, Payment, PaymentFlags, PaymentGateway, PaymentStatus,
};
pub use self::sku::{Sku, SkuFlags, SkuType};
pub use self::subscription::{Subscription, SubscriptionQuery, SubscriptionStatus};

// ---- Guild / channel / message ----------------------------------------------
pub use self::channel::{Channel, ChannelType};
pub use self::emoji::PartialEmoji;
pub use self::guild::{Guild, Member, PartialGuild, Role, UnavailableGuild};
pub use self::message::{
    AllowedMentions, Attachment, AttachmentFile, CreateMessage, EditMessage, Embed, EmbedBuilder,
    Message, MessageFlags, MessageReference,
};

// ---- Components ---------------------------------------------------------------
pub use self::component::{
    action_row, link_button, premium_button, Button, ButtonStyle, Component, ComponentType,
    SelectMenu, SelectMenuType, SelectOption, TextInput, TextInputStyle,
};

// ---- Interactions -------------------------------------------------------------
pub use self::interaction::{
    CommandData, CommandDataOption, CommandOptionValue, ComponentData, Interaction,
    InteractionData, InteractionType, ModalSubmitData, ResolvedData, SubmittedComponent,
};
pub use self::response::{InteractionCallbackData, InteractionCallbackType, InteractionResponse};

// ---- Application commands -----------------------------------------------------
pub use self::command::{
    ApplicationCommand, ApplicationCommandBuilder, CommandOption, CommandOptionChoice,
    CommandOptionChoiceValue, CommandOptionType, CommandType, InteractionContextType,
};
