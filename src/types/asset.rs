//! CDN assets derived from image hashes.
//!
//! Discord never sends image URLs for avatars, icons or covers; it sends a
//! hash and expects the client to build the CDN path. An [`Asset`] captures
//! that path plus whether the hash denotes an animated image (`a_` prefix).

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::config::DEFAULT_CDN_BASE;
use crate::error::{Error, Result};
use crate::types::id::{
    marker::{ApplicationMarker, EmojiMarker, GuildMarker, TeamMarker, UserMarker},
    Id,
};

const VALID_STATIC_FORMATS: &[&str] = &["jpeg", "jpg", "webp", "png"];
const VALID_ASSET_FORMATS: &[&str] = &["jpeg", "jpg", "webp", "png", "gif"];
const DEFAULT_SIZE: u16 = 1024;

/// A resolved CDN asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Asset {
    base: String,
    /// Path without extension, e.g. `avatars/{user_id}/{hash}`.
    path: String,
    key: String,
    animated: bool,
    format: Option<String>,
    size: Option<u16>,
}

impl Asset {
    fn new(path: String, key: impl Into<String>, animated: bool) -> Self {
        Self {
            base: DEFAULT_CDN_BASE.to_string(),
            path,
            key: key.into(),
            animated,
            format: None,
            size: Some(DEFAULT_SIZE),
        }
    }

    fn from_hash(path_prefix: String, hash: &str) -> Self {
        let animated = hash.starts_with("a_");
        Self::new(format!("{path_prefix}/{hash}"), hash, animated)
    }

    /// A user's uploaded avatar.
    pub fn user_avatar(user_id: Id<UserMarker>, hash: &str) -> Self {
        Self::from_hash(format!("avatars/{user_id}"), hash)
    }

    /// A user's profile banner.
    pub fn user_banner(user_id: Id<UserMarker>, hash: &str) -> Self {
        Self::from_hash(format!("banners/{user_id}"), hash)
    }

    /// The default avatar shown when a user has none.
    ///
    /// Migrated usernames (discriminator `0`) index by snowflake, legacy
    /// tags by discriminator.
    pub fn default_avatar(user_id: Id<UserMarker>, discriminator: u16) -> Self {
        let index = if discriminator == 0 {
            (user_id.get() >> 22) % 6
        } else {
            u64::from(discriminator) % 5
        };
        let mut asset = Self::new(format!("embed/avatars/{index}"), index.to_string(), false);
        asset.size = None;
        asset
    }

    pub fn guild_icon(guild_id: Id<GuildMarker>, hash: &str) -> Self {
        Self::from_hash(format!("icons/{guild_id}"), hash)
    }

    pub fn application_icon(application_id: Id<ApplicationMarker>, hash: &str) -> Self {
        Self::from_hash(format!("app-icons/{application_id}"), hash)
    }

    /// Rich presence / store cover image of an application.
    pub fn application_cover(application_id: Id<ApplicationMarker>, hash: &str) -> Self {
        Self::from_hash(format!("app-icons/{application_id}"), hash)
    }

    /// Store asset attached to an application (SKU artwork).
    pub fn store_asset(application_id: Id<ApplicationMarker>, asset_id: &str) -> Self {
        Self::from_hash(format!("app-assets/{application_id}/store"), asset_id)
    }

    pub fn team_icon(team_id: Id<TeamMarker>, hash: &str) -> Self {
        Self::from_hash(format!("team-icons/{team_id}"), hash)
    }

    pub fn emoji(emoji_id: Id<EmojiMarker>, animated: bool) -> Self {
        let mut asset = Self::new(format!("emojis/{emoji_id}"), emoji_id.to_string(), animated);
        asset.size = None;
        asset
    }

    /// Point the asset at a different CDN host (proxies, tests).
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// The raw hash (or id) identifying this asset.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Change the requested size.
    ///
    /// # Errors
    ///
    /// The CDN only serves powers of two between 16 and 4096.
    pub fn with_size(mut self, size: u16) -> Result<Self> {
        if !size.is_power_of_two() || !(16..=4096).contains(&size) {
            return Err(Error::InvalidArgument(format!(
                "size must be a power of 2 between 16 and 4096, got {size}"
            )));
        }
        self.size = Some(size);
        Ok(self)
    }

    /// Change the image format.
    ///
    /// # Errors
    ///
    /// Unknown formats are rejected, as is `gif` for a static image.
    pub fn with_format(mut self, format: &str) -> Result<Self> {
        let format = format.to_ascii_lowercase();
        let valid = if self.animated {
            VALID_ASSET_FORMATS
        } else {
            VALID_STATIC_FORMATS
        };
        if !valid.contains(&format.as_str()) {
            return Err(Error::InvalidArgument(format!(
                "format must be one of {valid:?}, got {format}"
            )));
        }
        self.format = Some(format);
        Ok(self)
    }

    /// Change the format only if the asset is static; animated assets keep
    /// serving `gif`.
    pub fn with_static_format(self, format: &str) -> Result<Self> {
        if self.animated {
            return Ok(self);
        }
        self.with_format(format)
    }

    fn extension(&self) -> &str {
        match &self.format {
            Some(format) => format,
            None if self.animated => "gif",
            None => "png",
        }
    }

    /// Full CDN URL.
    pub fn url(&self) -> String {
        let mut url = format!("{}/{}.{}", self.base, self.path, self.extension());
        if let Some(size) = self.size {
            url.push_str(&format!("?size={size}"));
        }
        url
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_avatar_is_png() {
        let asset = Asset::user_avatar(Id::new(80351110224678912), "8342729096ea3675442027381ff50dfe");
        assert_eq!(
            asset.url(),
            "https://cdn.discordapp.com/avatars/80351110224678912/8342729096ea3675442027381ff50dfe.png?size=1024"
        );
        assert!(!asset.is_animated());
    }

    #[test]
    fn animated_hash_is_gif() {
        let asset = Asset::guild_icon(Id::new(1), "a_abcdef");
        assert!(asset.is_animated());
        assert!(asset.url().ends_with("/icons/1/a_abcdef.gif?size=1024"));
    }

    #[test]
    fn default_avatar_indexing() {
        let legacy = Asset::default_avatar(Id::new(80351110224678912), 1337);
        assert_eq!(legacy.url(), "https://cdn.discordapp.com/embed/avatars/2.png");

        let migrated = Asset::default_avatar(Id::new(80351110224678912), 0);
        let index = (80351110224678912u64 >> 22) % 6;
        assert_eq!(
            migrated.url(),
            format!("https://cdn.discordapp.com/embed/avatars/{index}.png")
        );
    }

    #[test]
    fn size_must_be_power_of_two() {
        let asset = Asset::team_icon(Id::new(3), "hash");
        assert!(asset.clone().with_size(100).is_err());
        assert!(asset.clone().with_size(8).is_err());
        let resized = asset.with_size(256).unwrap();
        assert!(resized.url().ends_with("?size=256"));
    }

    #[test]
    fn static_asset_rejects_gif() {
        let asset = Asset::application_icon(Id::new(4), "hash");
        assert!(asset.clone().with_format("gif").is_err());
        let webp = asset.with_format("WEBP").unwrap();
        assert!(webp.url().contains("hash.webp"));
    }

    #[test]
    fn static_format_leaves_animated_alone() {
        let asset = Asset::user_avatar(Id::new(5), "a_hash")
            .with_static_format("png")
            .unwrap();
        assert!(asset.url().contains("a_hash.gif"));
    }

    #[test]
    fn custom_base() {
        let asset = Asset::emoji(Id::new(41771983429993937), false).with_base("http://cdn.local/");
        assert_eq!(asset.url(), "http://cdn.local/emojis/41771983429993937.png");
    }
}
