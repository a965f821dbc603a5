use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::types::asset::Asset;
use crate::types::id::{marker::EmojiMarker, Id};

/// An emoji as used on buttons, select options and reactions.
///
/// Unicode emoji only carry a `name`; custom emoji also carry an `id`.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PartialEmoji {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id<EmojiMarker>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
}

impl PartialEmoji {
    pub fn unicode(emoji: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(emoji.into()),
            animated: false,
        }
    }

    pub fn custom(name: impl Into<String>, id: Id<EmojiMarker>, animated: bool) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            animated,
        }
    }

    /// Parse `<:name:id>`, `<a:name:id>`, `name:id`, or a unicode emoji.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let (animated, body) = match trimmed
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        {
            Some(inner) => match inner.strip_prefix("a:") {
                Some(rest) => (true, rest),
                None => (false, inner.strip_prefix(':').unwrap_or(inner)),
            },
            None => (false, trimmed),
        };

        if let Some((name, id)) = body.rsplit_once(':') {
            if let Some(id) = id.parse::<u64>().ok().and_then(Id::new_checked) {
                return Self::custom(name, id, animated);
            }
        }
        Self::unicode(trimmed)
    }

    pub fn is_custom(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_unicode(&self) -> bool {
        self.id.is_none()
    }

    /// CDN image of a custom emoji.
    pub fn url(&self) -> Option<Asset> {
        self.id.map(|id| Asset::emoji(id, self.animated))
    }
}

impl From<&str> for PartialEmoji {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<char> for PartialEmoji {
    fn from(value: char) -> Self {
        Self::unicode(value.to_string())
    }
}

impl Display for PartialEmoji {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = self.name.as_deref().unwrap_or("_");
        match self.id {
            Some(id) if self.animated => write!(f, "<a:{name}:{id}>"),
            Some(id) => write!(f, "<:{name}:{id}>"),
            None => f.write_str(name),
        }
    }
}
