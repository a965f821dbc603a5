use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::guild::Guild;
use crate::types::id::{marker::GuildMarker, Id};

impl HttpClient {
    /// Guild with approximate member and presence counts.
    pub async fn guild(&self, guild_id: Id<GuildMarker>) -> Result<Guild, HttpError> {
        let route = Route::new(Method::GET, "/guilds/{guild_id}")
            .param("guild_id", guild_id)
            .query("with_counts", true);
        self.request_json(&route, &Body::Empty).await
    }
}
