use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::application::{AppInfo, EditApplication, PartialAppInfo};
use crate::types::id::{marker::ApplicationMarker, Id};

impl HttpClient {
    /// The bot's application, as returned by the OAuth2 endpoint.
    pub async fn application_info(&self) -> Result<AppInfo, HttpError> {
        let route = Route::new(Method::GET, "/oauth2/applications/@me");
        self.request_json(&route, &Body::Empty).await
    }

    /// The bot's application. Also records its id on the client.
    pub async fn current_application(&self) -> Result<AppInfo, HttpError> {
        let route = Route::new(Method::GET, "/applications/@me");
        let info: AppInfo = self.request_json(&route, &Body::Empty).await?;
        self.set_application_id(info.id);
        Ok(info)
    }

    pub async fn edit_application(&self, edit: &EditApplication) -> Result<AppInfo, HttpError> {
        let route = Route::new(Method::PATCH, "/applications/@me");
        self.request_json(&route, &Body::json(edit)?).await
    }

    /// Public info of any application.
    pub async fn application_rpc(
        &self,
        application_id: Id<ApplicationMarker>,
    ) -> Result<PartialAppInfo, HttpError> {
        let route = Route::new(Method::GET, "/applications/{application_id}/rpc")
            .param("application_id", application_id);
        self.request_json(&route, &Body::Empty).await
    }
}
