use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::session::{NewSession, Session, SessionPatch},
    repositories::session::SessionStore,
};

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A `SessionStore` that talks to the session REST API.
#[derive(Clone)]
pub struct HttpSessionStore {
    client: Client,
    base_url: String,
}

impl HttpSessionStore {
    /// Creates a store for the API served at `base_url`
    /// (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/sessions", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/api/sessions/{}", self.base_url, id)
    }
}

/// Turns a non-success response into `AppError::Api`, keeping the server's
/// `details` string when there is one.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let details = sonic_rs::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.details.or(body.error))
        .unwrap_or(text);

    Err(AppError::Api {
        status: status.as_u16(),
        details,
    })
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn create(&self, new: NewSession) -> Result<Session> {
        let response = self
            .client
            .post(self.collection_url())
            .json(&new)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn list(&self) -> Result<Vec<Session>> {
        let response = self.client.get(self.collection_url()).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// The API reports an unknown id as a 500 whose details carry the
    /// `NotFound` message; that answer maps to `Ok(None)`.
    async fn get(&self, id: i64) -> Result<Option<Session>> {
        let response = self.client.get(self.item_url(id)).send().await?;
        match check(response).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(AppError::Api { ref details, .. })
                if *details == AppError::NotFound(id).to_string() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(&self, id: i64, patch: SessionPatch) -> Result<Session> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(&patch)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_urls_without_double_slashes() {
        let store = HttpSessionStore::new("http://127.0.0.1:3000/");
        assert_eq!(store.collection_url(), "http://127.0.0.1:3000/api/sessions");
        assert_eq!(store.item_url(5), "http://127.0.0.1:3000/api/sessions/5");
    }
}
