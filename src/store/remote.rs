use crate::auth::AuthProvider;
use crate::errors::{JournalError, JournalResult};
use crate::models::{JournalEntry, JournalMeta};
use crate::store::EntryStore;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;

/// Authenticated per-user blob store: whole JSON documents addressed by path
/// under the user's namespace. A missing document is a normal outcome; the
/// store never triggers interactive sign-in.
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    root: String,
    auth: Arc<dyn AuthProvider>,
}

impl RemoteStore {
    pub fn new(base_url: &str, root: &str, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            root: root.trim_matches('/').to_string(),
            auth,
        }
    }

    pub fn entry_path(&self, date: &str) -> String {
        format!("{}/{}/entries/{}.json", self.base_url, self.root, date)
    }

    pub fn meta_path(&self) -> String {
        format!("{}/{}/meta.json", self.base_url, self.root)
    }

    fn list_path(&self) -> String {
        format!("{}/{}/entries.json", self.base_url, self.root)
    }

    async fn read_document<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> JournalResult<Option<T>> {
        let token = self.auth.bearer_token()?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| JournalError::Network(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                JournalError::NotAuthenticated(format!("read {url} rejected")),
            ),
            status if status.is_success() => {
                let document = response.json::<T>().await?;
                Ok(Some(document))
            }
            status => Err(JournalError::Network(format!("read {url}: HTTP {status}"))),
        }
    }

    async fn write_document<T: serde::Serialize>(&self, url: &str, document: &T) -> JournalResult<()> {
        let token = self.auth.bearer_token()?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(document)
            .send()
            .await
            .map_err(|err| JournalError::Network(err.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                JournalError::NotAuthenticated(format!("write {url} rejected")),
            ),
            status if status.is_success() => Ok(()),
            status => Err(JournalError::Network(format!("write {url}: HTTP {status}"))),
        }
    }
}

#[async_trait::async_trait]
impl EntryStore for RemoteStore {
    async fn get_entry(&self, date: &str) -> JournalResult<Option<JournalEntry>> {
        self.read_document(&self.entry_path(date)).await
    }

    async fn put_entry(&self, entry: &JournalEntry) -> JournalResult<()> {
        self.write_document(&self.entry_path(&entry.date), entry).await
    }

    async fn delete_entry(&self, date: &str) -> JournalResult<()> {
        let token = self.auth.bearer_token()?;
        let url = self.entry_path(date);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| JournalError::Network(err.to_string()))?;

        match response.status() {
            // Deleting an absent document is fine.
            StatusCode::NOT_FOUND => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                JournalError::NotAuthenticated(format!("delete {url} rejected")),
            ),
            status if status.is_success() => Ok(()),
            status => Err(JournalError::Network(format!("delete {url}: HTTP {status}"))),
        }
    }

    async fn all_entries(&self) -> JournalResult<HashMap<String, JournalEntry>> {
        let listing: Option<HashMap<String, JournalEntry>> =
            self.read_document(&self.list_path()).await?;
        Ok(listing.unwrap_or_default())
    }

    async fn get_meta(&self) -> JournalResult<Option<JournalMeta>> {
        self.read_document(&self.meta_path()).await
    }

    async fn put_meta(&self, meta: &JournalMeta) -> JournalResult<()> {
        self.write_document(&self.meta_path(), meta).await
    }
}

#[cfg(test)]
mod tests {
    use super::RemoteStore;
    use crate::auth::StaticTokenAuth;
    use crate::errors::JournalError;
    use crate::store::EntryStore;
    use std::sync::Arc;

    #[test]
    fn paths_are_rooted_under_the_namespace() {
        let auth = Arc::new(StaticTokenAuth::signed_in("ada", "token"));
        let store = RemoteStore::new("https://cloud.example/", "/journey/ada/", auth);
        assert_eq!(
            store.entry_path("2026-08-31"),
            "https://cloud.example/journey/ada/entries/2026-08-31.json"
        );
        assert_eq!(store.meta_path(), "https://cloud.example/journey/ada/meta.json");
    }

    #[tokio::test]
    async fn unauthenticated_operations_fail_fast() {
        let auth = Arc::new(StaticTokenAuth::signed_out());
        let store = RemoteStore::new("https://cloud.example", "journey/ada", auth);
        // No session means no request is ever attempted.
        let result = store.get_entry("2026-08-31").await;
        assert!(matches!(result, Err(JournalError::NotAuthenticated(_))));
    }
}
