use std::env;

use async_trait::async_trait;
use model::paddock::PaddockRecord;
use serde::Deserialize;
use serde_json::Value;
use utility::id::Id;

use crate::repository::{PaddockRepository, PersistenceError};

pub struct RestRepositoryInfo {
    pub base_url: String,
    pub token: Option<String>,
}

impl RestRepositoryInfo {
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("PADDOCK_API_URL").ok()?;
        let token = env::var("PADDOCK_API_TOKEN").ok();
        Some(Self { base_url, token })
    }

    pub(crate) fn paddocks_url(&self) -> String {
        format!("{}/paddocks", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: Value,
}

impl CreatedResponse {
    fn id(self) -> String {
        match self.id {
            Value::String(id) => id,
            other => other.to_string(),
        }
    }
}

/// Creates paddocks through the farm management REST api.
pub struct RestPaddockRepository {
    client: reqwest::Client,
    info: RestRepositoryInfo,
}

impl RestPaddockRepository {
    pub fn new(info: RestRepositoryInfo) -> Self {
        Self {
            client: reqwest::Client::new(),
            info,
        }
    }
}

#[async_trait]
impl PaddockRepository for RestPaddockRepository {
    async fn create(
        &self,
        record: PaddockRecord,
    ) -> Result<Id<PaddockRecord>, PersistenceError> {
        let mut request = self.client.post(self.info.paddocks_url()).json(&record);
        if let Some(token) = &self.info.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|why| PersistenceError::new(why.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("paddock api responded with {}: {}", status, body);
            return Err(PersistenceError::new(body).with_status(status.as_u16()));
        }

        let created: CreatedResponse = response
            .json()
            .await
            .map_err(|why| PersistenceError::new(why.to_string()))?;
        Ok(Id::new(created.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_paddocks_url() {
        let info = RestRepositoryInfo {
            base_url: "https://farm.example/api/".to_owned(),
            token: None,
        };
        assert_eq!(info.paddocks_url(), "https://farm.example/api/paddocks");
    }

    #[test]
    fn accepts_numeric_and_string_ids() {
        let created: CreatedResponse = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(created.id(), "42");
        let created: CreatedResponse = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(created.id(), "abc");
    }
}
