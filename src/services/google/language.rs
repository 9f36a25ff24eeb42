//! Google Cloud Natural Language entity analysis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GoogleApi;
use crate::extract::Entity;
use crate::services::{EntityAnalyzer, ServiceError};

const SERVICE: &str = "language";
const ANALYZE_ENTITIES_PATH: &str = "v1/documents:analyzeEntities";

/// Natural Language API client for `analyzeEntities`.
pub struct LanguageClient {
    api: GoogleApi,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeEntitiesRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    document_type: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeEntitiesResponse {
    #[serde(default)]
    entities: Vec<ApiEntity>,
}

#[derive(Debug, Deserialize)]
struct ApiEntity {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    entity_type: String,
}

impl From<ApiEntity> for Entity {
    fn from(entity: ApiEntity) -> Self {
        Entity::new(entity.entity_type, entity.name)
    }
}

impl LanguageClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl EntityAnalyzer for LanguageClient {
    fn is_available(&self) -> bool {
        self.api.is_configured()
    }

    fn availability_hint(&self) -> String {
        if self.api.is_configured() {
            format!("Cloud Natural Language is available ({})", self.api.endpoint())
        } else {
            "Cloud Natural Language needs GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN".to_string()
        }
    }

    async fn analyze_entities(&self, text: &str) -> Result<Vec<Entity>, ServiceError> {
        let request = AnalyzeEntitiesRequest {
            document: Document {
                document_type: "PLAIN_TEXT",
                content: text,
            },
            encoding_type: "UTF8",
        };

        let response: AnalyzeEntitiesResponse = self
            .api
            .post_json(SERVICE, ANALYZE_ENTITIES_PATH, &request)
            .await?;

        Ok(response.entities.into_iter().map(Entity::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::google::test_support::{api_key, spawn};
    use axum::http::Uri;
    use axum::{Json, Router};
    use std::time::Duration;

    #[test]
    fn test_request_shape() {
        let request = AnalyzeEntitiesRequest {
            document: Document {
                document_type: "PLAIN_TEXT",
                content: "Alice at Acme",
            },
            encoding_type: "UTF8",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "document": {"type": "PLAIN_TEXT", "content": "Alice at Acme"},
                "encodingType": "UTF8"
            })
        );
    }

    #[tokio::test]
    async fn test_entities_keep_service_order() {
        let router = Router::new().fallback(|uri: Uri| async move {
            assert_eq!(uri.path(), "/v1/documents:analyzeEntities");
            Json(serde_json::json!({
                "entities": [
                    {"name": "Alice", "type": "PERSON", "salience": 0.6},
                    {"name": "Paris", "type": "LOCATION"},
                    {"name": "Acme", "type": "ORGANIZATION"}
                ],
                "language": "en"
            }))
        });
        let base = spawn(router).await;
        let client =
            LanguageClient::new(GoogleApi::new(base, api_key(), Duration::from_secs(5)).unwrap());

        let entities = client.analyze_entities("Alice from Acme in Paris").await.unwrap();
        assert_eq!(
            entities,
            vec![
                Entity::new("PERSON", "Alice"),
                Entity::new("LOCATION", "Paris"),
                Entity::new("ORGANIZATION", "Acme"),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_entities_list_is_empty() {
        let router =
            Router::new().fallback(|| async { Json(serde_json::json!({"language": "en"})) });
        let base = spawn(router).await;
        let client =
            LanguageClient::new(GoogleApi::new(base, api_key(), Duration::from_secs(5)).unwrap());

        assert!(client.analyze_entities("hello").await.unwrap().is_empty());
    }
}
