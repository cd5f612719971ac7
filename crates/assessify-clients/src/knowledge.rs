//! Knowledge-platform client — the HTTP implementation of the Hierarchy
//! Fetcher.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use assessify_core::model::{QuestionSetHierarchy, SourceDoc};
use assessify_core::traits::HierarchyFetcher;

use crate::error::ClientError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const HIERARCHY_PATH: &str = "/questionset/v5/hierarchy";
const QUESTION_READ_PATH: &str = "/question/v4/read";

/// Read-only client for question-set and question documents.
pub struct KnowledgeClient {
    base_url: String,
    auth_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl KnowledgeClient {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Self {
        Self::with_timeout(base_url, auth_token, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, auth_token: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            timeout_secs,
            client,
        }
    }

    async fn read_result(&self, path: &str, id: &str) -> Result<Value, ClientError> {
        let mut request = self.client.get(format!("{}{}/{}", self.base_url, path, id));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::NetworkError(error.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(ClientError::NotFound(id.to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<PlatformError>(&body)
                .map(|error| error.params.errmsg)
                .unwrap_or(body);
            return Err(ClientError::ApiError { status, message });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|error| ClientError::MalformedResponse(error.to_string()))?;
        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ClientError::MalformedResponse("missing 'result' field".to_string()))
    }
}

#[derive(Deserialize)]
struct PlatformError {
    params: PlatformErrorParams,
}

#[derive(Deserialize)]
struct PlatformErrorParams {
    errmsg: String,
}

#[async_trait]
impl HierarchyFetcher for KnowledgeClient {
    #[instrument(skip(self))]
    async fn fetch_question_set(&self, id: &str) -> anyhow::Result<QuestionSetHierarchy> {
        let result = self.read_result(HIERARCHY_PATH, id).await?;
        // The platform has shipped both spellings of the result key.
        let question_set = result
            .get("questionSet")
            .or_else(|| result.get("questionset"))
            .cloned()
            .ok_or_else(|| {
                ClientError::MalformedResponse("missing 'questionSet' in result".to_string())
            })?;
        Ok(serde_json::from_value(question_set)
            .map_err(|error| ClientError::MalformedResponse(error.to_string()))?)
    }

    #[instrument(skip(self))]
    async fn fetch_question(&self, id: &str) -> anyhow::Result<SourceDoc> {
        let result = self.read_result(QUESTION_READ_PATH, id).await?;
        let question = result.get("question").cloned().ok_or_else(|| {
            ClientError::MalformedResponse("missing 'question' in result".to_string())
        })?;
        Ok(serde_json::from_value(question)
            .map_err(|error| ClientError::MalformedResponse(error.to_string()))?)
    }
}
