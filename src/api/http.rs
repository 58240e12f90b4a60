//! reqwest-backed client for the Zendesk-style Help Center REST API.

use super::{
    ApiError, CreateRequest, CreatedResource, HelpCenterApi, RemoteId, UpdateRequest, UpdateTarget,
};
use crate::config::ApiConfig;
use crate::content::NodeKind;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

const API_PREFIX: &str = "/api/v2/help_center";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// URL-encode a locale for use in a URL path.
fn encode_locale(locale: &str) -> String {
    urlencoding::encode(locale).into_owned()
}

/// JSON envelope key the API wraps each resource in.
fn envelope(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Category => "category",
        NodeKind::Section => "section",
        NodeKind::Article => "article",
        NodeKind::Translation => "translation",
    }
}

fn require_parent(kind: NodeKind, parent_id: Option<RemoteId>) -> Result<RemoteId, ApiError> {
    parent_id.ok_or_else(|| ApiError::InvalidRequest(format!("{} requires a parent id", kind)))
}

/// Build URL for creating a resource of `kind`
pub fn build_create_url(
    base: &str,
    kind: NodeKind,
    parent_id: Option<RemoteId>,
) -> Result<String, ApiError> {
    let url = match kind {
        NodeKind::Category => format!("{}{}/categories.json", base, API_PREFIX),
        NodeKind::Section => format!(
            "{}{}/categories/{}/sections.json",
            base,
            API_PREFIX,
            require_parent(kind, parent_id)?
        ),
        NodeKind::Article => format!(
            "{}{}/sections/{}/articles.json",
            base,
            API_PREFIX,
            require_parent(kind, parent_id)?
        ),
        NodeKind::Translation => format!(
            "{}{}/articles/{}/translations.json",
            base,
            API_PREFIX,
            require_parent(kind, parent_id)?
        ),
    };
    Ok(url)
}

/// Build URL for updating a resource or one of its translations
pub fn build_update_url(base: &str, request: &UpdateRequest) -> Result<String, ApiError> {
    let collection = match request.kind {
        NodeKind::Category => "categories",
        NodeKind::Section => "sections",
        NodeKind::Article => "articles",
        NodeKind::Translation => {
            // Translations are addressed through their article and locale.
            let UpdateTarget::Translation { ref locale } = request.target else {
                return Err(ApiError::InvalidRequest(
                    "translation updates must target a locale".to_string(),
                ));
            };
            let article_id = require_parent(request.kind, request.parent_id)?;
            return Ok(format!(
                "{}{}/articles/{}/translations/{}.json",
                base,
                API_PREFIX,
                article_id,
                encode_locale(locale)
            ));
        }
    };
    let url = match &request.target {
        UpdateTarget::Resource => format!(
            "{}{}/{}/{}.json",
            base, API_PREFIX, collection, request.remote_id
        ),
        UpdateTarget::Translation { locale } => format!(
            "{}{}/{}/{}/translations/{}.json",
            base,
            API_PREFIX,
            collection,
            request.remote_id,
            encode_locale(locale)
        ),
    };
    Ok(url)
}

/// HTTP implementation of [`HelpCenterApi`].
#[derive(Debug, Clone)]
pub struct HttpHelpCenterClient {
    client: Client,
    base_url: String,
    user: String,
    token: String,
}

impl HttpHelpCenterClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base URL is empty".to_string()));
        }
        if config.user.trim().is_empty() || config.token.trim().is_empty() {
            return Err(ApiError::Config("user and token are required".to_string()));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            token: config.token.clone(),
        })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(format!("{}/token", self.user), Some(&self.token))
    }
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[async_trait]
impl HelpCenterApi for HttpHelpCenterClient {
    async fn create(&self, request: CreateRequest) -> Result<CreatedResource, ApiError> {
        let url = build_create_url(&self.base_url, request.kind, request.parent_id)?;
        let key = envelope(request.kind);
        let mut body = Map::new();
        body.insert(key.to_string(), Value::Object(request.payload));

        debug!("POST {}", url);
        let resp = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let mut json: Map<String, Value> = resp.json().await?;
        let created = json
            .remove(key)
            .ok_or_else(|| ApiError::MalformedResponse(format!("missing '{}' object", key)))?;
        let created: CreatedResource = serde_json::from_value(created)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        info!("Created {} {}", key, created.id);
        Ok(created)
    }

    async fn update(&self, request: UpdateRequest) -> Result<(), ApiError> {
        let url = build_update_url(&self.base_url, &request)?;
        let key = match request.target {
            UpdateTarget::Resource => envelope(request.kind),
            UpdateTarget::Translation { .. } => "translation",
        };
        let mut body = Map::new();
        body.insert(key.to_string(), Value::Object(request.payload));

        debug!("PUT {}", url);
        let resp = self
            .authorize(self.client.put(&url))
            .json(&body)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}
