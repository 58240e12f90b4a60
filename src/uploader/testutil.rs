//! In-memory API double that records every call.

use super::SyncContext;
use crate::api::{ApiError, CreateRequest, CreatedResource, HelpCenterApi, RemoteId, UpdateRequest};
use crate::config::SyncConfig;
use crate::meta::{ChangeDetector, ContentHash};
use crate::render::CommonMarkRenderer;
use crate::storage::FsStorage;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(CreateRequest),
    Update(UpdateRequest),
}

#[derive(Debug, Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    failing_titles: Mutex<HashSet<String>>,
    cancel_after_create: Mutex<Option<CancellationToken>>,
}

impl RecordingApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<CreateRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(req) => Some(req),
                Call::Update(_) => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<UpdateRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(req) => Some(req),
                Call::Create(_) => None,
            })
            .collect()
    }

    /// Cancel `token` once the first create has been answered.
    pub fn cancel_after_create(&self, token: CancellationToken) {
        *self.cancel_after_create.lock().unwrap() = Some(token);
    }

    /// Make creates for nodes with this title fail.
    pub fn fail_title(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }
}

#[async_trait]
impl HelpCenterApi for RecordingApi {
    async fn create(&self, request: CreateRequest) -> Result<CreatedResource, ApiError> {
        let title = request
            .payload
            .get("title")
            .or_else(|| request.payload.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        self.calls.lock().unwrap().push(Call::Create(request));
        if self.failing_titles.lock().unwrap().contains(&title) {
            return Err(ApiError::Status {
                status: 422,
                body: format!("rejected {}", title),
            });
        }
        let id: RemoteId = self.next_id.fetch_add(1, Ordering::SeqCst) + 100;
        if let Some(token) = self.cancel_after_create.lock().unwrap().take() {
            token.cancel();
        }
        Ok(CreatedResource::new(id))
    }

    async fn update(&self, request: UpdateRequest) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call::Update(request));
        Ok(())
    }
}

pub fn sync_ctx(api: Arc<RecordingApi>) -> SyncContext {
    sync_ctx_with(api, Arc::new(ContentHash))
}

pub fn sync_ctx_with(api: Arc<RecordingApi>, detector: Arc<dyn ChangeDetector>) -> SyncContext {
    SyncContext {
        api,
        storage: Arc::new(FsStorage::from_config(&SyncConfig::default())),
        renderer: Arc::new(CommonMarkRenderer),
        detector,
    }
}
