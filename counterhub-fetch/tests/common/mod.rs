//! Shared test doubles for the fetch integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use counterhub_core::{
    CanonicalReport, CoreError, FileWriter, HarvestSettings, PersistenceLayer, ProgressSink,
    SettingsProvider,
};
use counterhub_fetch::{FetchError, RawResponse, Transport};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

// ============================================================================
// Scripted Transport
// ============================================================================

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status and body.
    Respond(u16, String),
    /// Never answer within any sane timeout.
    Hang,
    /// Fail before any response.
    Fail(String),
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Respond(200, body.into())
    }
}

/// Replies by URL path. The last reply for a path repeats.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(String, tokio::time::Instant)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), replies.into());
        self
    }

    /// Paths requested, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    /// (path, virtual time) of each request.
    pub fn timed_calls(&self) -> Vec<(String, tokio::time::Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls().iter().filter(|p| *p == path).count()
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => Reply::Respond(404, String::new()),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, FetchError> {
        let path = url.path().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((path.clone(), tokio::time::Instant::now()));
        let reply = self.next_reply(&path);

        match reply {
            Reply::Respond(status, body) => Ok(RawResponse::new(status, "", body)),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(86_400)).await;
                Ok(RawResponse::new(200, "OK", "[]"))
            }
            Reply::Fail(message) => Err(FetchError::InvalidUrl(message)),
        }
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Keeps written files in memory.
#[derive(Default)]
pub struct MemoryWriter {
    files: Mutex<HashMap<PathBuf, String>>,
    pub fail: bool,
}

impl MemoryWriter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn content(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl FileWriter for MemoryWriter {
    async fn write(&self, path: &Path, content: &str) -> bool {
        if self.fail {
            return false;
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        true
    }
}

/// Counts vendor-completed signals.
#[derive(Default)]
pub struct CountingProgress {
    pub completed: AtomicUsize,
}

impl CountingProgress {
    pub fn count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressSink for CountingProgress {
    fn vendor_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fixed pacing.
pub struct FixedSettings(pub HarvestSettings);

#[async_trait]
impl SettingsProvider for FixedSettings {
    async fn read(&self) -> HarvestSettings {
        self.0
    }
}

/// Archive that always fails.
pub struct BrokenArchive;

#[async_trait]
impl PersistenceLayer for BrokenArchive {
    async fn save(&self, _report: &CanonicalReport, _vendor_name: &str) -> Result<(), CoreError> {
        Err(CoreError::Other("disk full".to_string()))
    }
}

// ============================================================================
// Payloads
// ============================================================================

pub fn discovery(ids: &[&str]) -> String {
    let entries: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| serde_json::json!({"Report_ID": id, "Release": "5.1", "Report_Name": id}))
        .collect();
    serde_json::Value::Array(entries).to_string()
}

/// A release 5.1 platform report with January-only usage.
pub fn january_platform_report() -> String {
    serde_json::json!({
        "Report_Header": {
            "Report_Name": "Platform Master Report",
            "Report_ID": "PR",
            "Release": "5.1",
            "Institution_Name": "Example University"
        },
        "Report_Items": [{
            "Platform": "AcmeHost",
            "Attribute_Performance": [
                {"Performance": {"Total_Item_Requests": {"2023-01": 5}}}
            ]
        }]
    })
    .to_string()
}

/// A release 5.1 title report with the given count for January.
pub fn title_report(count: u64) -> String {
    serde_json::json!({
        "Report_Header": {"Report_ID": "TR", "Release": "5.1"},
        "Report_Items": [{
            "Title": "Journal of Tests",
            "Platform": "AcmeHost",
            "Attribute_Performance": [
                {"Performance": {"Total_Item_Requests": {"2023-01": count}}}
            ]
        }]
    })
    .to_string()
}
