//! File-backed persistence for the signed-in gateway session.
//!
//! The cache is a small versioned JSON file holding string entries. The
//! access token and the session identity live under separate keys so a
//! future refresh-token flow can rotate the token without rewriting the
//! identity. Everything here is synchronous; callers run on the async
//! runtime but the file is tiny and writes are rare.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use finanzasduo_core::auth::{AuthSession, SessionArtifactsTrait};
use finanzasduo_core::errors::{Error, Result};

use crate::client::GatewayClient;

const CURRENT_VERSION: u32 = 1;

/// Entry holding the raw access token.
const TOKEN_KEY: &str = "gateway.auth.token";

/// Entry holding the serialized [`SessionIdentity`].
const IDENTITY_KEY: &str = "finanzasduo.session";

/// Snapshot of a signed-in session, as restored from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
}

impl PersistedSession {
    pub fn new(access_token: &str, session: &AuthSession) -> Self {
        Self {
            access_token: access_token.to_string(),
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            name: session.name.clone(),
        }
    }
}

/// Identity half of a persisted session. Stored under its own key, next
/// to the token entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionIdentity {
    user_id: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: HashMap<String, String>,
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Stores the session in a JSON file on disk.
pub struct FileSessionCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Persists the session, replacing any previous one.
    pub fn store(&self, session: &PersistedSession) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Unexpected("session cache lock poisoned".to_string()))?;

        let identity = SessionIdentity {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            name: session.name.clone(),
        };
        let identity_json = serde_json::to_string(&identity)
            .map_err(|e| Error::Unexpected(format!("Failed to serialize session: {e}")))?;

        let mut file = self.load_file()?;
        file.entries
            .insert(TOKEN_KEY.to_string(), session.access_token.clone());
        file.entries.insert(IDENTITY_KEY.to_string(), identity_json);
        self.persist(&file)
    }

    /// Restores the persisted session, if a complete one is on disk.
    pub fn load(&self) -> Result<Option<PersistedSession>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Unexpected("session cache lock poisoned".to_string()))?;

        let file = self.load_file()?;
        let Some(access_token) = file.entries.get(TOKEN_KEY) else {
            return Ok(None);
        };
        let Some(identity_json) = file.entries.get(IDENTITY_KEY) else {
            return Ok(None);
        };
        let identity: SessionIdentity = serde_json::from_str(identity_json)
            .map_err(|e| Error::Unexpected(format!("Failed to parse session cache: {e}")))?;

        Ok(Some(PersistedSession {
            access_token: access_token.clone(),
            user_id: identity.user_id,
            email: identity.email,
            name: identity.name,
        }))
    }

    /// Removes the session entries. The file itself stays in place.
    pub fn clear(&self) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Unexpected("session cache lock poisoned".to_string()))?;

        let mut file = self.load_file()?;
        file.entries.remove(TOKEN_KEY);
        file.entries.remove(IDENTITY_KEY);
        self.persist(&file)
    }

    fn load_file(&self) -> Result<CacheFile> {
        if !self.path.exists() {
            return Ok(CacheFile::default());
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| Error::Unexpected(format!("Failed to read session cache: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Unexpected(format!("Failed to parse session cache: {e}")))
    }

    fn persist(&self, file: &CacheFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Unexpected(format!("Failed to create session cache directory: {e}"))
            })?;
        }
        let contents = serde_json::to_string_pretty(file)
            .map_err(|e| Error::Unexpected(format!("Failed to serialize session cache: {e}")))?;
        fs::write(&self.path, contents)
            .map_err(|e| Error::Unexpected(format!("Failed to write session cache: {e}")))
    }
}

/// Live-session leftovers: the in-memory bearer token and the cache file.
pub struct GatewaySessionArtifacts {
    client: Arc<GatewayClient>,
    cache: Arc<FileSessionCache>,
}

impl GatewaySessionArtifacts {
    pub fn new(client: Arc<GatewayClient>, cache: Arc<FileSessionCache>) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl SessionArtifactsTrait for GatewaySessionArtifacts {
    async fn clear(&self) -> Result<()> {
        self.client.clear_access_token().await;
        self.cache.clear()
    }
}
