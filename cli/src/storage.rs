use crate::error::{Error, Result};
use crate::models::{Session, User};
use directories::ProjectDirs;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

pub const USERS_KEY: &str = "users";
pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "userData";

/// String-valued persistent storage, the same shape as a browser's localStorage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten after every mutation.
///
/// Keys are kept sorted so the file diffs cleanly.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// `<data dir>/storage.json` for the current platform.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "taskdeck", "taskdeck")
            .ok_or_else(|| Error::Config("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().join("storage.json"))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::MalformedState(format!("{}: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Typed view over the three well-known keys.
#[derive(Debug)]
pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Registered users. An absent key means nobody has signed up yet.
    pub fn users(&self) -> Result<Vec<User>> {
        match self.backend.get(USERS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::MalformedState(format!("{USERS_KEY}: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    pub fn save_users(&mut self, users: &[User]) -> Result<()> {
        let raw = serde_json::to_string(users)?;
        self.backend.set(USERS_KEY, raw)
    }

    pub fn persist_session(&mut self, session: &Session) -> Result<()> {
        self.backend.set(TOKEN_KEY, session.token.clone())?;
        self.backend
            .set(USER_KEY, serde_json::to_string(&session.user)?)
    }

    /// The stored session, if both halves are present.
    ///
    /// A user record that does not parse is `MalformedState`; the caller
    /// decides whether to wipe it.
    pub fn load_session(&self) -> Result<Option<Session>> {
        let token = self.backend.get(TOKEN_KEY)?;
        let user = self.backend.get(USER_KEY)?;

        match (token, user) {
            (Some(token), Some(raw)) if !token.is_empty() => {
                let user: User = serde_json::from_str(&raw)
                    .map_err(|e| Error::MalformedState(format!("{USER_KEY}: {e}")))?;
                Ok(Some(Session { token, user }))
            }
            _ => Ok(None),
        }
    }

    pub fn clear_session(&mut self) -> Result<()> {
        self.backend.remove(TOKEN_KEY)?;
        self.backend.remove(USER_KEY)
    }
}
