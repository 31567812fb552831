use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "token";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Io(#[from] io::Error),

    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistent key/value storage for the session token.
pub trait TokenStore: Send {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&mut self, token: &str) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// Keeps a JSON object on disk; only the `token` key is ours, others are
/// left as found.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .read_map()?
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn save(&mut self, token: &str) -> Result<(), SessionError> {
        let mut map = self.read_map()?;
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_map(&map)
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        let mut map = self.read_map()?;
        if map.remove(TOKEN_KEY).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
    saves: usize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            saves: 0,
        }
    }

    /// How many times a token has been written.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.clone())
    }

    fn save(&mut self, token: &str) -> Result<(), SessionError> {
        self.token = Some(token.to_string());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.token = None;
        Ok(())
    }
}

/// The signed-in state of this client.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    token: Option<String>,
}

impl<S: TokenStore> Session<S> {
    /// Restores whatever token the store already holds.
    pub fn open(store: S) -> Result<Self, SessionError> {
        let token = store.load()?;
        Ok(Self { store, token })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn login(&mut self, token: &str) -> Result<(), SessionError> {
        self.store.save(token)?;
        self.token = Some(token.to_string());
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.token = None;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
