//! The dark-mode flag is the only state that outlives a session. It is read
//! once on startup and written back on every change.

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("toml: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub trait PreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, Error>;
    fn save(&self, prefs: &Preferences) -> Result<(), Error>;
}

pub struct FileStore {
    path: std::path::PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Option<Preferences>, Error> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(toml::from_str(&raw)?))
    }

    fn save(&self, prefs: &Preferences) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string(prefs)?)?;
        Ok(())
    }
}

pub struct Settings {
    store: Box<dyn PreferenceStore + Send + Sync>,
    current: Preferences,
}

impl Settings {
    /// An unreadable store is logged and treated as empty.
    pub fn load(store: Box<dyn PreferenceStore + Send + Sync>) -> Self {
        let current = match store.load() {
            Ok(prefs) => prefs.unwrap_or_default(),
            Err(e) => {
                log::warn!("ignoring unreadable preferences: {}", e);
                Preferences::default()
            }
        };
        Self { store, current }
    }

    pub fn dark_mode(&self) -> bool {
        self.current.dark_mode
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> Result<(), Error> {
        let prefs = Preferences { dark_mode };
        self.store.save(&prefs)?;
        self.current = prefs;
        Ok(())
    }

    pub fn toggle_dark_mode(&mut self) -> Result<bool, Error> {
        let dark_mode = !self.current.dark_mode;
        self.set_dark_mode(dark_mode)?;
        Ok(dark_mode)
    }
}
