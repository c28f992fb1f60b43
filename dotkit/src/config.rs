//! User preferences, stored as toml in the platform preferences directory.

use std::num::NonZeroUsize;

const DOCUMENTATION: &str = r#"# Dotkit preferences. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys are case sensitive. Missing keys take their default value.

# max_history: how many steps can be undone. Must be at least 1.
# default_width, default_height: size in pixels of documents made with `dotkit new`.
# brush_size: starting size of the brush, eraser, and shape tools.

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub max_history: NonZeroUsize,
    pub default_width: u32,
    pub default_height: u32,
    pub brush_size: u32,
}
impl Default for Preferences {
    fn default() -> Self {
        Self {
            max_history: dotkit_core::history::DEFAULT_MAX_HISTORY,
            default_width: 32,
            default_height: 32,
            brush_size: 1,
        }
    }
}
impl Preferences {
    pub const FILENAME: &'static str = "preferences.toml";
    #[must_use]
    pub fn path() -> Option<std::path::PathBuf> {
        let mut path = preferences_dir()?;
        path.push(Self::FILENAME);
        Some(path)
    }
    /// Load the user's preferences, or defaults if there are none or they're unreadable.
    #[must_use]
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                log::warn!("No preferences dir found, defaulting.");
                Self::default()
            }
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let prefs: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let prefs: Self = toml::from_str(&string)?;
            Ok(prefs)
        };
        match prefs {
            Ok(prefs) => prefs,
            Err(e) => {
                log::debug!("Preferences at {path:?} not loaded, defaulting: {e}");
                Self::default()
            }
        }
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Not recursive. If the parent is missing the user probably has a good reason.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        self.save_to(&preferences)
    }
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
    /// Documented toml text, as written by [`Self::save`].
    pub fn to_toml(&self) -> anyhow::Result<String> {
        let string = toml::ser::to_string_pretty(self)?;
        Ok(DOCUMENTATION.to_owned() + &string)
    }
}
