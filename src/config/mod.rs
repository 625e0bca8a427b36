use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Complete portrait service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortraitConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub portrait: PortraitSection,
    #[serde(default)]
    pub dice: DiceTimings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Allow any origin (the portrait is usually embedded in a streaming overlay)
    #[serde(default = "default_cors_allow_any")]
    pub cors_allow_any: bool,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_cors_allow_any() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_allow_any: default_cors_allow_any(),
        }
    }
}

/// Persistent store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("portrait.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// What the portrait page shows
#[derive(Debug, Clone, Deserialize)]
pub struct PortraitSection {
    /// Attribute names shown in combat mode
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
    /// Attribute shown in the side bar
    #[serde(default = "default_side_attribute")]
    pub side_attribute: String,
    /// Info field holding the character's display name
    #[serde(default = "default_name_info")]
    pub name_info: String,
    #[serde(default = "default_avatar_path")]
    pub avatar_path: String,
    #[serde(default = "default_fallback_avatar")]
    pub fallback_avatar: String,
}

fn default_attributes() -> Vec<String> {
    vec!["Vida".to_string(), "Sanidade".to_string()]
}

fn default_side_attribute() -> String {
    "Exposição Paranormal".to_string()
}

fn default_name_info() -> String {
    "Nome".to_string()
}

fn default_avatar_path() -> String {
    "/api/sheet/player/avatar".to_string()
}

fn default_fallback_avatar() -> String {
    "/avatar404.png".to_string()
}

impl Default for PortraitSection {
    fn default() -> Self {
        Self {
            attributes: default_attributes(),
            side_attribute: default_side_attribute(),
            name_info: default_name_info(),
            avatar_path: default_avatar_path(),
            fallback_avatar: default_fallback_avatar(),
        }
    }
}

/// Dice presentation timings (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DiceTimings {
    /// Delay between starting the roll animation and revealing a result
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Delay between revealing the roll and its description
    #[serde(default = "default_description_ms")]
    pub description_ms: u64,
    /// How long a revealed result stays on screen before fading
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_description_ms() -> u64 {
    750
}

fn default_hold_ms() -> u64 {
    3000
}

fn default_fade_ms() -> u64 {
    600
}

impl Default for DiceTimings {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            description_ms: default_description_ms(),
            hold_ms: default_hold_ms(),
            fade_ms: default_fade_ms(),
        }
    }
}

impl DiceTimings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn description(&self) -> Duration {
        Duration::from_millis(self.description_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

impl PortraitConfig {
    /// Apply PORTRAIT_* environment overrides. Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PORTRAIT_BIND_ADDR") {
            if !v.is_empty() {
                self.server.bind_addr = v;
            }
        }
        if let Ok(v) = std::env::var("PORTRAIT_DB_PATH") {
            if !v.is_empty() {
                self.database.path = PathBuf::from(v);
            }
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> anyhow::Result<PortraitConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: PortraitConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PortraitConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.portrait.name_info, "Nome");
        assert_eq!(config.portrait.fallback_avatar, "/avatar404.png");
        assert_eq!(config.dice.settle_ms, 1000);
        assert_eq!(config.dice.description_ms, 750);
        assert_eq!(config.dice.hold_ms, 3000);
        assert_eq!(config.dice.fade_ms, 600);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            bind_addr = "127.0.0.1:8080"
            cors_allow_any = false

            [database]
            path = "/tmp/openrpg.db"

            [portrait]
            attributes = ["HP", "MP"]
            side_attribute = "Stress"
            name_info = "Name"

            [dice]
            hold_ms = 5000
        "#;

        let config: PortraitConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert!(!config.server.cors_allow_any);
        assert_eq!(config.database.path, PathBuf::from("/tmp/openrpg.db"));
        assert_eq!(config.portrait.attributes, vec!["HP", "MP"]);
        assert_eq!(config.portrait.side_attribute, "Stress");
        assert_eq!(config.portrait.avatar_path, "/api/sheet/player/avatar"); // Default
        assert_eq!(config.dice.hold(), Duration::from_secs(5));
        assert_eq!(config.dice.fade_ms, 600); // Default
    }

    #[test]
    fn test_partial_config() {
        // Missing sections use defaults
        let toml = r#"
            [portrait]
            side_attribute = "Sorte"
        "#;

        let config: PortraitConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.portrait.side_attribute, "Sorte");
        assert_eq!(config.portrait.attributes, vec!["Vida", "Sanidade"]);
        assert_eq!(config.dice, DiceTimings::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"characters.db\"").unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.path, PathBuf::from("characters.db"));
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        assert!(load_config("/nonexistent/portrait.toml").is_err());
    }
}
