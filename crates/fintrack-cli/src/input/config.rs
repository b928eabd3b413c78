use fintrack_core::config::EngineConfig;

use super::file::read_text;

/// Load engine settings from a YAML (or JSON) file. Missing keys keep their
/// defaults.
pub fn load_config(path: &str) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let (canonical, contents) = read_text(path)?;
    if contents.trim().is_empty() {
        return Ok(EngineConfig::default());
    }
    let config: EngineConfig = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse config '{}': {}", canonical.display(), e))?;
    Ok(config)
}
