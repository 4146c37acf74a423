//! JSON scene configuration files

use crate::error::{open, IoError};
use canopy_core::{Result, SceneConfig};
use std::io::{BufReader, Read};
use std::path::Path;

/// Read and validate a scene configuration file. Missing fields take their defaults.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig> {
    let path = path.as_ref();
    let config = read_config_from(BufReader::new(open(path)?))?;
    log::info!("configuration loaded from {}", path.display());
    Ok(config)
}

/// Parse and validate a scene configuration from JSON text
pub fn read_config_from<R: Read>(input: R) -> Result<SceneConfig> {
    let config: SceneConfig = serde_json::from_reader(input).map_err(|e| IoError::ParseError {
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Write a configuration as pretty-printed JSON
pub fn write_config<P: AsRef<Path>>(config: &SceneConfig, path: P) -> Result<()> {
    let text = serde_json::to_string_pretty(config).map_err(|e| IoError::ParseError {
        message: e.to_string(),
    })?;
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::Error;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = read_config_from("{}".as_bytes()).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = read_config_from(r#"{ "camera": { "near": 10.0, "far": 1.0 } }"#.as_bytes());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = read_config_from("{ seed: ".as_bytes());
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = read_config("does/not/exist.json");
        match result {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected not-found error, got {:?}", other),
        }
    }
}
