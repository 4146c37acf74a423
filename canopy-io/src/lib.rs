//! I/O operations for the canopy scene
//!
//! This crate reads the tree model (OBJ) and the scene configuration (JSON).

pub mod obj;
pub mod config;
pub mod error;

pub use config::{read_config, read_config_from, write_config};
pub use error::*;
pub use crate::obj::ObjReader;

use canopy_core::{Model, Result};
use std::path::Path;

/// Auto-detect format and read a model
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("obj") => ObjReader::read_model(path),
        _ => Err(IoError::InvalidFormat {
            format: format!("unsupported model format: {:?}", path.extension()),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format() {
        let result = read_model("tree.stl");
        assert!(matches!(result, Err(canopy_core::Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_model() {
        assert!(read_model("models/missing.obj").is_err());
    }
}
