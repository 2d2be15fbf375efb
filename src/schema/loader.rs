//! Schema definition loading
//!
//! Schemas are plain serde documents, so deployments keep them in YAML or
//! JSON files next to the service configuration and hand the parsed catalog
//! to every compilation.
//!
//! ```yaml
//! collections:
//!   pages:
//!     primary: id
//!     fields:
//!       id: { field: id, type: integer }
//!       title: { field: title, type: string }
//! relations:
//!   - collection: articles
//!     field: page_id
//!     related_collection: pages
//!     meta: { one_field: articles }
//! ```

use std::fs;
use std::path::Path;

use super::errors::SchemaError;
use super::Schema;

impl Schema {
    pub fn from_yaml_str(input: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(input).map_err(|err| SchemaError::Parse(err.to_string()))
    }

    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(input).map_err(|err| SchemaError::Parse(err.to_string()))
    }

    /// Load a schema from a `.yaml`/`.yml` or `.json` file, dispatching on
    /// the extension (YAML when in doubt, since YAML is a JSON superset).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|err| SchemaError::Read(format!("{}: {}", path.display(), err)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }
}
