use std::collections::HashMap;
use std::path::Path;

use anyhow::anyhow;

/// Precomputed instances, keyed by file stem. Payloads are kept as the raw
/// JSON text they were written with and sent to clients verbatim.
pub struct Store {
    instances: HashMap<String, String>,
}

impl Store {
    /// Loads every `*.json` file in `dir`. A file that is not valid JSON is
    /// fatal: a bad instance is a deployment mistake, not a runtime
    /// condition to serve around.
    pub fn load_dir(dir: &Path) -> anyhow::Result<Self> {
        let mut instances = HashMap::new();

        for entry in std::fs::read_dir(dir)
            .map_err(|e| anyhow!("error reading data directory {}: {e}", dir.display()))?
        {
            let path = entry?.path();

            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str::<serde_json::Value>(&text)
                .map_err(|e| anyhow!("error decoding JSON from {}: {e}", path.display()))?;

            log::info!("Loaded instance {key}");
            instances.insert(key.to_string(), text);
        }

        Ok(Self { instances })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.instances.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
