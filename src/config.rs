use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Knobs for a single build. The defaults produce the canonical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Point identical heap payloads at one heap range instead of
    /// appending them again. Costs a hash per heap write and a small map.
    pub dedup_heap: bool,
}

impl BuildOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_dedup_heap(mut self, on: bool) -> Self {
        self.dedup_heap = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZeroError;

    #[test]
    fn test_defaults() {
        assert!(!BuildOptions::default().dedup_heap);
        assert_eq!(BuildOptions::from_json("{}").unwrap(), BuildOptions::default());
    }

    #[test]
    fn test_from_json() {
        let options = BuildOptions::from_json(r#"{ "dedup_heap": true }"#).unwrap();
        assert!(options.dedup_heap);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            BuildOptions::from_json(r#"{ "dedup_heap": "yes" }"#),
            Err(ZeroError::Config(_))
        ));
    }
}
