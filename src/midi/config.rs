//! MIDI configuration: client name, default device and port aliases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// MIDI section of the player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiConfig {
    /// Client name announced to the MIDI backend.
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Preferred output device (alias or substring of a port name).
    #[serde(default)]
    pub device: Option<String>,
    /// Short names for commonly used ports.
    #[serde(default = "MidiConfig::default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

fn default_client_name() -> String {
    "qust".to_string()
}

impl MidiConfig {
    fn default_aliases() -> BTreeMap<String, String> {
        [("pd", "Pure Data"), ("fluid", "FLUID Synth")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Expand an alias to the port name it stands for. Unknown names are
    /// returned unchanged and matched as a substring.
    pub fn resolve_device<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            device: None,
            aliases: Self::default_aliases(),
        }
    }
}
