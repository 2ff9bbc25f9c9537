use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ScrollSpyError;
use crate::host::CompatMode;

/// Container name reserved for the document
pub const DOCUMENT: &str = "document";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentSetup {
    /// Whether the host exposes the native page offset readout
    #[serde(default = "default_page_offset")]
    pub page_offset: bool,
    #[serde(default)]
    pub compat_mode: CompatMode,
}

fn default_page_offset() -> bool {
    true
}

impl Default for DocumentSetup {
    fn default() -> Self {
        DocumentSetup {
            page_offset: true,
            compat_mode: CompatMode::Standards,
        }
    }
}

/// One step of a replay timeline
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Mount {
        container: String,
        label: String,
        /// Explicit interval; takes precedence over `throttled`
        #[serde(default)]
        throttle_ms: Option<u64>,
        /// Throttle with the configured default interval
        #[serde(default)]
        throttled: bool,
    },
    Dispose {
        label: String,
    },
    Spy {
        container: String,
        name: String,
    },
    State {
        name: String,
    },
    Unmount {
        #[serde(default)]
        state: Option<String>,
        #[serde(default)]
        spy: Option<String>,
    },
    Scroll {
        container: String,
        x: f64,
        y: f64,
    },
    Advance {
        ms: u64,
    },
    Tick,
    Update,
    UpdateStates,
    Compat {
        mode: CompatMode,
    },
    PageOffset {
        enabled: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Scenario {
    #[serde(default)]
    pub document: DocumentSetup,
    /// Names of scrollable elements, in creation order
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Parses a scenario, choosing JSON or TOML from the file extension
pub fn parse_scenario(contents: &str, is_json: bool) -> Result<Scenario, ScrollSpyError> {
    let scenario: Scenario = if is_json {
        serde_json::from_str(contents).map_err(|e| ScrollSpyError::InvalidScenario(e.to_string()))?
    } else {
        toml::from_str(contents).map_err(|e| ScrollSpyError::InvalidScenario(e.to_string()))?
    };
    validate(&scenario)?;
    Ok(scenario)
}

pub fn load_scenario(path: &Path) -> Result<Scenario, ScrollSpyError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScrollSpyError::Io(format!("{}: {}", path.display(), e)))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    parse_scenario(&contents, is_json)
}

fn validate(scenario: &Scenario) -> Result<(), ScrollSpyError> {
    for (i, name) in scenario.elements.iter().enumerate() {
        if name == DOCUMENT {
            return Err(ScrollSpyError::InvalidScenario(format!(
                "element name '{}' is reserved",
                DOCUMENT
            )));
        }
        if scenario.elements[..i].contains(name) {
            return Err(ScrollSpyError::InvalidScenario(format!(
                "duplicate element '{}'",
                name
            )));
        }
    }
    Ok(())
}
