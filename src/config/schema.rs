use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_PAGE_SIZE;
use crate::scoring::DEFAULT_PROFILE;
use crate::search::DEFAULT_THRESHOLD;
use crate::table::{Field, LoadOptions};

/// User configuration.
///
/// Every key is optional; command-line flags override what is set here.
///
/// Example YAML:
/// ```yaml
/// table: ~/data/pbev-2023.csv
/// delimiter: ";"
/// profile: 2
/// page_size: 50
/// fuzzy_threshold: 75
/// columns:
///   co2_gasoline: ["co2 gas"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default vehicle table; a leading `~` is expanded on load
    #[serde(default)]
    pub table: Option<PathBuf>,

    /// Field delimiter of the table file (a single byte, default ",")
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Weight profile used when `--profile` is not given
    #[serde(default = "default_profile")]
    pub profile: u8,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Minimum similarity (0-100) for a fuzzy substitution
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Extra header spellings, keyed by field name (e.g. `co2_gasoline`)
    #[serde(default)]
    pub columns: HashMap<String, Vec<String>>,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_profile() -> u8 {
    DEFAULT_PROFILE
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table: None,
            delimiter: default_delimiter(),
            profile: default_profile(),
            page_size: default_page_size(),
            fuzzy_threshold: default_fuzzy_threshold(),
            columns: HashMap::new(),
        }
    }
}

impl Config {
    /// Loader options for this configuration. Unknown field names and
    /// multi-byte delimiters are rejected by `validate_config` beforehand;
    /// here they are skipped or replaced by ",".
    pub fn load_options(&self) -> LoadOptions {
        let delimiter = match self.delimiter.as_bytes() {
            [byte] => *byte,
            _ => b',',
        };
        let extra_columns = self
            .columns
            .iter()
            .filter_map(|(name, spellings)| Field::from_name(name).map(|f| (f, spellings.clone())))
            .collect();
        LoadOptions {
            delimiter,
            extra_columns,
        }
    }
}
