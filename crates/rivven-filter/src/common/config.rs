//! Filter configuration
//!
//! Four pattern lists drive every decision:
//!
//! | field          | alias          | scope  | mode  |
//! |----------------|----------------|--------|-------|
//! | `schema_allow` | `do_db`        | schema | allow |
//! | `schema_deny`  | `ignore_db`    | schema | deny  |
//! | `table_allow`  | `do_table`     | table  | allow |
//! | `table_deny`   | `ignore_table` | table  | deny  |
//!
//! Patterns are literal names unless prefixed with `~`, in which case they
//! are regular expressions matched against the whole name.
//!
//! ```yaml
//! schema_allow: ["~^b.*", "s1"]
//! table_allow:
//!   - schema: stest
//!     table: "~^t.*"
//! case_sensitive: true
//! ```

use crate::common::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// Pre-compiled regex for environment variable expansion
/// Pattern: ${VAR} or ${VAR:-default}
static ENV_VAR_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("env var regex pattern is invalid - this is a bug")
});

/// A (schema pattern, table pattern) pair for table-scoped rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePattern {
    /// Schema (database) pattern
    pub schema: String,
    /// Table pattern
    #[serde(alias = "name")]
    pub table: String,
}

impl TablePattern {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

/// Replication filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Schemas to replicate; when non-empty, everything else is skipped
    #[serde(default, alias = "do_db")]
    pub schema_allow: Vec<String>,

    /// Schemas to skip (consulted only when no allow-list is configured)
    #[serde(default, alias = "ignore_db")]
    pub schema_deny: Vec<String>,

    /// Individual tables to replicate
    #[serde(default, alias = "do_table")]
    pub table_allow: Vec<TablePattern>,

    /// Individual tables to skip
    #[serde(default, alias = "ignore_table")]
    pub table_deny: Vec<TablePattern>,

    /// Compare names case-sensitively (MySQL on Linux default)
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            schema_allow: Vec::new(),
            schema_deny: Vec::new(),
            table_allow: Vec::new(),
            table_deny: Vec::new(),
            case_sensitive: true,
        }
    }
}

impl FilterConfig {
    /// Create a new builder.
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text, expanding environment variables
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let config: Self = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Expand environment variables in the format ${VAR} or ${VAR:-default}
    fn expand_env_vars(content: &str) -> String {
        ENV_VAR_REGEX
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                let default = caps.get(2).map(|m| m.as_str());

                std::env::var(var_name).unwrap_or_else(|_| default.unwrap_or("").to_string())
            })
            .to_string()
    }

    /// Reject structurally invalid lists.
    ///
    /// Regex syntax is checked when the rule set compiles.
    pub fn validate(&self) -> Result<()> {
        let schema_lists = [
            ("schema_allow", &self.schema_allow),
            ("schema_deny", &self.schema_deny),
        ];
        for (list, patterns) in schema_lists {
            if let Some(pos) = patterns.iter().position(|p| p.trim().is_empty()) {
                return Err(FilterError::config(format!(
                    "{}[{}] must not be empty",
                    list, pos
                )));
            }
        }

        let table_lists = [
            ("table_allow", &self.table_allow),
            ("table_deny", &self.table_deny),
        ];
        for (list, patterns) in table_lists {
            for (pos, p) in patterns.iter().enumerate() {
                if p.schema.trim().is_empty() || p.table.trim().is_empty() {
                    return Err(FilterError::config(format!(
                        "{}[{}] needs both a schema and a table pattern",
                        list, pos
                    )));
                }
            }
        }

        Ok(())
    }

    /// True when no list is configured, i.e. only system schemas are filtered.
    pub fn is_empty(&self) -> bool {
        self.schema_allow.is_empty()
            && self.schema_deny.is_empty()
            && self.table_allow.is_empty()
            && self.table_deny.is_empty()
    }
}

/// Builder for FilterConfig.
#[derive(Debug, Default)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    /// Allow a schema pattern.
    pub fn allow_schema(mut self, pattern: impl Into<String>) -> Self {
        self.config.schema_allow.push(pattern.into());
        self
    }

    /// Deny a schema pattern.
    pub fn deny_schema(mut self, pattern: impl Into<String>) -> Self {
        self.config.schema_deny.push(pattern.into());
        self
    }

    /// Allow a (schema, table) pattern pair.
    pub fn allow_table(mut self, schema: impl Into<String>, table: impl Into<String>) -> Self {
        self.config.table_allow.push(TablePattern::new(schema, table));
        self
    }

    /// Deny a (schema, table) pattern pair.
    pub fn deny_table(mut self, schema: impl Into<String>, table: impl Into<String>) -> Self {
        self.config.table_deny.push(TablePattern::new(schema, table));
        self
    }

    /// Set case sensitivity for literal and regex patterns.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.config.case_sensitive = case_sensitive;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> FilterConfig {
        self.config
    }
}
