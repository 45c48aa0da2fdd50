//! Compiled filter rules
//!
//! A [`RuleSet`] is the compiled form of a [`FilterConfig`]: every pattern is
//! turned into a [`PatternMatcher`] exactly once, and table-scoped lists keep
//! an index of the distinct schema patterns they reference. Once built, a rule
//! set is never mutated; reconfiguration builds a new one.

use super::config::{FilterConfig, TablePattern};
use super::pattern::{PatternMatcher, PatternSet};
use super::Result;

/// Catalog schemas of the source server. Always skipped, before any
/// configured rule is consulted.
pub const SYSTEM_SCHEMAS: &[&str] = &["information_schema", "performance_schema", "mysql", "sys"];

/// Check whether `schema` is one of the server's own catalog schemas.
pub fn is_system_schema(schema: &str) -> bool {
    SYSTEM_SCHEMAS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(schema))
}

/// A compiled (schema, table) rule.
#[derive(Debug, Clone)]
pub struct TableRule {
    schema: PatternMatcher,
    table: PatternMatcher,
}

impl TableRule {
    pub fn compile(pattern: &TablePattern, case_sensitive: bool) -> Result<Self> {
        Ok(Self {
            schema: PatternMatcher::with_case_sensitivity(&pattern.schema, case_sensitive)?,
            table: PatternMatcher::with_case_sensitivity(&pattern.table, case_sensitive)?,
        })
    }

    /// Both the schema and the table pattern must match.
    #[inline]
    pub fn matches(&self, schema: &str, table: &str) -> bool {
        self.schema.matches(schema) && self.table.matches(table)
    }

    pub fn schema_pattern(&self) -> &PatternMatcher {
        &self.schema
    }

    pub fn table_pattern(&self) -> &PatternMatcher {
        &self.table
    }
}

/// Table-scoped rules plus the distinct schema patterns they reference.
#[derive(Debug, Clone, Default)]
pub struct TableRuleList {
    rules: Vec<TableRule>,
    schemas: PatternSet,
}

impl TableRuleList {
    pub fn compile(patterns: &[TablePattern], case_sensitive: bool) -> Result<Self> {
        let mut rules = Vec::with_capacity(patterns.len());
        let mut schemas = PatternSet::new();

        for pattern in patterns {
            let rule = TableRule::compile(pattern, case_sensitive)?;
            if !schemas
                .iter()
                .any(|s| s.pattern() == rule.schema.pattern())
            {
                schemas.push(rule.schema.clone());
            }
            rules.push(rule);
        }

        Ok(Self { rules, schemas })
    }

    /// Some rule matches `(schema, table)`.
    #[inline]
    pub fn matches(&self, schema: &str, table: &str) -> bool {
        self.rules.iter().any(|r| r.matches(schema, table))
    }

    /// Some rule's schema pattern matches `schema`, whatever its table pattern.
    #[inline]
    pub fn references_schema(&self, schema: &str) -> bool {
        self.schemas.matches(schema)
    }

    /// Distinct schema patterns, in first-seen order.
    pub fn schemas(&self) -> &PatternSet {
        &self.schemas
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableRule> {
        self.rules.iter()
    }
}

/// The four compiled rule lists.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    schema_allow: PatternSet,
    schema_deny: PatternSet,
    table_allow: TableRuleList,
    table_deny: TableRuleList,
}

impl RuleSet {
    /// Compile the four lists. Fails on the first pattern that does not compile.
    pub fn build(
        schema_allow: &[String],
        schema_deny: &[String],
        table_allow: &[TablePattern],
        table_deny: &[TablePattern],
        case_sensitive: bool,
    ) -> Result<Self> {
        Ok(Self {
            schema_allow: PatternSet::from_patterns(schema_allow, case_sensitive)?,
            schema_deny: PatternSet::from_patterns(schema_deny, case_sensitive)?,
            table_allow: TableRuleList::compile(table_allow, case_sensitive)?,
            table_deny: TableRuleList::compile(table_deny, case_sensitive)?,
        })
    }

    /// Validate and compile a [`FilterConfig`].
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        config.validate()?;
        Self::build(
            &config.schema_allow,
            &config.schema_deny,
            &config.table_allow,
            &config.table_deny,
            config.case_sensitive,
        )
    }

    pub fn schema_allow(&self) -> &PatternSet {
        &self.schema_allow
    }

    pub fn schema_deny(&self) -> &PatternSet {
        &self.schema_deny
    }

    pub fn table_allow(&self) -> &TableRuleList {
        &self.table_allow
    }

    pub fn table_deny(&self) -> &TableRuleList {
        &self.table_deny
    }

    /// Any allow-list is configured; deny-lists are then ignored.
    pub fn is_allow_mode(&self) -> bool {
        !self.schema_allow.is_empty() || !self.table_allow.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.schema_allow.is_empty()
            && self.schema_deny.is_empty()
            && self.table_allow.is_empty()
            && self.table_deny.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_system_schemas() {
        assert!(is_system_schema("mysql"));
        assert!(is_system_schema("information_schema"));
        assert!(is_system_schema("PERFORMANCE_SCHEMA"));
        assert!(is_system_schema("sys"));
        assert!(!is_system_schema("mysql2"));
        assert!(!is_system_schema(""));
    }

    #[test]
    fn test_table_rule_matches_both_parts() {
        let rule = TableRule::compile(&TablePattern::new("stest", "~^t.*"), true).unwrap();
        assert!(rule.matches("stest", "t"));
        assert!(rule.matches("stest", "t1"));
        assert!(!rule.matches("stest", "log"));
        assert!(!rule.matches("other", "t"));
        assert!(rule.schema_pattern().matches("stest"));
        assert!(rule.table_pattern().is_regex());
    }

    #[test]
    fn test_table_rule_list_schema_index() {
        let list = TableRuleList::compile(
            &[
                TablePattern::new("stest", "log"),
                TablePattern::new("stest", "~^t.*"),
                TablePattern::new("~^arch_.*", "events"),
            ],
            true,
        )
        .unwrap();

        assert_eq!(list.len(), 3);
        // "stest" appears twice but is indexed once
        assert_eq!(list.schemas().len(), 2);
        assert!(list.references_schema("stest"));
        assert!(list.references_schema("arch_2024"));
        assert!(!list.references_schema("s1"));

        assert!(list.matches("stest", "log"));
        assert!(list.matches("arch_2023", "events"));
        assert!(!list.matches("stest", "log2"));
    }

    #[test]
    fn test_build_and_modes() {
        let rules = RuleSet::build(&strings(&["t2"]), &[], &[], &[], true).unwrap();
        assert!(rules.is_allow_mode());
        assert!(!rules.is_empty());

        let rules = RuleSet::build(&[], &strings(&["t2"]), &[], &[], true).unwrap();
        assert!(!rules.is_allow_mode());

        let rules = RuleSet::build(
            &[],
            &[],
            &[TablePattern::new("stest", "log")],
            &[],
            true,
        )
        .unwrap();
        assert!(rules.is_allow_mode());

        assert!(RuleSet::default().is_empty());
    }

    #[test]
    fn test_build_rejects_bad_regex() {
        let result = RuleSet::build(&[], &strings(&["~(unclosed"]), &[], &[], true);
        assert!(result.is_err());

        let result = RuleSet::build(
            &[],
            &[],
            &[],
            &[TablePattern::new("stest", "~[")],
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_validates() {
        let config = FilterConfig::builder().allow_table("", "log").build();
        assert!(RuleSet::from_config(&config).is_err());

        let config = FilterConfig::builder()
            .allow_schema("~^b.*")
            .deny_table("stest", "log")
            .build();
        let rules = RuleSet::from_config(&config).unwrap();
        assert_eq!(rules.schema_allow().len(), 1);
        assert_eq!(rules.table_deny().len(), 1);
        assert!(rules.schema_deny().is_empty());
        assert!(rules.table_allow().is_empty());
    }
}
