//! Rule system for code analysis
//!
//! A rule is invoked once for every node the walker visits and decides for
//! itself which node kinds it cares about.

pub mod function_length;
pub mod magic_numbers;
pub mod parameter_count;

pub use function_length::FunctionLength;
pub use magic_numbers::MagicNumbers;
pub use parameter_count::ParameterCount;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{RulesConfig, limit};
use crate::syntax::SyntaxNode;
use crate::walker::RuleContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn level(&self) -> u8 {
        match self {
            Severity::Error => 4,
            Severity::Warning => 3,
            Severity::Info => 2,
            Severity::Hint => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub examples: Option<&'static str>,
}

pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    /// Called for every visited node, parents before children. Must not
    /// assume anything about the node kind.
    fn inspect(&self, ctx: &mut RuleContext<'_>, node: &SyntaxNode);
}

pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    disabled_rules: HashSet<String>,
    severity_overrides: HashMap<String, Severity>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
        }
    }

    /// Registry holding the three built-in rules with the thresholds from
    /// `config`.
    pub fn with_builtin_rules(config: &RulesConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ParameterCount::new(limit(config.params.max))));
        registry.register(Arc::new(FunctionLength::new(limit(
            config.function_length.max_lines,
        ))));
        registry.register(Arc::new(MagicNumbers::new(&config.magic_numbers.ignore)));
        registry.configure(config);
        registry
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn configure(&mut self, config: &RulesConfig) {
        self.disabled_rules.clear();
        self.severity_overrides.clear();

        for rule_ref in &config.disabled {
            self.disabled_rules.insert(rule_ref.clone());
        }

        for (rule_ref, severity_value) in &config.severity {
            self.severity_overrides
                .insert(rule_ref.clone(), (*severity_value).into());
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Enabled rules in registration order.
    pub fn enabled_rules(&self) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|rule| !self.is_rule_disabled(rule.metadata()))
            .cloned()
            .collect()
    }

    fn is_rule_disabled(&self, metadata: &RuleMetadata) -> bool {
        self.disabled_rules.contains(metadata.id) || self.disabled_rules.contains(metadata.name)
    }

    pub fn effective_severity(&self, rule: &dyn Rule) -> Severity {
        let metadata = rule.metadata();
        self.severity_overrides
            .get(metadata.id)
            .or_else(|| self.severity_overrides.get(metadata.name))
            .copied()
            .unwrap_or(metadata.severity)
    }

    pub fn is_rule_enabled(&self, id_or_name: &str) -> bool {
        self.get_rule(id_or_name)
            .or_else(|| self.get_rule_by_name(id_or_name))
            .is_some_and(|rule| !self.is_rule_disabled(rule.metadata()))
    }

    pub fn get_rule(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().id == id)
            .map(|r| r.as_ref())
    }

    pub fn get_rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().name == name)
            .map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtin_rules(&RulesConfig::default())
    }
}

/// Declares the static metadata of a rule type as `Self::METADATA`.
#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        id = $id:literal,
        name = $rule_name:literal,
        description = $desc:literal,
        severity = $sev:ident
        $(, examples = $examples:literal)?
    ) => {
        impl $name {
            pub const METADATA: $crate::rules::RuleMetadata = $crate::rules::RuleMetadata {
                id: $id,
                name: $rule_name,
                description: $desc,
                severity: $crate::rules::Severity::$sev,
                examples: declare_rule!(@examples $($examples)?),
            };
        }
    };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}
