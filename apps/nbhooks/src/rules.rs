//! Issue rules applied to code cells.
//!
//! Rules are a closed, statically ordered set. Each rule pairs a condition
//! with an idempotent fix; evaluation order is `RULES` order on every run so
//! reported issue lists are reproducible.

use crate::error::{Error, Result};
use crate::models::notebook::{CodeCell, PIN_OUTPUT};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    ExecutionCount,
    Outputs,
    Metadata,
    ShowAnswer,
}

/// All rules in evaluation order.
pub const RULES: [Rule; 4] = [
    Rule::ExecutionCount,
    Rule::Outputs,
    Rule::Metadata,
    Rule::ShowAnswer,
];

impl Rule {
    pub fn statement(self) -> &'static str {
        match self {
            Rule::ExecutionCount => "Cell has a non-null execution count",
            Rule::Outputs => "Cell contains outputs",
            Rule::Metadata => "Cell contains disallowed metadata",
            Rule::ShowAnswer => "Cell has an active show_answer directive",
        }
    }

    pub fn applies(self, cell: &CodeCell, policy: &MetadataPolicy) -> bool {
        match self {
            Rule::ExecutionCount => cell.execution_count.is_some() && !cell.is_pinned(),
            Rule::Outputs => !cell.outputs.is_empty() && !cell.is_pinned(),
            Rule::Metadata => policy.violated_by(cell),
            Rule::ShowAnswer => cell.source.text().split('\n').any(|l| answer_re().is_match(l)),
        }
    }

    pub fn fix(self, cell: &mut CodeCell, policy: &MetadataPolicy) {
        match self {
            Rule::ExecutionCount => cell.execution_count = None,
            Rule::Outputs => cell.outputs.clear(),
            Rule::Metadata => policy.fix(cell),
            Rule::ShowAnswer => {
                let fixed = cell
                    .source
                    .text()
                    .split('\n')
                    .map(|l| answer_re().replace(l, "${indent}#show_answer").into_owned())
                    .collect::<Vec<_>>()
                    .join("\n");
                cell.source.set_text(fixed);
            }
        }
    }
}

fn answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<indent> *)show_answer").expect("static regex"))
}

/// Which metadata keys a code cell may carry. Exactly one mode per run.
#[derive(Debug, Clone, Default)]
pub enum MetadataPolicy {
    /// Metadata is never checked.
    #[default]
    Unrestricted,
    /// Keys matching the pattern make the cell dirty; the fix clears all metadata.
    Deny(Regex),
    /// Keys must match one of the patterns (`pin_output` always passes);
    /// the fix drops every other key.
    Allow(Vec<Regex>),
}

impl MetadataPolicy {
    /// Build a deny policy. An empty pattern means unrestricted.
    pub fn deny(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(MetadataPolicy::Unrestricted);
        }
        Ok(MetadataPolicy::Deny(compile_prefix(pattern)?))
    }

    pub fn allow<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| compile_prefix(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(MetadataPolicy::Allow(compiled))
    }

    fn is_allowed(&self, key: &str) -> bool {
        match self {
            MetadataPolicy::Unrestricted => true,
            MetadataPolicy::Deny(re) => !re.is_match(key),
            MetadataPolicy::Allow(res) => key == PIN_OUTPUT || res.iter().any(|re| re.is_match(key)),
        }
    }

    fn violated_by(&self, cell: &CodeCell) -> bool {
        cell.metadata.keys().any(|k| !self.is_allowed(k))
    }

    fn fix(&self, cell: &mut CodeCell) {
        match self {
            MetadataPolicy::Unrestricted => {}
            MetadataPolicy::Deny(_) => cell.metadata.clear(),
            MetadataPolicy::Allow(_) => cell.metadata.retain(|k, _| self.is_allowed(k)),
        }
    }
}

// Patterns match at the start of the key, like Python's `re.match`.
fn compile_prefix(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fired(cell: &CodeCell, policy: &MetadataPolicy) -> Vec<Rule> {
        RULES
            .iter()
            .copied()
            .filter(|r| r.applies(cell, policy))
            .collect()
    }

    #[test]
    fn test_execution_count_and_outputs_fire_unless_pinned() {
        let mut cell = CodeCell::new("1 + 1");
        cell.execution_count = Some(4);
        cell.outputs.push(json!({"output_type": "execute_result"}));
        let policy = MetadataPolicy::Unrestricted;
        assert_eq!(fired(&cell, &policy), vec![Rule::ExecutionCount, Rule::Outputs]);

        cell.metadata.insert(PIN_OUTPUT.into(), json!(true));
        assert!(fired(&cell, &policy).is_empty());
    }

    #[test]
    fn test_deny_matches_at_key_start() {
        let policy = MetadataPolicy::deny("dummy").unwrap();
        let mut cell = CodeCell::new("");
        cell.metadata.insert("dummy".into(), json!(true));
        assert!(Rule::Metadata.applies(&cell, &policy));

        let policy = MetadataPolicy::deny("xyz").unwrap();
        assert!(!Rule::Metadata.applies(&cell, &policy));

        let policy = MetadataPolicy::deny("ummy").unwrap();
        assert!(!Rule::Metadata.applies(&cell, &policy));
    }

    #[test]
    fn test_empty_deny_pattern_is_unrestricted() {
        assert!(matches!(
            MetadataPolicy::deny("").unwrap(),
            MetadataPolicy::Unrestricted
        ));
    }

    #[test]
    fn test_deny_fix_clears_metadata() {
        let policy = MetadataPolicy::deny("scroll").unwrap();
        let mut cell = CodeCell::new("");
        cell.metadata.insert("scrolled".into(), json!(true));
        cell.metadata.insert("tags".into(), json!([]));
        Rule::Metadata.fix(&mut cell, &policy);
        assert!(cell.metadata.is_empty());
        assert!(!Rule::Metadata.applies(&cell, &policy));
    }

    #[test]
    fn test_allow_keeps_listed_keys_and_pin() {
        let policy = MetadataPolicy::allow(&["tags"]).unwrap();
        let mut cell = CodeCell::new("");
        cell.metadata.insert("tags".into(), json!(["x"]));
        cell.metadata.insert(PIN_OUTPUT.into(), json!(true));
        assert!(!Rule::Metadata.applies(&cell, &policy));

        cell.metadata.insert("collapsed".into(), json!(false));
        assert!(Rule::Metadata.applies(&cell, &policy));
        Rule::Metadata.fix(&mut cell, &policy);
        let keys: Vec<&String> = cell.metadata.keys().collect();
        assert_eq!(keys, vec!["tags", PIN_OUTPUT]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = MetadataPolicy::deny("(").unwrap_err();
        assert!(err.to_string().contains("invalid metadata pattern '('"));
    }

    #[test]
    fn test_show_answer_rewrites_only_directive_lines() {
        let mut cell = CodeCell::new("x = 1\n  show_answer(q1)\n# show_answer\nshow_answer()");
        let policy = MetadataPolicy::Unrestricted;
        assert!(Rule::ShowAnswer.applies(&cell, &policy));
        Rule::ShowAnswer.fix(&mut cell, &policy);
        assert_eq!(
            cell.source.text(),
            "x = 1\n  #show_answer(q1)\n# show_answer\n#show_answer()"
        );
        assert!(!Rule::ShowAnswer.applies(&cell, &policy));
    }

    #[test]
    fn test_tab_indented_directive_is_not_matched() {
        let cell = CodeCell::new("\tshow_answer()");
        assert!(!Rule::ShowAnswer.applies(&cell, &MetadataPolicy::Unrestricted));
    }

    #[test]
    fn test_fixes_are_idempotent() {
        let policy = MetadataPolicy::allow(&["tags"]).unwrap();
        let mut cell = CodeCell::new("show_answer\n");
        cell.execution_count = Some(1);
        cell.outputs.push(json!({"output_type": "stream", "text": "hi"}));
        cell.metadata.insert("scrolled".into(), json!(true));

        for rule in fired(&cell, &policy) {
            rule.fix(&mut cell, &policy);
        }
        let once = cell.clone();
        assert!(fired(&cell, &policy).is_empty());
        for rule in RULES {
            rule.fix(&mut cell, &policy);
        }
        assert_eq!(cell, once);
    }
}
