//! Review instruction block sent ahead of every diff.

use std::fmt;

use crate::errors::ConfigError;

/// Built-in rules for table-definition YAML changes.
pub const TABLE_DEFINITION_RULES: &str = r#"
You are reviewing GitLab merge requests for table definition YAML files.

VALIDATION RULES:

**Table Name:**
- Must be lowercase, snake_case (e.g., customer_orders, sales_data_2024)
- Must start with letter/number (not underscore)
- No spaces, hyphens, uppercase, or special characters except underscore
- Must be descriptive (not "a", "test", "table1")
- Cannot be SQL reserved words

**Namespace:**
- Must be lowercase, snake_case
- No spaces, hyphens, uppercase, or special characters except underscore
- Must start with letter/number

**Columns (Schema Fields):**
- Field names must follow snake_case convention
- Must be lowercase, descriptive
- No spaces, hyphens, uppercase in field names

OUTPUT FORMAT (use EXACTLY this format, keep it SHORT):

```
🔍 Code Review Summary

Table Name Check: [PASS / FAIL]
Reason: [one line reason if FAIL, or "OK" if PASS]

Namespace Check: [PASS / FAIL]
Reason: [one line reason if FAIL, or "OK" if PASS]

Column Check: [PASS / FAIL]
Reason: [one line reason if FAIL, or "OK" if PASS]

Action: [APPROVE / REQUEST CHANGES]
```

IMPORTANT:
- Keep output SHORT and CONCISE - one line per check
- Only include reasons if there are failures
- If all checks PASS, use "OK" for reasons
- Block merge if ANY check FAILS
"#;

/// Non-empty, trimmed instruction text. Loaded once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet(String);

impl RuleSet {
    /// Wraps custom instruction text.
    ///
    /// # Errors
    /// [`ConfigError::EmptyRules`] if `text` is blank.
    pub fn new(text: impl AsRef<str>) -> Result<Self, ConfigError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyRules);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The table-definition naming rules.
    pub fn builtin() -> Self {
        Self(TABLE_DEFINITION_RULES.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_rules_are_rejected() {
        assert_eq!(RuleSet::new(" \n\t"), Err(ConfigError::EmptyRules));
    }

    #[test]
    fn builtin_rules_are_trimmed_and_mention_every_check() {
        let rules = RuleSet::builtin();
        assert!(rules.as_str().starts_with("You are reviewing"));
        for check in ["Table Name Check", "Namespace Check", "Column Check", "Action:"] {
            assert!(rules.as_str().contains(check), "missing {check}");
        }
    }
}
