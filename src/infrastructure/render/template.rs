//! Mailer template parsing and rendering
//!
//! Supports placeholder syntax:
//! - `${var:name}` - Required value, HTML-escaped on output
//! - `${var:name:default}` - Optional value with a default
//! - `${raw:name}` - Pre-built markup inserted verbatim (may be empty)

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::domain::DomainError;

/// Regex to match placeholders: ${var:name}, ${var:name:default} or ${raw:name}
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{(var|raw):([a-zA-Z0-9][-_a-zA-Z0-9]*)(?::([^}]*))?\}")
        .expect("placeholder pattern is valid")
});

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

impl From<TemplateError> for DomainError {
    fn from(err: TemplateError) -> Self {
        DomainError::render(err.to_string())
    }
}

/// A parsed placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariable {
    pub name: String,
    pub default: Option<String>,
    /// Inserted without escaping
    pub raw: bool,
}

impl TemplateVariable {
    fn is_required(&self) -> bool {
        !self.raw && self.default.is_none()
    }
}

/// A parsed HTML mailer template
#[derive(Debug, Clone)]
pub struct MailerTemplate {
    content: String,
    variables: Vec<TemplateVariable>,
}

impl MailerTemplate {
    /// Parse a template string and extract its placeholders
    pub fn parse(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut variables = Vec::new();
        let mut seen = HashSet::new();

        for cap in PLACEHOLDER_PATTERN.captures_iter(&content) {
            let name = cap[2].to_string();

            if !seen.insert(name.clone()) {
                continue;
            }

            variables.push(TemplateVariable {
                name,
                default: cap.get(3).map(|m| m.as_str().to_string()),
                raw: &cap[1] == "raw",
            });
        }

        Self { content, variables }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &[TemplateVariable] {
        &self.variables
    }

    /// Render with the provided values
    ///
    /// `var` placeholders are HTML-escaped; `raw` ones are inserted as given
    /// and render empty when absent.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .variables
            .iter()
            .find(|v| v.is_required() && !values.contains_key(&v.name))
        {
            return Err(TemplateError::MissingVariable {
                name: missing.name.clone(),
            });
        }

        let rendered = PLACEHOLDER_PATTERN.replace_all(&self.content, |cap: &Captures<'_>| {
            let value = values
                .get(&cap[2])
                .map(String::as_str)
                .or_else(|| cap.get(3).map(|m| m.as_str()))
                .unwrap_or_default();

            if &cap[1] == "raw" {
                value.to_string()
            } else {
                escape_html(value)
            }
        });

        Ok(rendered.into_owned())
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_variables() {
        let template =
            MailerTemplate::parse("${var:first_name} ${var:brand:Realty} ${raw:rows} ${var:first_name}");
        let vars = template.variables();

        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0].name, "first_name");
        assert!(vars[0].is_required());
        assert_eq!(vars[1].default.as_deref(), Some("Realty"));
        assert!(vars[2].raw);
        assert!(!vars[2].is_required());
    }

    #[test]
    fn test_render_escapes_values() {
        let template = MailerTemplate::parse("<p>${var:name}</p>");
        let rendered = template
            .render(&values(&[("name", "O'NEIL & <SONS>")]))
            .unwrap();

        assert_eq!(rendered, "<p>O&#39;NEIL &amp; &lt;SONS&gt;</p>");
    }

    #[test]
    fn test_raw_is_verbatim_and_optional() {
        let template = MailerTemplate::parse("<table>${raw:rows}</table>${raw:banner}");
        let rendered = template
            .render(&values(&[("rows", "<tr><td>1</td></tr>")]))
            .unwrap();

        assert_eq!(rendered, "<table><tr><td>1</td></tr></table>");
    }

    #[test]
    fn test_default_used_when_missing() {
        let template = MailerTemplate::parse("${var:brand:Home Team}");
        assert_eq!(template.render(&HashMap::new()).unwrap(), "Home Team");
        assert_eq!(
            template.render(&values(&[("brand", "Acme")])).unwrap(),
            "Acme"
        );
    }

    #[test]
    fn test_missing_required_variable() {
        let template = MailerTemplate::parse("${var:city}, ${var:state}");
        let err = template.render(&values(&[("city", "BAKERSFIELD")])).unwrap_err();

        assert_eq!(
            err,
            TemplateError::MissingVariable {
                name: "state".to_string()
            }
        );
        let domain: DomainError = err.into();
        assert!(matches!(domain, DomainError::Render { .. }));
    }

    #[test]
    fn test_css_braces_untouched() {
        let template = MailerTemplate::parse("body { margin: 0; } ${var:x}");
        assert_eq!(
            template.render(&values(&[("x", "1")])).unwrap(),
            "body { margin: 0; } 1"
        );
    }
}
