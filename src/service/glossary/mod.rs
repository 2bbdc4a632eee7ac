pub mod http;

use std::{collections::BTreeMap, ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;

use crate::base::types::Res;

// Traits.

/// Generic glossary source trait.
///
/// Implementations fetch the whole glossary on every call; there is no caching.
#[async_trait]
pub trait GenericGlossarySource: Send + Sync + 'static {
    /// Fetch and parse the glossary.
    async fn fetch(&self) -> Res<Glossary>;
}

// Structs.

/// Glossary client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct GlossaryClient {
    inner: Arc<dyn GenericGlossarySource>,
}

impl Deref for GlossaryClient {
    type Target = dyn GenericGlossarySource;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl GlossaryClient {
    pub fn new(inner: Arc<dyn GenericGlossarySource>) -> Self {
        Self { inner }
    }
}

// Data types.

/// The glossary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Glossary {
    #[serde(default)]
    pub entries: BTreeMap<String, GlossaryEntry>,
}

/// A single glossary entry, either a term with a description or an acronym
/// that expands to one or more terms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlossaryEntry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub term: Option<Expansion>,
}

/// What an acronym stands for.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expansion {
    One(String),
    Many(Vec<String>),
}

impl Expansion {
    fn terms(&self) -> Vec<&str> {
        match self {
            Expansion::One(term) => vec![term.as_str()],
            Expansion::Many(terms) => terms.iter().map(String::as_str).collect(),
        }
    }
}

impl GlossaryEntry {
    fn is_acronym(&self) -> bool {
        self.kind.as_deref().is_some_and(|k| k.eq_ignore_ascii_case("acronym")) || self.term.is_some()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}

impl Glossary {
    /// Parse a glossary from its YAML representation.
    pub fn from_yaml(text: &str) -> Res<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Case-insensitive exact match over the entry keys.
    ///
    /// Returns the key as written in the glossary along with its entry.
    pub fn find(&self, term: &str) -> Option<(&str, &GlossaryEntry)> {
        let needle = term.trim().to_lowercase();

        self.entries.iter().find(|(key, _)| key.to_lowercase() == needle).map(|(key, entry)| (key.as_str(), entry))
    }

    /// Formats the definition of `term`, or `None` when it is not in the glossary.
    pub fn define(&self, term: &str) -> Option<String> {
        let (key, entry) = self.find(term)?;

        if !entry.is_acronym() {
            return Some(match entry.description() {
                Some(description) => format!("*{key}*: {description}"),
                None => format!("*{key}* is in the glossary, but it has no definition yet."),
            });
        }

        let expansions = entry.term.as_ref().map(Expansion::terms).unwrap_or_default();

        let lines = expansions.iter().map(|expansion| match self.find(expansion).and_then(|(_, e)| e.description()) {
            Some(description) => format!("_{expansion}_: {description}"),
            None => format!("_{expansion}_"),
        });

        let definition = match expansions.len() {
            0 => match entry.description() {
                Some(description) => format!("*{key}*: {description}"),
                None => format!("*{key}* is in the glossary, but it has no definition yet."),
            },
            1 => format!("*{key}* means {}", lines.collect::<String>()),
            _ => format!("*{key}* could mean:\n{}", lines.map(|l| format!("• {l}")).collect::<Vec<_>>().join("\n")),
        };

        Some(definition)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    const GLOSSARY: &str = r#"
entries:
  ATO:
    type: acronym
    term: Authority to Operate
  Authority to Operate:
    type: term
    description: Formal declaration that a system may be used in production.
  PIA:
    type: acronym
    term:
      - Privacy Impact Assessment
      - Presidential Innovation Fellow Alumni
  Privacy Impact Assessment:
    type: term
    description: An analysis of how personal information is handled.
  Sprint:
    type: term
"#;

    fn glossary() -> Glossary {
        Glossary::from_yaml(GLOSSARY).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let glossary = glossary();

        assert_eq!(glossary.define("ATO"), glossary.define("ato"));
        assert_eq!(glossary.define("aTo"), glossary.define("  ATO "));
        assert!(glossary.define("ato").is_some());
    }

    #[test]
    fn test_acronym_includes_expansion_description() {
        let definition = glossary().define("ato").unwrap();

        assert_eq!(
            definition,
            "*ATO* means _Authority to Operate_: Formal declaration that a system may be used in production."
        );
    }

    #[test]
    fn test_acronym_with_several_expansions() {
        let definition = glossary().define("pia").unwrap();

        assert!(definition.starts_with("*PIA* could mean:\n"));
        assert!(definition.contains("• _Privacy Impact Assessment_: An analysis"));
        assert!(definition.contains("• _Presidential Innovation Fellow Alumni_"));
    }

    #[test]
    fn test_term_without_description() {
        let definition = glossary().define("sprint").unwrap();

        assert_eq!(definition, "*Sprint* is in the glossary, but it has no definition yet.");
    }

    #[test]
    fn test_unknown_term() {
        assert!(glossary().define("kanban").is_none());
    }

    #[test]
    fn test_partial_matches_do_not_count() {
        assert!(glossary().define("authority").is_none());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(Glossary::from_yaml("entries: [unterminated").is_err());
    }
}
