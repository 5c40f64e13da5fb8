//! Label selectors and label arguments
//!
//! A selector is a comma-separated list of requirements, all of which must
//! hold:
//!
//! - `key=value`  label present with that value
//! - `key!=value` label absent or with a different value
//! - `key`        label present
//! - `!key`       label absent

use crate::domain::resources::{Labelled, Labels};
use crate::error::{Error, Result};

/// A single selector requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
    NotExists(String),
}

impl Requirement {
    fn parse(s: &str) -> Result<Self> {
        let req = if let Some((key, value)) = s.split_once("!=") {
            Requirement::NotEquals(valid_key(key, s)?, value.trim().to_string())
        } else if let Some((key, value)) = s.split_once('=') {
            Requirement::Equals(valid_key(key, s)?, value.trim().to_string())
        } else if let Some(key) = s.strip_prefix('!') {
            Requirement::NotExists(valid_key(key, s)?)
        } else {
            Requirement::Exists(valid_key(s, s)?)
        };
        Ok(req)
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        match self {
            Requirement::Equals(k, v) => labels.get(k) == Some(v),
            Requirement::NotEquals(k, v) => labels.get(k) != Some(v),
            Requirement::Exists(k) => labels.contains_key(k),
            Requirement::NotExists(k) => !labels.contains_key(k),
        }
    }
}

fn valid_key(key: &str, selector: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() || key.contains(['=', '!', ' ']) {
        return Err(Error::SelectorParse(selector.to_string()));
    }
    Ok(key.to_string())
}

/// Conjunction of label requirements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    /// Parse every `--selector` value given on the command line
    pub fn from_strings<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let mut requirements = Vec::new();
        for value in values {
            for part in value.as_ref().split(',') {
                let part = part.trim();
                if part.is_empty() {
                    return Err(Error::SelectorParse(value.as_ref().to_string()));
                }
                requirements.push(Requirement::parse(part)?);
            }
        }
        Ok(Self { requirements })
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }

    /// Keep the items whose labels satisfy every requirement
    pub fn filter<T: Labelled>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| self.matches(item.labels()))
            .collect()
    }
}

/// Parse `key=value` label arguments into a label set
pub fn parse_labels<S: AsRef<str>>(values: &[S]) -> Result<Labels> {
    let mut labels = Labels::new();
    for value in values {
        for pair in value.as_ref().split(',').filter(|p| !p.trim().is_empty()) {
            let (key, val) = pair
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| {
                    Error::Argument(format!("invalid label {:?}, expected key=value", pair))
                })?;
            labels.insert(key.trim().to_string(), val.trim().to_string());
        }
    }
    Ok(labels)
}
