// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metadata selection over record attributes.
//!
//! Attribute keys matching at least one configured pattern are *metadata*: they
//! form the record's [`Fields`] (sent as `X-Sumo-Fields` and used as the batching
//! key) and are stripped from JSON lines. The remaining keys are *payload*.

use std::collections::BTreeMap;

use derive_more::{Display, Into};
use regex::Regex;

use crate::attribute::Attributes;
use crate::error::ConfigError;

/// Canonical metadata string of a record: sorted `key=value` pairs joined by `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display, Into)]
pub struct Fields(String);

impl Fields {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Fields {
    fn from(value: &str) -> Self {
        Fields(value.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    regexes: Vec<Regex>,
}

impl MetadataFilter {
    /// Compiles the patterns, failing on the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let regexes = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MetadataFilter { regexes })
    }

    fn is_metadata(&self, key: &str) -> bool {
        self.regexes.iter().any(|regex| regex.is_match(key))
    }

    /// Metadata attributes, rendered to strings.
    #[must_use]
    pub fn filter(&self, attributes: &Attributes) -> BTreeMap<String, String> {
        attributes
            .iter()
            .filter(|(key, _)| self.is_metadata(key))
            .map(|(key, value)| (key.clone(), value.to_metadata_string()))
            .collect()
    }

    /// Payload attributes, rendered to strings.
    #[must_use]
    pub fn filter_out(&self, attributes: &Attributes) -> BTreeMap<String, String> {
        attributes
            .iter()
            .filter(|(key, _)| !self.is_metadata(key))
            .map(|(key, value)| (key.clone(), value.to_metadata_string()))
            .collect()
    }

    #[must_use]
    pub fn fields(&self, attributes: &Attributes) -> Fields {
        let mut metadata: Vec<String> = self
            .filter(attributes)
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        // sort on the whole pair, not on the key alone
        metadata.sort();

        Fields(metadata.join(", "))
    }
}
