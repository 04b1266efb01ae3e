//! Flat `key = value` property bag with light type coercion.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Ordered string properties.
///
/// Keys are case-sensitive. Values are stored trimmed and converted on
/// access; getters return `Ok(None)` for absent keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    map: BTreeMap<String, String>,
}

/// Split a list value on commas and/or whitespace, ignoring enclosing
/// brackets.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse property-file text. Blank lines and lines starting with `#` or
    /// `!` are ignored; the first `=` or `:` separates key from value.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MalformedLine`] for a line without a separator.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut props = Self::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            props
                .set_line(line)
                .map_err(|_| ConfigError::MalformedLine {
                    line: i + 1,
                    text: line.to_string(),
                })?;
        }
        Ok(props)
    }

    /// Read and parse a property file.
    ///
    /// # Errors
    ///
    /// I/O and parse failures.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let props = Self::parse(&text)?;
        log::info!("Loaded {} properties from {}", props.len(), path.display());
        Ok(props)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.map
            .insert(key.into().trim().to_string(), value.to_string().trim().to_string());
    }

    /// Set from a single `key = value` (or `key: value`) string.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MalformedLine`] without a separator or with an empty
    /// key.
    pub fn set_line(&mut self, line: &str) -> Result<(), ConfigError> {
        let malformed = || ConfigError::MalformedLine {
            line: 1,
            text: line.to_string(),
        };
        let at = line.find(['=', ':']).ok_or_else(malformed)?;
        let key = line[..at].trim();
        if key.is_empty() {
            return Err(malformed());
        }
        self.set(key, &line[at + 1..]);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] when absent.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Parse the value of `key` with `FromStr`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] when the value does not parse.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key)
            .map(|v| v.parse::<T>().map_err(|e| ConfigError::invalid(key, v, e.to_string())))
            .transpose()
    }

    /// # Errors
    ///
    /// Unparseable or non-finite value.
    pub fn get_f64(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        match self.get_parsed::<f64>(key)? {
            Some(x) if !x.is_finite() => Err(ConfigError::invalid(
                key,
                self.get(key).unwrap_or_default(),
                "not a finite number",
            )),
            other => Ok(other),
        }
    }

    /// # Errors
    ///
    /// Unparseable value.
    pub fn get_usize(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        self.get_parsed(key)
    }

    /// Accepts `true`/`false`, `yes`/`no`, `on`/`off` and `1`/`0`.
    ///
    /// # Errors
    ///
    /// Any other value.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|v| match v.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(ConfigError::invalid(key, v, "expected a boolean")),
            })
            .transpose()
    }

    /// A list separated by commas and/or whitespace, optionally bracketed.
    ///
    /// # Errors
    ///
    /// Any element that does not parse.
    pub fn get_list<T>(&self, key: &str) -> Result<Option<Vec<T>>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key)
            .map(|v| {
                split_list(v)
                    .map(|item| {
                        item.parse::<T>()
                            .map_err(|e| ConfigError::invalid(key, v, format!("'{item}': {e}")))
                    })
                    .collect()
            })
            .transpose()
    }

    /// # Errors
    ///
    /// Unparseable or non-finite element.
    pub fn get_f64_list(&self, key: &str) -> Result<Option<Vec<f64>>, ConfigError> {
        let list = self.get_list::<f64>(key)?;
        if list.as_ref().is_some_and(|l| l.iter().any(|x| !x.is_finite())) {
            return Err(ConfigError::invalid(
                key,
                self.get(key).unwrap_or_default(),
                "not a finite number",
            ));
        }
        Ok(list)
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.map {
            writeln!(f, "{k} = {v}")?;
        }
        Ok(())
    }
}
