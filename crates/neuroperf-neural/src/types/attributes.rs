// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Attribute lists: the ordered `(key, value)` pairs a description block
//! carries.
//!
//! Builders scan these lists for the keys they understand and ignore the
//! rest, so one list can feed several consumers (a soma block configures both
//! the soma unit's cost constants and the model behind it). Malformed numeric
//! values abort configuration; unknown keys never do.

use super::error::{ConfigError, ConfigResult};

/// One `key=value` pair from a description block.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn parse_f64(&self) -> ConfigResult<f64> {
        self.value.parse::<f64>().map_err(|_| self.malformed())
    }

    pub fn parse_u32(&self) -> ConfigResult<u32> {
        self.value.parse::<u32>().map_err(|_| self.malformed())
    }

    pub fn parse_usize(&self) -> ConfigResult<usize> {
        self.value.parse::<usize>().map_err(|_| self.malformed())
    }

    /// Booleans accept `true`/`True`/`1` and `false`/`False`/`0`.
    pub fn parse_bool(&self) -> ConfigResult<bool> {
        match self.value.as_str() {
            "true" | "True" | "1" => Ok(true),
            "false" | "False" | "0" => Ok(false),
            _ => Err(self.malformed()),
        }
    }

    fn malformed(&self) -> ConfigError {
        ConfigError::MalformedValue {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// Ordered attribute list for one description block.
pub type AttributeList = Vec<Attribute>;

/// First attribute with the given key, if present.
pub fn find_attr<'a>(attrs: &'a [Attribute], key: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| a.key == key)
}
