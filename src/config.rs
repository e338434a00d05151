//! The runtime configuration surface.
//!
//! The crate does not own a configuration format. Whatever loader the
//! embedding process uses (file, flags, environment) hands the filter's
//! configuration section over as a [`serde_json::Value`], and [`Config`]
//! exposes the three operations resolution needs: the enabled toggle,
//! field presence, and decoding the override fields onto a policy.

use serde::Deserialize;
use serde_json::Value;

use crate::policy::types::{Action, Policy, PolicyError, SyscallGroup};

/// The decodable override surface of a configuration section. Unknown
/// fields (including `enabled`) are the loader's business and are ignored
/// here.
#[derive(Deserialize)]
struct Overrides {
    default_action: Option<Action>,
    syscalls: Option<Vec<SyscallGroup>>,
}

/// A syscall filter configuration section.
#[derive(Debug, Clone)]
pub struct Config {
    value: Value,
}

impl Config {
    /// Wrap a configuration section produced by the embedder's loader.
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The `enabled` toggle. Absent means enabled.
    pub fn enabled(&self) -> bool {
        self.value
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Whether the section carries the named field.
    pub fn has_field(&self, name: &str) -> bool {
        self.value.get(name).is_some()
    }

    /// Decode the `default_action` and `syscalls` override fields onto
    /// `policy`. Fields the section does not set are left as they are;
    /// fields it does set replace the policy's wholesale.
    pub fn unpack(&self, policy: &mut Policy) -> Result<(), PolicyError> {
        let overrides: Overrides =
            serde_json::from_value(self.value.clone()).map_err(PolicyError::Decode)?;

        if let Some(action) = overrides.default_action {
            policy.default_action = action;
        }
        if let Some(groups) = overrides.syscalls {
            policy.syscalls = groups;
        }
        Ok(())
    }
}
