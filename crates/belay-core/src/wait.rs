//! Wait policies and conditions evaluated against remote object state

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::fieldpath::FieldPath;

/// How long and how often a condition is re-checked.
///
/// A zero timeout means "check exactly once, no retries". The poll interval
/// is always honored in full: when the remaining budget is shorter than one
/// interval, the last check happens at or after the deadline rather than
/// being skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitPolicy {
    /// Total budget for the wait
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Pause between checks
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// A one-shot policy: a single check, no sleeping
    pub fn once() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: default_poll_interval(),
        }
    }

    /// Whether this policy performs exactly one check
    pub fn is_one_shot(&self) -> bool {
        self.timeout.is_zero()
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

/// A single post-apply condition: a field path into the remote object, plus
/// (optionally) the exact value it must reach.
///
/// Deserializes from the `{path, value, timeout, poll_interval}` tuples the
/// configuration layer hands over, with humantime durations ("30s", "5m").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitCondition {
    /// Field path into the remote object (`status.phase`,
    /// `status.conditions[0].type`)
    pub path: String,

    /// Exact value to wait for; `None` waits for any non-empty value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Budget and cadence for this condition
    #[serde(flatten)]
    pub policy: WaitPolicy,
}

impl WaitCondition {
    /// Condition satisfied by any non-empty value at `path`
    pub fn new(path: impl Into<String>, policy: WaitPolicy) -> Self {
        Self {
            path: path.into(),
            value: None,
            policy,
        }
    }

    /// Require an exact value at the path
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Parse the path expression.
    ///
    /// This is where a malformed expression surfaces - before any network
    /// I/O is attempted on its behalf.
    pub fn compile(&self) -> Result<CompiledCondition> {
        Ok(CompiledCondition {
            path: FieldPath::parse(&self.path)?,
            value: self.value.clone(),
            policy: self.policy,
        })
    }
}

/// A condition whose path has been parsed; evaluation cannot fail.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    path: FieldPath,
    value: Option<String>,
    policy: WaitPolicy,
}

impl CompiledCondition {
    /// The original path expression
    pub fn path(&self) -> &str {
        self.path.expression()
    }

    /// Budget and cadence for this condition
    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Evaluate the condition against one observation of the remote object.
    ///
    /// With an expected value, the rendered leaf must match it exactly.
    /// Without one, any non-null, non-empty value satisfies the condition.
    pub fn is_satisfied(&self, doc: &Value) -> bool {
        match self.path.resolve_string(doc) {
            Some(actual) => match &self.value {
                Some(expected) => actual == *expected,
                None => !actual.is_empty(),
            },
            None => false,
        }
    }
}
