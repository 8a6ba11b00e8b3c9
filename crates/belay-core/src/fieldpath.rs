//! Relaxed field-path parsing and evaluation over JSON documents
//!
//! Paths support dotted field access, numeric bracket indexing, and
//! quoted-string bracket keys for map keys that themselves contain dots:
//!
//! - `status.phase`
//! - `status.conditions[0].type`
//! - `metadata.labels["app.kubernetes.io/name"]`
//!
//! No wildcards. Parsing fails fast; evaluation never fails: a missing key,
//! an out-of-range index, or a type mismatch all resolve to "not found".

use serde_json::Value;

use crate::error::{CoreError, Result};

/// One step of a parsed field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Map key (`metadata.name`, `labels["app.kubernetes.io/name"]`)
    Key(String),
    /// Array index (`conditions[0]`)
    Index(usize),
}

/// A parsed field path into a JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
    expression: String,
}

impl FieldPath {
    /// Parse a path expression
    pub fn parse(expression: &str) -> Result<Self> {
        let err = |message: &str| CoreError::MalformedFieldPath {
            expression: expression.to_string(),
            message: message.to_string(),
        };

        if expression.is_empty() {
            return Err(err("path is empty"));
        }

        let mut segments = Vec::new();
        let chars: Vec<char> = expression.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    if segments.is_empty() {
                        return Err(err("path cannot start with '.'"));
                    }
                    i += 1;
                    let key = read_bare_key(&chars, &mut i).map_err(|m| err(m))?;
                    segments.push(PathSegment::Key(key));
                }
                '[' => {
                    i += 1;
                    segments.push(read_bracket(&chars, &mut i).map_err(|m| err(m))?);
                }
                _ => {
                    if !segments.is_empty() {
                        return Err(err("expected '.' or '[' between segments"));
                    }
                    let key = read_bare_key(&chars, &mut i).map_err(|m| err(m))?;
                    segments.push(PathSegment::Key(key));
                }
            }
        }

        Ok(Self {
            segments,
            expression: expression.to_string(),
        })
    }

    /// The original path expression
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Parsed segments, in traversal order
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Walk the document along this path.
    ///
    /// Returns the value at the path, including an explicit JSON `null`.
    /// Any partial match (missing key, index out of range, type mismatch)
    /// yields `None`.
    pub fn resolve<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Resolve the path and render the leaf as a string.
    ///
    /// Strings render verbatim, numbers and booleans via their canonical
    /// display, objects and arrays as compact JSON. An absent path or an
    /// explicit `null` renders as `None`.
    pub fn resolve_string(&self, doc: &Value) -> Option<String> {
        match self.resolve(doc)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => serde_json::to_string(other).ok(),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression)
    }
}

impl std::str::FromStr for FieldPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Read a bare field name, stopping at '.', '[' or end of input
fn read_bare_key(chars: &[char], i: &mut usize) -> std::result::Result<String, &'static str> {
    let start = *i;
    while *i < chars.len() {
        match chars[*i] {
            '.' | '[' => break,
            ']' => return Err("unmatched ']'"),
            _ => *i += 1,
        }
    }
    if *i == start {
        return Err("empty field name");
    }
    Ok(chars[start..*i].iter().collect())
}

/// Read a bracket body (cursor past '['): a numeric index or a quoted key
fn read_bracket(chars: &[char], i: &mut usize) -> std::result::Result<PathSegment, &'static str> {
    let Some(&first) = chars.get(*i) else {
        return Err("unterminated '['");
    };

    if first == '"' || first == '\'' {
        *i += 1;
        let start = *i;
        while *i < chars.len() && chars[*i] != first {
            *i += 1;
        }
        if *i >= chars.len() {
            return Err("unterminated quoted key");
        }
        let key: String = chars[start..*i].iter().collect();
        if key.is_empty() {
            return Err("empty quoted key");
        }
        *i += 1;
        if chars.get(*i) != Some(&']') {
            return Err("expected ']' after quoted key");
        }
        *i += 1;
        Ok(PathSegment::Key(key))
    } else {
        let start = *i;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
        if *i == start {
            return Err("expected index or quoted key after '['");
        }
        if chars.get(*i) != Some(&']') {
            return Err("expected ']' after index");
        }
        let digits: String = chars[start..*i].iter().collect();
        *i += 1;
        let idx: usize = digits.parse().map_err(|_| "index out of range")?;
        Ok(PathSegment::Index(idx))
    }
}
