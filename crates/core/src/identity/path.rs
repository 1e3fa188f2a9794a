//! Path-based identity for nested records
//!
//! Supported expression forms:
//! - `$.a.b`, `a.b` (root is implicit), `$['a']`, `$["a b"]`
//! - `[0]` array index, `[*]` / `.*` wildcard
//! - `..name`, `..*`, `..[0]` recursive descent
//! - `/a/0/b` JSON Pointer (RFC 6901)
//!
//! Matches come back in document order and the first one is the identity.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::{IdentityExtractor, IdentityKey};
use crate::error::{DeltaError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Name(String),
    Index(usize),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Child(Selector),
    Descendant(Selector),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Steps(Vec<Step>),
    Pointer(String),
}

/// Compiled path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    source: String,
    expr: Expr,
}

impl JsonPath {
    /// All matches, in document order
    pub fn find<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        let steps = match &self.expr {
            Expr::Pointer(pointer) => return root.pointer(pointer).into_iter().collect(),
            Expr::Steps(steps) => steps,
        };

        let mut current = vec![root];
        for step in steps {
            let mut next = Vec::new();
            match step {
                Step::Child(sel) => {
                    for node in current {
                        select(node, sel, &mut next);
                    }
                }
                Step::Descendant(sel) => {
                    let mut nodes = Vec::new();
                    for node in current {
                        collect_descendants(node, &mut nodes);
                    }
                    for node in nodes {
                        select(node, sel, &mut next);
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    /// First match, if any
    pub fn find_first<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.find(root).into_iter().next()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn select<'v>(node: &'v Value, selector: &Selector, out: &mut Vec<&'v Value>) {
    match (selector, node) {
        (Selector::Name(name), Value::Object(map)) => out.extend(map.get(name)),
        (Selector::Index(i), Value::Array(items)) => out.extend(items.get(*i)),
        (Selector::Wildcard, Value::Object(map)) => out.extend(map.values()),
        (Selector::Wildcard, Value::Array(items)) => out.extend(items.iter()),
        _ => {}
    }
}

fn collect_descendants<'v>(node: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(node);
    match node {
        Value::Object(map) => map.values().for_each(|v| collect_descendants(v, out)),
        Value::Array(items) => items.iter().for_each(|v| collect_descendants(v, out)),
        _ => {}
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for JsonPath {
    type Err = DeltaError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| DeltaError::InvalidLocator {
            locator: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty path expression"));
        }
        if trimmed.starts_with('/') {
            return Ok(Self {
                source: s.to_string(),
                expr: Expr::Pointer(trimmed.to_string()),
            });
        }

        let body = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let chars: Vec<char> = body.chars().collect();
        let mut steps = Vec::new();
        let mut pos = 0;

        // `a.b` reads as `$.a.b`
        let implicit_child = !chars.is_empty() && chars[0] != '.' && chars[0] != '[';

        while pos < chars.len() || (implicit_child && steps.is_empty()) {
            let descendant = if implicit_child && steps.is_empty() {
                false
            } else if chars[pos] == '.' {
                pos += 1;
                if pos < chars.len() && chars[pos] == '.' {
                    pos += 1;
                    true
                } else {
                    false
                }
            } else if chars[pos] == '[' {
                false
            } else {
                return Err(invalid(&format!("unexpected '{}' at offset {}", chars[pos], pos)));
            };

            let selector = if pos < chars.len() && chars[pos] == '[' {
                parse_bracket(&chars, &mut pos).map_err(|reason| invalid(&reason))?
            } else {
                let start = pos;
                while pos < chars.len() && !matches!(chars[pos], '.' | '[' | ']') {
                    pos += 1;
                }
                let name: String = chars[start..pos].iter().collect();
                match name.as_str() {
                    "" => return Err(invalid(&format!("missing member name at offset {}", start))),
                    "*" => Selector::Wildcard,
                    _ => Selector::Name(name),
                }
            };

            steps.push(if descendant {
                Step::Descendant(selector)
            } else {
                Step::Child(selector)
            });
        }

        Ok(Self {
            source: s.to_string(),
            expr: Expr::Steps(steps),
        })
    }
}

/// Parse `[*]`, `[12]`, `['name']` or `["name"]` starting at `chars[*pos] == '['`
fn parse_bracket(chars: &[char], pos: &mut usize) -> std::result::Result<Selector, String> {
    let open = *pos;
    *pos += 1;
    let selector = match chars.get(*pos) {
        Some('*') => {
            *pos += 1;
            Selector::Wildcard
        }
        Some(&quote) if quote == '\'' || quote == '"' => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != quote {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err(format!("unterminated string at offset {}", start - 1));
            }
            let name: String = chars[start..*pos].iter().collect();
            *pos += 1;
            Selector::Name(name)
        }
        Some(c) if c.is_ascii_digit() => {
            let start = *pos;
            while *pos < chars.len() && chars[*pos].is_ascii_digit() {
                *pos += 1;
            }
            let digits: String = chars[start..*pos].iter().collect();
            Selector::Index(digits.parse().map_err(|e| format!("bad index '{}': {}", digits, e))?)
        }
        _ => return Err(format!("unsupported selector at offset {}", open)),
    };

    if chars.get(*pos) != Some(&']') {
        return Err(format!("unclosed '[' at offset {}", open));
    }
    *pos += 1;
    Ok(selector)
}

/// Identity extractor for nested records
#[derive(Debug, Clone)]
pub struct PathIdentity {
    path: JsonPath,
}

impl PathIdentity {
    pub fn new(path: JsonPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &JsonPath {
        &self.path
    }
}

impl FromStr for PathIdentity {
    type Err = DeltaError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::new(s.parse()?))
    }
}

impl IdentityExtractor for PathIdentity {
    type Record = Value;

    /// Strings are used verbatim; other values by their compact JSON text
    fn extract(&self, record: &Value) -> Result<IdentityKey> {
        match self.path.find_first(record) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(DeltaError::IdentityNotFound(format!(
                "path '{}' matched nothing",
                self.path
            ))),
        }
    }
}
