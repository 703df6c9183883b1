//! Canonical Form
//!
//! Turns an argument list into a JSON value that is stable across calls and
//! process restarts. Every occurrence of a shared node after the first, cyclic
//! or not, is replaced by a path marker pointing at its first occurrence, so
//! each distinct node is written once.

use std::collections::HashMap;

use serde_json::Value;

use super::Arg;

/// Written in place of an error argument.
pub const ERROR_MARKER: &str = "[Error]";

/// Written in place of a pending computation.
pub const PENDING_MARKER: &str = "[Promise]";

/// Prefix of every cycle marker. `"~"` alone points at the root.
const CYCLE_MARKER: char = '~';

/// Escape for literal strings that would otherwise read as a marker.
const LITERAL_ESCAPE: char = '\\';

// == Canonicalizer ==
/// Depth-first writer carrying its own visited state.
///
/// `seen` maps the identity of every shared node met so far to the marker of
/// its first occurrence. Entries are never removed.
pub(crate) struct Canonicalizer {
    seen: HashMap<usize, String>,
    path: Vec<String>,
    escape_literals: bool,
}

impl Canonicalizer {
    /// Writer used for key derivation.
    pub(crate) fn for_key() -> Self {
        Self {
            seen: HashMap::new(),
            path: Vec::new(),
            escape_literals: true,
        }
    }

    /// Writer for plain JSON views; string literals pass through unchanged.
    pub(crate) fn plain() -> Self {
        Self {
            escape_literals: false,
            ..Self::for_key()
        }
    }

    /// Canonical value of a positional argument list.
    pub(crate) fn args(&mut self, args: &[Arg]) -> Value {
        Value::Array(
            args.iter()
                .enumerate()
                .map(|(i, arg)| self.nested(i.to_string(), arg))
                .collect(),
        )
    }

    pub(crate) fn value(&mut self, arg: &Arg) -> Value {
        match arg {
            Arg::Null => Value::Null,
            Arg::Bool(b) => Value::Bool(*b),
            Arg::Number(n) => Value::Number(n.clone()),
            Arg::String(s) => Value::String(self.literal(s)),
            Arg::List(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.nested(i.to_string(), item))
                    .collect(),
            ),
            Arg::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.nested(k.clone(), v)))
                    .collect(),
            ),
            Arg::Shared(node) => {
                let id = node.id();
                if let Some(marker) = self.seen.get(&id) {
                    return Value::String(marker.clone());
                }
                let marker = self.marker();
                self.seen.insert(id, marker);
                let inner = node.read();
                self.value(&inner)
            }
            Arg::Handle(handle) => Value::String(handle.name().to_string()),
            Arg::Error(_) => Value::String(ERROR_MARKER.to_string()),
            Arg::Pending => Value::String(PENDING_MARKER.to_string()),
        }
    }

    fn nested(&mut self, segment: String, arg: &Arg) -> Value {
        self.path.push(segment);
        let value = self.value(arg);
        self.path.pop();
        value
    }

    fn marker(&self) -> String {
        self.path
            .iter()
            .fold(CYCLE_MARKER.to_string(), |mut marker, segment| {
                marker.push(CYCLE_MARKER);
                marker.push_str(&escape_segment(segment));
                marker
            })
    }

    fn literal(&self, s: &str) -> String {
        if self.escape_literals && s.starts_with(&[CYCLE_MARKER, LITERAL_ESCAPE][..]) {
            format!("{}{}", LITERAL_ESCAPE, s)
        } else {
            s.to_string()
        }
    }
}

fn escape_segment(segment: &str) -> String {
    segment.replace('%', "%25").replace(CYCLE_MARKER, "%7E")
}

/// Canonical text of an argument list, as hashed into the key digest.
pub fn canonical_text(args: &[Arg]) -> String {
    Canonicalizer::for_key().args(args).to_string()
}
