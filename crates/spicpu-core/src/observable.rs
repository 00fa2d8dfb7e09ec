//! Read-only inspection of component state.
//!
//! Queries never affect simulation state. Paths are dot-separated
//! (`core.a`, `core.bus.state`); each component documents its own set.

use std::collections::BTreeMap;
use std::fmt;

/// A dynamically-typed value returned by a state query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    /// A single line or flag.
    Bool(bool),
    /// 8-bit register.
    U8(u8),
    /// 16-bit register (program counter, bus address).
    U16(u16),
    /// Counters.
    U64(u64),
    /// State-machine names and other labels.
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query one property by path. `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// Every path `query()` answers.
    fn query_paths(&self) -> &'static [&'static str];

    /// Query every known path at once, ordered by path.
    fn snapshot(&self) -> BTreeMap<&'static str, Value> {
        self.query_paths()
            .iter()
            .filter_map(|&path| self.query(path).map(|v| (path, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch {
        q: u8,
        en: bool,
    }

    impl Observable for Latch {
        fn query(&self, path: &str) -> Option<Value> {
            match path {
                "q" => Some(self.q.into()),
                "en" => Some(self.en.into()),
                _ => None,
            }
        }

        fn query_paths(&self) -> &'static [&'static str] {
            &["q", "en", "missing"]
        }
    }

    #[test]
    fn snapshot_skips_unanswered_paths() {
        let latch = Latch { q: 0x3F, en: true };
        let snap = latch.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap["q"], Value::U8(0x3F));
        assert_eq!(snap["en"], Value::Bool(true));
    }

    #[test]
    fn display_uses_hex_for_registers() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0x1234).to_string(), "0x1234");
        assert_eq!(Value::Bool(false).to_string(), "0");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&Value::U16(3)).expect("serialize");
        assert_eq!(json, "3");
        let json = serde_json::to_string(&Value::from("Idle")).expect("serialize");
        assert_eq!(json, "\"Idle\"");
    }
}
