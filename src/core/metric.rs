//! Metric values and sentinel markers recorded by the result store.
//!
//! Every stored value is one of the `MetricValue` variants. The string
//! rendering used for persistence lives here too, so the JSON document a
//! benchmark run writes can be parsed back into the same values.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Reserved markers stored in place of a measurement to record why no real
/// value exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Deadline exceeded; the collaborator may still be running
    Timeout,
    /// The collaborator raised
    Error,
    /// A gating precondition failed (the model is not sound)
    NotSound,
    /// The collaborator flagged too many samples as untrustworthy
    Unreliable,
    /// The collaborator returned no usable output without erroring
    NullResult,
    /// Never computed
    Unknown,
    /// Mathematically degenerate combination
    ErrorValue,
}

impl Sentinel {
    /// Canonical marker string written to the result document
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::Timeout => "TIMEOUT",
            Sentinel::Error => "ERROR",
            Sentinel::NotSound => "ERROR-NOT-SOUND",
            Sentinel::Unreliable => "ERROR-UNRELIABLE",
            Sentinel::NullResult => "ERROR-NULL",
            Sentinel::Unknown => "-UNKNOWN",
            Sentinel::ErrorValue => "ERROR-VALUE",
        }
    }

    /// Parse a canonical marker string back into its sentinel
    pub fn parse(s: &str) -> Option<Sentinel> {
        match s {
            "TIMEOUT" => Some(Sentinel::Timeout),
            "ERROR" => Some(Sentinel::Error),
            "ERROR-NOT-SOUND" => Some(Sentinel::NotSound),
            "ERROR-UNRELIABLE" => Some(Sentinel::Unreliable),
            "ERROR-NULL" => Some(Sentinel::NullResult),
            "-UNKNOWN" => Some(Sentinel::Unknown),
            "ERROR-VALUE" => Some(Sentinel::ErrorValue),
            _ => None,
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value stored under a (dataset, run, metric) key.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A plain measurement
    Number(f64),
    /// An elapsed time, rendered as `"<n> ms"`
    DurationMs(i64),
    /// Raw per-fold scores kept next to their reduced statistic
    Series(Vec<f64>),
    /// A status label such as `"sound"` or `"alignment-based"`
    Label(String),
    /// A reserved marker recording why no measurement exists
    Sentinel(Sentinel),
}

impl MetricValue {
    /// Label constructor that spares callers the `to_string` dance
    pub fn label(s: impl Into<String>) -> Self {
        MetricValue::Label(s.into())
    }

    /// True when the value is the UNKNOWN sentinel
    pub fn is_unknown(&self) -> bool {
        matches!(self, MetricValue::Sentinel(Sentinel::Unknown))
    }

    /// Numeric view used by the cross-fold reducer. Sentinels and labels
    /// have no numeric reading and make the fold count as a parse failure.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::DurationMs(ms) => Some(*ms as f64),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::DurationMs(ms) => write!(f, "{ms} ms"),
            MetricValue::Series(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            MetricValue::Label(s) => f.write_str(s),
            MetricValue::Sentinel(s) => f.write_str(s.as_str()),
        }
    }
}

impl From<Sentinel> for MetricValue {
    fn from(s: Sentinel) -> Self {
        MetricValue::Sentinel(s)
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MetricValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            // serde_json cannot represent non-finite numbers
            MetricValue::Number(_) => serializer.serialize_str("NaN"),
            MetricValue::DurationMs(ms) => serializer.serialize_str(&format!("{ms} ms")),
            MetricValue::Series(values) => values.serialize(serializer),
            MetricValue::Label(s) => serializer.serialize_str(s),
            MetricValue::Sentinel(s) => serializer.serialize_str(s.as_str()),
        }
    }
}

fn parse_string_value(s: &str) -> MetricValue {
    if let Some(sentinel) = Sentinel::parse(s) {
        return MetricValue::Sentinel(sentinel);
    }
    if s == "NaN" {
        return MetricValue::Number(f64::NAN);
    }
    if let Some(prefix) = s.strip_suffix(" ms") {
        if let Ok(ms) = prefix.parse::<i64>() {
            return MetricValue::DurationMs(ms);
        }
    }
    MetricValue::Label(s.to_string())
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = MetricValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number, a string, or an array of numbers")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<MetricValue, E> {
                Ok(MetricValue::Number(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<MetricValue, E> {
                Ok(MetricValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<MetricValue, E> {
                Ok(MetricValue::Number(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<MetricValue, E> {
                Ok(parse_string_value(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<MetricValue, A::Error> {
                let mut values = Vec::new();
                while let Some(v) = seq.next_element::<f64>()? {
                    values.push(v);
                }
                Ok(MetricValue::Series(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
