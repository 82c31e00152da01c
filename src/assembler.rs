//! Composite credential assembly and canonical serialization.

use std::collections::{BTreeMap, BTreeSet};

/// Separator token joining composite components in the canonical wire
/// form. Chosen to be vanishingly unlikely inside credential text.
pub const SEPARATOR: &str = ";-|";

/// Marker for the length-prefixed fallback encoding, used when a
/// component would collide with the separator.
const LENGTH_PREFIXED_TAG: &str = "lp1:";

/// An ordered combination of field values forming one verifiable
/// candidate. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Composite {
    values: Vec<String>,
}

impl Composite {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self, index: usize) -> &str {
        &self.values[index]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical serialization: the sole input needed to reconstruct
    /// the composite without re-scanning.
    ///
    /// Single-field composites serialize to the bare value. Multi-field
    /// composites join with [`SEPARATOR`]. When a component contains
    /// the separator (or the result would masquerade as the fallback
    /// form), an explicit count+length encoding is used instead so the
    /// round trip holds unconditionally.
    pub fn serialize(&self) -> String {
        let plain = if self.values.len() == 1 {
            self.values[0].clone()
        } else {
            self.values.join(SEPARATOR)
        };

        let collides = self.values.len() > 1 && self.values.iter().any(|v| v.contains(SEPARATOR));
        if collides || plain.starts_with(LENGTH_PREFIXED_TAG) {
            self.serialize_length_prefixed()
        } else {
            plain
        }
    }

    fn serialize_length_prefixed(&self) -> String {
        let mut out = format!("{}{}", LENGTH_PREFIXED_TAG, self.values.len());
        for value in &self.values {
            out.push(':');
            out.push_str(&value.len().to_string());
            out.push(':');
            out.push_str(value);
        }
        out
    }

    /// Reconstruct a composite from its canonical form. Returns `None`
    /// when the input does not split into `expected` components.
    pub fn parse(serialized: &str, expected: usize) -> Option<Composite> {
        if let Some(rest) = serialized.strip_prefix(LENGTH_PREFIXED_TAG) {
            return Self::parse_length_prefixed(rest, expected);
        }

        if expected == 1 {
            return Some(Composite::single(serialized));
        }

        let parts: Vec<&str> = serialized.split(SEPARATOR).collect();
        if parts.len() != expected {
            return None;
        }
        Some(Composite::new(parts.iter().map(|p| p.to_string()).collect()))
    }

    fn parse_length_prefixed(rest: &str, expected: usize) -> Option<Composite> {
        let (count, mut rest) = rest.split_once(':')?;
        if count.parse::<usize>().ok()? != expected {
            return None;
        }

        let mut values = Vec::with_capacity(expected);
        for _ in 0..expected {
            let (len, tail) = rest.split_once(':')?;
            let len = len.parse::<usize>().ok()?;
            if tail.len() < len || !tail.is_char_boundary(len) {
                return None;
            }
            values.push(tail[..len].to_string());
            rest = &tail[len..];
        }
        if !rest.is_empty() {
            return None;
        }
        Some(Composite::new(values))
    }
}

/// Cross product over the per-field match sets, in the detector's field
/// order, with deduplication and self-pairing exclusion.
///
/// `self_pair_excluded` lists index pairs of fields that share one
/// underlying pattern; composites assigning the identical value to both
/// roles are dropped. Output order is deterministic (sorted).
pub fn assemble(
    fields: &BTreeMap<&'static str, BTreeSet<String>>,
    required: &[&'static str],
    self_pair_excluded: &[(usize, usize)],
) -> Vec<Composite> {
    let mut sets: Vec<Vec<&String>> = Vec::with_capacity(required.len());
    for name in required {
        match fields.get(name) {
            Some(set) if !set.is_empty() => sets.push(set.iter().collect()),
            _ => return Vec::new(),
        }
    }

    let mut out = BTreeSet::new();
    let mut indices = vec![0usize; sets.len()];
    'outer: loop {
        let values: Vec<String> = indices
            .iter()
            .enumerate()
            .map(|(field, &i)| sets[field][i].clone())
            .collect();

        let self_paired = self_pair_excluded
            .iter()
            .any(|&(a, b)| values[a] == values[b]);
        if !self_paired {
            out.insert(Composite::new(values));
        }

        // Odometer step over the per-field sets.
        for field in (0..indices.len()).rev() {
            indices[field] += 1;
            if indices[field] < sets[field].len() {
                continue 'outer;
            }
            indices[field] = 0;
        }
        break;
    }

    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_sets(entries: &[(&'static str, &[&str])]) -> BTreeMap<&'static str, BTreeSet<String>> {
        entries
            .iter()
            .map(|(name, values)| {
                (*name, values.iter().map(|v| v.to_string()).collect())
            })
            .collect()
    }

    #[test]
    fn empty_field_kills_assembly() {
        let fields = field_sets(&[("key", &["a", "b"]), ("id", &[])]);
        assert!(assemble(&fields, &["key", "id"], &[]).is_empty());
    }

    #[test]
    fn product_size_is_bounded() {
        let fields = field_sets(&[("key", &["a", "b"]), ("id", &["x", "y", "z"])]);
        let composites = assemble(&fields, &["key", "id"], &[]);
        assert_eq!(composites.len(), 6);
    }

    #[test]
    fn self_pairing_is_excluded() {
        // Both roles drawn from the same matched spans.
        let fields = field_sets(&[("key", &["aaaa", "bbbb"]), ("secret", &["aaaa", "bbbb"])]);
        let composites = assemble(&fields, &["key", "secret"], &[(0, 1)]);
        assert_eq!(composites.len(), 2);
        for c in &composites {
            assert_ne!(c.value(0), c.value(1));
        }
    }

    #[test]
    fn output_order_is_deterministic() {
        let fields = field_sets(&[("key", &["b", "a"]), ("id", &["y", "x"])]);
        let first = assemble(&fields, &["key", "id"], &[]);
        let second = assemble(&fields, &["key", "id"], &[]);
        assert_eq!(first, second);
        assert_eq!(first[0].values(), &["a".to_string(), "x".to_string()]);
    }

    #[test]
    fn round_trip_separator_free() {
        let composite = Composite::new(vec!["key123".into(), "ID456".into()]);
        let serialized = composite.serialize();
        assert_eq!(serialized, "key123;-|ID456");
        assert_eq!(Composite::parse(&serialized, 2), Some(composite));
    }

    #[test]
    fn round_trip_with_separator_inside_value() {
        let composite = Composite::new(vec!["we;-|ird".into(), "plain".into()]);
        let serialized = composite.serialize();
        assert!(serialized.starts_with("lp1:"));
        assert_eq!(Composite::parse(&serialized, 2), Some(composite));
    }

    #[test]
    fn single_field_serializes_to_bare_value() {
        let composite = Composite::single("dp.ct.abcdef");
        assert_eq!(composite.serialize(), "dp.ct.abcdef");
        assert_eq!(Composite::parse("dp.ct.abcdef", 1), Some(composite));
    }

    #[test]
    fn parse_rejects_wrong_arity() {
        assert!(Composite::parse("a;-|b", 3).is_none());
        assert!(Composite::parse("lp1:2:1:a1:b", 3).is_none());
        assert!(Composite::parse("lp1:2:1:a9:b", 2).is_none());
    }
}
