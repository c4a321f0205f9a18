//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Minor units per whole currency unit.
pub const MINOR_PER_UNIT: u64 = 100;

/// Stable identifier of a service node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Non-negative amount in minor currency units (cents).
///
/// Stored as an integer so sums never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Whole currency units; `None` if the minor amount overflows.
    pub fn from_units(units: u64) -> Option<Self> {
        units.checked_mul(MINOR_PER_UNIT).map(Self)
    }

    pub fn minor(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Price) -> Option<Price> {
        self.0.checked_add(other.0).map(Price)
    }

    pub fn saturating_add(self, other: Price) -> Price {
        Price(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Price {
    /// `10` for whole amounts, `10.50` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / MINOR_PER_UNIT;
        let cents = self.0 % MINOR_PER_UNIT;
        if cents == 0 {
            write!(f, "{}", units)
        } else {
            write!(f, "{}.{:02}", units, cents)
        }
    }
}

/// Error parsing a price string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid price '{input}': {message}")]
pub struct PriceParseError {
    pub input: String,
    pub message: &'static str,
}

impl FromStr for Price {
    type Err = PriceParseError;

    /// Accepts `10`, `10.5`, `10.50` and an optional leading `$`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |message| PriceParseError {
            input: s.to_string(),
            message,
        };
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(err("empty"));
        }

        let (units_str, cents_str) = match trimmed.split_once('.') {
            Some((_, "")) => return Err(err("expected digits after the decimal point")),
            Some((u, c)) => (u, c),
            None => (trimmed, ""),
        };
        if units_str.is_empty() || !units_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("expected digits before the decimal point"));
        }
        if cents_str.len() > 2 || !cents_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("at most two decimal digits allowed"));
        }

        let units: u64 = units_str.parse().map_err(|_| err("amount too large"))?;
        let cents: u64 = match cents_str.len() {
            0 => 0,
            1 => cents_str.parse::<u64>().map_err(|_| err("bad decimals"))? * 10,
            _ => cents_str.parse().map_err(|_| err("bad decimals"))?,
        };

        units
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|m| m.checked_add(cents))
            .map(Price)
            .ok_or_else(|| err("amount too large"))
    }
}

impl<'de> Deserialize<'de> for Price {
    /// Integers and floats are whole units; strings go through `FromStr`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriceVisitor;

        impl de::Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative whole amount or a decimal string like \"1.50\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
                Price::from_units(v).ok_or_else(|| E::custom("price too large"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
                let v = u64::try_from(v).map_err(|_| E::custom("price must not be negative"))?;
                self.visit_u64(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
                if !v.is_finite() || v < 0.0 {
                    return Err(E::custom("price must be a non-negative finite number"));
                }
                let minor = (v * MINOR_PER_UNIT as f64).round();
                if (v * MINOR_PER_UNIT as f64 - minor).abs() > 1e-6 {
                    return Err(E::custom("at most two decimal digits allowed"));
                }
                if minor >= u64::MAX as f64 {
                    return Err(E::custom("price too large"));
                }
                Ok(Price(minor as u64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

/// Input record for bulk-loading a tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(default)]
    pub id: Option<NodeId>,
    pub title: String,
    pub price: Price,
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<NodeId>,
}

impl ServiceDescriptor {
    pub fn new(title: impl Into<String>, price: Price) -> Self {
        Self {
            id: None,
            title: title.into(),
            price,
            parent_id: None,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(NodeId(id));
        self
    }

    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parent_id = Some(NodeId(parent));
        self
    }
}

/// One selectable line item. `checked` is the only mutable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNode {
    pub(crate) id: NodeId,
    pub(crate) title: String,
    pub(crate) price: Price,
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) checked: bool,
}

impl ServiceNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

impl fmt::Display for ServiceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.checked { "x" } else { " " };
        write!(f, "[{}] {} ({}) ${}", mark, self.title, self.id, self.price)
    }
}

/// A single flip of a node's checked flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub id: NodeId,
    pub checked: bool,
}

/// All flips caused by one top-level operation, in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<StateChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, id: NodeId, checked: bool) {
        self.changes.push(StateChange { id, checked });
    }

    pub fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StateChange> {
        self.changes.iter()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.changes.iter().map(|c| c.id).collect()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.changes.iter().any(|c| c.id == id)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a StateChange;
    type IntoIter = std::slice::Iter<'a, StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_parse_variants() {
        assert_eq!("10".parse::<Price>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Price>().unwrap().minor(), 1050);
        assert_eq!("$10.05".parse::<Price>().unwrap().minor(), 1005);
        assert_eq!(" 0 ".parse::<Price>().unwrap(), Price::ZERO);
    }

    #[test]
    fn test_price_parse_rejects_garbage() {
        assert!("".parse::<Price>().is_err());
        assert!("-1".parse::<Price>().is_err());
        assert!("1.234".parse::<Price>().is_err());
        assert!(".50".parse::<Price>().is_err());
        assert!("1e3".parse::<Price>().is_err());
        assert!("10.".parse::<Price>().is_err());
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_minor(1100).to_string(), "11");
        assert_eq!(Price::from_minor(1150).to_string(), "11.50");
        assert_eq!(Price::from_minor(7).to_string(), "0.07");
    }

    #[test]
    fn test_node_display() {
        let node = ServiceNode {
            id: NodeId(6),
            title: "Sugar".into(),
            price: Price::from_minor(100),
            parent_id: Some(NodeId(3)),
            checked: true,
        };
        assert_eq!(node.to_string(), "[x] Sugar (6) $1");
    }
}
