//! Shopping-list attributes and the full-replace diff applied to them.
//!
//! Attributes are stored one row per `(item, kind)` with a text value. The
//! three recognised kinds are a category label and two numeric fields.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Recognised attribute kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Free-form category label.
    Category,
    /// Unit price.
    Price,
    /// Amount to buy.
    Quantity,
}

impl AttributeKind {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Price => "price",
            Self::Quantity => "quantity",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for attribute kinds outside the recognised set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute kind: {0}")]
pub struct UnknownAttributeKind(pub String);

impl FromStr for AttributeKind {
    type Err = UnknownAttributeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Self::Category),
            "price" => Ok(Self::Price),
            "quantity" => Ok(Self::Quantity),
            other => Err(UnknownAttributeKind(other.to_owned())),
        }
    }
}

/// Structured attributes of one item. Absent kinds are omitted, never
/// null-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttributes {
    /// Category label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Amount to buy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
}

impl ItemAttributes {
    /// Flatten into storage rows keyed by kind.
    pub fn to_rows(&self) -> BTreeMap<AttributeKind, String> {
        let mut rows = BTreeMap::new();
        if let Some(category) = &self.category {
            rows.insert(AttributeKind::Category, category.clone());
        }
        if let Some(price) = self.price {
            rows.insert(AttributeKind::Price, price.to_string());
        }
        if let Some(quantity) = self.quantity {
            rows.insert(AttributeKind::Quantity, quantity.to_string());
        }
        rows
    }

    /// Rebuild structured attributes from stored `(kind, value)` rows.
    ///
    /// Returns `None` when there are no rows at all. Rows with an
    /// unrecognised kind or an unparsable numeric value are skipped.
    pub fn from_rows<I, K, V>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut seen_any = false;
        let mut attributes = Self::default();
        for (kind, value) in rows {
            seen_any = true;
            let value = value.into();
            match kind.as_ref().parse::<AttributeKind>() {
                Ok(AttributeKind::Category) => attributes.category = Some(value),
                Ok(AttributeKind::Price) => attributes.price = parse_number(AttributeKind::Price, &value),
                Ok(AttributeKind::Quantity) => {
                    attributes.quantity = parse_number(AttributeKind::Quantity, &value);
                }
                Err(error) => warn!(%error, "skipping stored attribute"),
            }
        }
        seen_any.then_some(attributes)
    }
}

fn parse_number(kind: AttributeKind, value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(number) => Some(number),
        Err(error) => {
            warn!(%kind, value, %error, "skipping non-numeric stored attribute");
            None
        }
    }
}

/// Statements needed to turn the stored attribute set into the incoming one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeChanges {
    /// Kinds stored but absent from the incoming set.
    pub deletes: Vec<AttributeKind>,
    /// Kinds incoming but not yet stored.
    pub inserts: Vec<(AttributeKind, String)>,
    /// Kinds present on both sides, rewritten in place.
    pub updates: Vec<(AttributeKind, String)>,
}

impl AttributeChanges {
    /// Compute the three-way diff between stored and incoming rows.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use lists::domain::{AttributeChanges, AttributeKind};
    ///
    /// let existing = BTreeMap::from([(AttributeKind::Category, "meat".to_owned())]);
    /// let incoming = BTreeMap::from([
    ///     (AttributeKind::Category, "dairy".to_owned()),
    ///     (AttributeKind::Price, "5".to_owned()),
    /// ]);
    /// let changes = AttributeChanges::diff(&existing, &incoming);
    /// assert_eq!(changes.updates.len(), 1);
    /// assert_eq!(changes.inserts.len(), 1);
    /// assert!(changes.deletes.is_empty());
    /// ```
    pub fn diff(
        existing: &BTreeMap<AttributeKind, String>,
        incoming: &BTreeMap<AttributeKind, String>,
    ) -> Self {
        let deletes = existing
            .keys()
            .filter(|kind| !incoming.contains_key(kind))
            .copied()
            .collect();
        let (updates, inserts): (Vec<_>, Vec<_>) = incoming
            .iter()
            .map(|(kind, value)| (*kind, value.clone()))
            .partition(|(kind, _)| existing.contains_key(kind));
        Self {
            deletes,
            inserts,
            updates,
        }
    }

    /// Return `true` when nothing needs to be written.
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.inserts.is_empty() && self.updates.is_empty()
    }
}
