use derive_more::{Deref, Display, IntoIterator};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

/// Field name of the store's primary key.
pub const PRIMARY_KEY_FIELD: &str = "_id";

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum OrderDirection {
    #[default]
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn is_desc(self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl FromStr for OrderDirection {
    type Err = ParseOrderDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(Self::Asc),
            "desc" | "descending" | "-1" => Ok(Self::Desc),
            _ => Err(ParseOrderDirectionError(s.to_string())),
        }
    }
}

impl Serialize for OrderDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

///
/// ParseOrderDirectionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("unknown order direction '{0}' (expected asc or desc)")]
pub struct ParseOrderDirectionError(pub String);

///
/// OrderSpec
///
/// Ordered list of `(field, direction)` pairs; earlier fields take precedence.
/// Serialized as a map so it reads naturally in config files.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct OrderSpec {
    fields: Vec<(String, OrderDirection)>,
}

impl OrderSpec {
    /// An empty ordering.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Ascending by primary key; the ordering imposed on unordered sources.
    #[must_use]
    pub fn primary_key() -> Self {
        Self::new().asc(PRIMARY_KEY_FIELD)
    }

    #[must_use]
    pub fn asc(self, field: impl Into<String>) -> Self {
        self.then(field, OrderDirection::Asc)
    }

    #[must_use]
    pub fn desc(self, field: impl Into<String>) -> Self {
        self.then(field, OrderDirection::Desc)
    }

    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.push(field, direction);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, direction: OrderDirection) {
        self.fields.push((field.into(), direction));
    }

    /// Append every field of `other`, keeping this spec's fields first.
    pub fn extend_from(&mut self, other: &Self) {
        self.fields.extend(other.fields.iter().cloned());
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, OrderDirection)] {
        &self.fields
    }
}

impl<K: Into<String>> FromIterator<(K, OrderDirection)> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = (K, OrderDirection)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(field, direction)| (field.into(), direction))
                .collect(),
        }
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (field, direction)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {direction}")?;
        }
        write!(f, "}}")
    }
}

impl Serialize for OrderSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, direction) in &self.fields {
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderSpecVisitor;

        impl<'de> Visitor<'de> for OrderSpecVisitor {
            type Value = OrderSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to order directions")
            }

            // entries keep document order; it decides sort precedence
            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OrderSpec, A::Error> {
                let mut spec = OrderSpec::new();
                while let Some((field, direction)) =
                    access.next_entry::<String, OrderDirection>()?
                {
                    spec.push(field, direction);
                }

                Ok(spec)
            }
        }

        deserializer.deserialize_map(OrderSpecVisitor)
    }
}
