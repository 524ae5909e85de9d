//! Status and category enums for orders and catalog entries.

use serde::{Deserialize, Serialize};

/// Order progress marker.
///
/// The intended flow is `new -> accepted -> ready -> picked_up`, driven by
/// baristas from the admin board. The update endpoint stores whatever
/// non-empty string a barista submits, so unknown values round-trip verbatim;
/// [`OrderStatus::next`] describes the intended flow without enforcing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

/// Error parsing an [`OrderStatus`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderStatusError {
    /// The status string is empty.
    #[error("status cannot be empty")]
    Empty,
}

impl OrderStatus {
    /// Freshly created, not yet triaged.
    pub const NEW: &'static str = "new";
    /// Accepted by a barista, being prepared.
    pub const ACCEPTED: &'static str = "accepted";
    /// Ready on the pickup counter.
    pub const READY: &'static str = "ready";
    /// Handed to the customer.
    pub const PICKED_UP: &'static str = "picked_up";

    /// The status every order is created with.
    #[must_use]
    pub fn new_order() -> Self {
        Self(Self::NEW.to_owned())
    }

    /// Parse a status from a caller-supplied string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty. Any non-empty value is
    /// accepted and stored verbatim.
    pub fn parse(s: &str) -> Result<Self, OrderStatusError> {
        if s.is_empty() {
            return Err(OrderStatusError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// The raw status string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The next status in the intended flow, if this is a known
    /// non-terminal status.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self.0.as_str() {
            Self::NEW => Some(Self(Self::ACCEPTED.to_owned())),
            Self::ACCEPTED => Some(Self(Self::READY.to_owned())),
            Self::READY => Some(Self(Self::PICKED_UP.to_owned())),
            _ => None,
        }
    }

    /// Whether this is one of the four statuses the apps know how to render.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::NEW | Self::ACCEPTED | Self::READY | Self::PICKED_UP
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog category. Desserts do not consume coffee-making capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Coffee,
    Dessert,
}

impl ProductCategory {
    /// Whether items of this category are exempt from the pickup-slot cap.
    #[must_use]
    pub const fn is_dessert(self) -> bool {
        matches!(self, Self::Dessert)
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coffee => write!(f, "coffee"),
            Self::Dessert => write!(f, "dessert"),
        }
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coffee" => Ok(Self::Coffee),
            "dessert" => Ok(Self::Dessert),
            _ => Err(format!("invalid product category: {s}")),
        }
    }
}

/// Cup sizes a beverage can be ordered in.
///
/// Serialized capitalized (`Small`, `Medium`, `Large`), matching the keys of
/// the stored size-modifier JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CupSize {
    Small,
    Medium,
    Large,
}
