//! Core types used throughout Menucard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Unique identifier for a café account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CafeId(pub u64);

impl CafeId {
    /// Create a new café ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CafeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a food category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u64);

impl CategoryId {
    /// Create a new category ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoodId(pub u64);

impl FoodId {
    /// Create a new food ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role carried by an authenticated principal.
///
/// Roles arrive from the outside world (token claims, stored records), so
/// deserialization is total: an unrecognized label becomes [`Role::Other`]
/// and is rejected at the authorization step rather than at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// A café account managing its own menu.
    Cafe,
    /// Platform administrator.
    Admin,
    /// Any other role label; never granted access to café routes.
    Other(String),
}

impl Role {
    /// String label for this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cafe => "cafe",
            Self::Admin => "admin",
            Self::Other(label) => label,
        }
    }

    /// Check whether this is the café role.
    #[must_use]
    pub const fn is_cafe(&self) -> bool {
        matches!(self, Self::Cafe)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "cafe" => Self::Cafe,
            "admin" => Self::Admin,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// A text value in the three languages the menus are published in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Turkmen.
    #[serde(default)]
    pub tm: String,
    /// Russian.
    #[serde(default)]
    pub ru: String,
    /// English.
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    /// Create a localized text from the three language values.
    #[must_use]
    pub fn new(
        tm: impl Into<String>,
        ru: impl Into<String>,
        en: impl Into<String>,
    ) -> Self {
        Self {
            tm: tm.into(),
            ru: ru.into(),
            en: en.into(),
        }
    }

    /// True if every language value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tm.is_empty() && self.ru.is_empty() && self.en.is_empty()
    }
}

/// A café account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cafe {
    /// Unique café ID.
    pub id: CafeId,
    /// Login name used for authentication.
    pub login: String,
    /// Argon2 password hash (stored, never exposed in public API).
    pub password_hash: String,
    /// Display name of the café.
    pub name: String,
    /// Role label issued into tokens.
    pub role: Role,
    /// Stored logo file name, if one was uploaded.
    pub logo: Option<String>,
    /// Short public code of the café.
    pub code: String,
    /// Contact phone numbers.
    pub phone_numbers: Vec<String>,
    /// Subscription expiry date.
    pub expiry_date: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Cafe {
    /// Public profile projection (no credentials).
    #[must_use]
    pub fn to_profile(&self) -> CafeProfile {
        CafeProfile {
            id: self.id,
            name: self.name.clone(),
            role: self.role.clone(),
            logo: self.logo.clone(),
            code: self.code.clone(),
            phone_numbers: self.phone_numbers.clone(),
            expiry_date: self.expiry_date,
        }
    }
}

/// Public café representation (for API responses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeProfile {
    /// Unique café ID.
    pub id: CafeId,
    /// Display name.
    pub name: String,
    /// Role label.
    pub role: Role,
    /// Logo file name.
    pub logo: Option<String>,
    /// Short public code.
    pub code: String,
    /// Contact phone numbers.
    pub phone_numbers: Vec<String>,
    /// Subscription expiry date.
    pub expiry_date: Option<DateTime<Utc>>,
}

/// A food category within a café's menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCategory {
    /// Unique category ID.
    pub id: CategoryId,
    /// Café this category belongs to.
    pub cafe_id: CafeId,
    /// Category name.
    pub name: LocalizedText,
    /// Stored image file name.
    pub image: Option<String>,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

/// A menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    /// Unique food ID.
    pub id: FoodId,
    /// Café this item belongs to.
    pub cafe_id: CafeId,
    /// Category this item is listed under.
    pub category_id: CategoryId,
    /// Item name.
    pub name: LocalizedText,
    /// Item description.
    pub description: LocalizedText,
    /// Price in the café's currency.
    pub price: f64,
    /// Stored image file name.
    pub image: Option<String>,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
}
