//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 50 { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SkuError { Empty, TooLong }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "SKU is required"), Self::TooLong => write!(f, "SKU too long") }
    }
}

/// Discount percentage, always within `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Result<Self, PercentageError> {
        if !value.is_finite() { return Err(PercentageError::NotANumber); }
        if !(0.0..=100.0).contains(&value) { return Err(PercentageError::OutOfRange(value)); }
        Ok(Self(value))
    }
    pub fn value(&self) -> f64 { self.0 }

    /// `price × (1 − percentage/100)`, computed the same way the stored
    /// price is derived so that a revert restores the exact original.
    pub fn apply_to(&self, price: f64) -> f64 { price - (price * self.0 / 100.0) }
}

impl TryFrom<f64> for Percentage {
    type Error = PercentageError;
    fn try_from(value: f64) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Percentage> for f64 {
    fn from(p: Percentage) -> Self { p.0 }
}

#[derive(Debug, Clone, PartialEq)] pub enum PercentageError { NotANumber, OutOfRange(f64) }
impl std::error::Error for PercentageError {}
impl fmt::Display for PercentageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "percentage must be a number"),
            Self::OutOfRange(v) => write!(f, "percentage {v} is outside [0, 100]"),
        }
    }
}
