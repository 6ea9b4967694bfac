//! Discount Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::value_objects::Percentage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType { Product, Collection }

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Product => "product", Self::Collection => "collection" }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for TargetType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "collection" => Ok(Self::Collection),
            other => Err(format!("unknown discount target type '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Uuid,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub percentage: Percentage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a discount points at and by how much.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscountTerms { pub target_type: TargetType, pub target_id: Uuid, pub percentage: Percentage }

impl Discount {
    pub fn create(terms: DiscountTerms) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(), target_type: terms.target_type, target_id: terms.target_id,
            percentage: terms.percentage, created_at: now, updated_at: now,
        }
    }

    pub fn retarget(&mut self, terms: DiscountTerms) {
        self.target_type = terms.target_type;
        self.target_id = terms.target_id;
        self.percentage = terms.percentage;
        self.updated_at = Utc::now();
    }
}
