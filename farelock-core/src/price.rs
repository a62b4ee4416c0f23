use serde::{Deserialize, Serialize};

use crate::passenger::PassengerCategory;

/// Per-category line of one direction's breakdown. Amounts are minor
/// units (cents); `fare_total`/`discount_total` are the authority's
/// precomputed `count * unit` products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPrice {
    pub category: PassengerCategory,
    pub count: u32,
    pub unit_fare: i64,
    pub unit_discount: i64,
    pub fare_total: i64,
    pub discount_total: i64,
}

/// Breakdown for one direction (outbound or return).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionPrice {
    pub tariff_code: String,
    #[serde(default)]
    pub categories: Vec<CategoryPrice>,
}

/// The authority's full price breakdown for a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceDetails {
    #[serde(default)]
    pub directions: Vec<DirectionPrice>,
    #[serde(default)]
    pub fees: i64,
    pub total: i64,
}
