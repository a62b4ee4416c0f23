use farelock_core::PriceDetails;
use serde::{Deserialize, Serialize};

/// Display totals folded from a booking's per-direction breakdown.
/// Amounts are minor units, matching the wire shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub fare_total: i64,
    pub discount_total: i64,
    pub fees: i64,
    pub grand_total: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    /// A component is negative or a discount exceeds its fare. The
    /// breakdown comes from the authority; a bad one is surfaced as a
    /// data error, never clamped.
    #[error("Invalid price breakdown: {0}")]
    InvalidBreakdown(String),

    /// Our fold disagrees with the authority's reported grand total.
    #[error("Computed total {computed} does not match reported total {reported}")]
    TotalMismatch { computed: i64, reported: i64 },
}

/// Fold the breakdown into display totals. Pure; re-run on every
/// snapshot refresh.
pub fn aggregate(details: &PriceDetails) -> Result<PriceSummary, PricingError> {
    let mut fare_total: i64 = 0;
    let mut discount_total: i64 = 0;

    for direction in &details.directions {
        for line in &direction.categories {
            if line.unit_fare < 0 || line.unit_discount < 0 || line.fare_total < 0 || line.discount_total < 0 {
                return Err(PricingError::InvalidBreakdown(format!(
                    "negative amount for category {} on tariff {}",
                    line.category.as_str(),
                    direction.tariff_code
                )));
            }
            if line.discount_total > line.fare_total {
                return Err(PricingError::InvalidBreakdown(format!(
                    "discount exceeds fare for category {} on tariff {}",
                    line.category.as_str(),
                    direction.tariff_code
                )));
            }
            fare_total += line.fare_total;
            discount_total += line.discount_total;
        }
    }

    if details.fees < 0 {
        return Err(PricingError::InvalidBreakdown("negative fees".to_string()));
    }

    let grand_total = fare_total - discount_total + details.fees;
    if grand_total != details.total {
        return Err(PricingError::TotalMismatch { computed: grand_total, reported: details.total });
    }

    Ok(PriceSummary { fare_total, discount_total, fees: details.fees, grand_total })
}
