use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::passenger::Passenger;
use crate::price::PriceDetails;
use crate::stage::BookingStage;

/// Booking lifecycle status as declared by the authority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Created,
    PassengersAdded,
    Confirmed,
    PaymentPending,
    PaymentConfirmed,
    Completed,
    Expired,
    Cancelled,
    PaymentFailed,
}

impl BookingStatus {
    /// Terminal side-exits: the booking can no longer progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Expired | BookingStatus::Cancelled | BookingStatus::PaymentFailed
        )
    }
}

/// Payment state the client observes; the gateway itself is external.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

impl PaymentStatus {
    /// Succeeded and canceled payments are settled; a failed one can
    /// still be retried while the hold lasts, so it is not terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::Canceled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub status: PaymentStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

/// One leg (outbound or return) of the itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Direction {
    pub origin: String,
    pub destination: String,
    pub departure_at: DateTime<Utc>,
    pub arrival_at: DateTime<Utc>,
    pub seat_class: String,
    pub tariff_code: String,
}

/// Contact identity of the person paying for the booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buyer {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub consent: bool,
}

/// Read-only booking snapshot fetched from the authority. The client
/// never constructs one of these locally; it only appends passengers
/// and the buyer, then re-fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub public_id: String,
    pub status: BookingStatus,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub directions: Vec<Direction>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
    pub buyer: Option<Buyer>,
    pub price_details: Option<PriceDetails>,
    pub payment: Option<PaymentInfo>,
}

impl Booking {
    /// Departure dates of every booked leg, in itinerary order.
    pub fn leg_departure_dates(&self) -> Vec<NaiveDate> {
        self.directions.iter().map(|d| d.departure_at.date_naive()).collect()
    }
}

/// Optional bearer token allowing an anonymous party to act on a
/// booking found via search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The authority-declared set of stages a booking may currently visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    #[serde(default)]
    pub accessible_stages: Vec<BookingStage>,
}

impl AccessGrant {
    /// The furthest stage the booking has legitimately reached, by the
    /// canonical funnel order. The authority's list is trusted as-is;
    /// it is not required to be a prefix of the canonical order.
    pub fn last_accessible(&self) -> Option<BookingStage> {
        self.accessible_stages.iter().max().copied()
    }

    pub fn allows(&self, stage: BookingStage) -> bool {
        self.accessible_stages.contains(&stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(BookingStatus::Expired.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::PaymentFailed.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
    }

    #[test]
    fn test_terminal_payment_statuses() {
        assert!(PaymentStatus::Succeeded.is_terminal());
        assert!(PaymentStatus::Canceled.is_terminal());
        assert!(!PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::Processing.is_terminal());
    }

    #[test]
    fn test_last_accessible_uses_canonical_order() {
        // Out-of-order grant still resolves to the furthest stage
        let grant = AccessGrant {
            accessible_stages: vec![
                BookingStage::Confirmation,
                BookingStage::Passengers,
            ],
        };
        assert_eq!(grant.last_accessible(), Some(BookingStage::Confirmation));
        assert!(grant.allows(BookingStage::Passengers));
        assert!(!grant.allows(BookingStage::Payment));
    }

    #[test]
    fn test_empty_grant() {
        let grant = AccessGrant { accessible_stages: vec![] };
        assert_eq!(grant.last_accessible(), None);
    }
}
