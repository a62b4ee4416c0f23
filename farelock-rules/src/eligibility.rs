use chrono::{Months, NaiveDate};
use farelock_core::PassengerCategory;

/// Permissible birth-date window for a category across the whole
/// itinerary. The lower bound is exclusive, the upper inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthWindow {
    pub min_exclusive: Option<NaiveDate>,
    pub max_inclusive: NaiveDate,
}

impl BirthWindow {
    pub fn contains(&self, birth_date: NaiveDate) -> bool {
        if birth_date > self.max_inclusive {
            return false;
        }
        match self.min_exclusive {
            Some(min) => birth_date > min,
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.min_exclusive, Some(min) if min >= self.max_inclusive)
    }
}

fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    // Months-based subtraction clamps Feb 29 to Feb 28 on non-leap years
    date.checked_sub_months(Months::new(years * 12)).unwrap_or(date)
}

fn leg_bounds(leg_dates: &[NaiveDate], today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = leg_dates.iter().min().copied().unwrap_or(today);
    let last = leg_dates.iter().max().copied().unwrap_or(today);
    (first, last)
}

/// Compute the valid birth-date window for `category` given every
/// booked leg's departure date. With no known legs both bounds default
/// to `today`.
///
/// The category must hold on *every* leg: an adult must already be 12
/// on the earliest leg, a child must stay 2..=11 on all legs, an
/// infant must stay under 2 on all legs and be born by the first leg.
pub fn birth_date_window(
    category: PassengerCategory,
    leg_dates: &[NaiveDate],
    today: NaiveDate,
) -> BirthWindow {
    let (first_leg, last_leg) = leg_bounds(leg_dates, today);
    match category {
        PassengerCategory::Adult => BirthWindow {
            min_exclusive: None,
            max_inclusive: years_before(first_leg, 12),
        },
        PassengerCategory::Child => BirthWindow {
            min_exclusive: Some(years_before(last_leg, 12)),
            max_inclusive: years_before(first_leg, 2),
        },
        PassengerCategory::Infant | PassengerCategory::InfantSeat => BirthWindow {
            min_exclusive: Some(years_before(last_leg, 2)),
            max_inclusive: first_leg,
        },
    }
}

/// Earliest acceptable document expiry date: documents must remain
/// valid through the whole itinerary.
pub fn document_expiry_floor(leg_dates: &[NaiveDate], today: NaiveDate) -> NaiveDate {
    let (_, last_leg) = leg_bounds(leg_dates, today);
    today.max(last_leg)
}

pub fn document_expiry_valid(expiry: NaiveDate, leg_dates: &[NaiveDate], today: NaiveDate) -> bool {
    expiry >= document_expiry_floor(leg_dates, today)
}

/// Human-readable age-rule violation per category.
pub fn category_age_error(category: PassengerCategory) -> &'static str {
    match category {
        PassengerCategory::Adult => "Adult passengers must be at least 12 years old on the departure date",
        PassengerCategory::Child => "Child passengers must be between 2 and 11 years old on every flight date",
        PassengerCategory::Infant | PassengerCategory::InfantSeat => {
            "Infant passengers must be under 2 years old on every flight date"
        }
    }
}
