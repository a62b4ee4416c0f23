use chrono::NaiveDate;
use farelock_core::{Passenger, ScriptFamily};

use crate::eligibility::{birth_date_window, category_age_error, document_expiry_valid};
use crate::report::ValidationReport;

fn script_error(script: ScriptFamily) -> &'static str {
    match script {
        ScriptFamily::Cyrillic => "This document requires the name in Cyrillic letters",
        ScriptFamily::Latin => "This document requires the name in Latin letters",
    }
}

fn check_name(report: &mut ValidationReport, field: &str, value: &str, script: ScriptFamily) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        report.push(field, "Required field");
    } else if !script.matches(trimmed) {
        report.push(field, script_error(script));
    }
}

/// Validate one passenger draft against its category's eligibility
/// window and the field set its document type activates. Pure and
/// idempotent; never mutates the draft. Bounds are recomputed from the
/// current leg dates on every call, so a category or itinerary change
/// is picked up automatically.
pub fn validate_passenger(
    passenger: &Passenger,
    leg_dates: &[NaiveDate],
    today: NaiveDate,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    let profile = passenger.document_type.profile();

    check_name(&mut report, "last_name", &passenger.last_name, profile.script);
    check_name(&mut report, "first_name", &passenger.first_name, profile.script);
    if profile.requires_patronymic {
        // Patronymic is optional even on domestic documents, but when
        // present it must use the document's script
        if let Some(patronymic) = passenger.patronymic.as_deref() {
            if !patronymic.trim().is_empty() && !profile.script.matches(patronymic.trim()) {
                report.push("patronymic", script_error(profile.script));
            }
        }
    }

    if passenger.gender.is_none() {
        report.push("gender", "Required field");
    }

    match passenger.birth_date {
        None => report.push("birth_date", "Required field"),
        Some(birth_date) => {
            let window = birth_date_window(passenger.category, leg_dates, today);
            if !window.contains(birth_date) {
                report.push("birth_date", category_age_error(passenger.category));
            }
        }
    }

    if passenger.document_number.trim().is_empty() {
        report.push("document_number", "Required field");
    }

    if profile.requires_expiry {
        match passenger.document_expiry {
            None => report.push("document_expiry", "Required field"),
            Some(expiry) => {
                if !document_expiry_valid(expiry, leg_dates, today) {
                    report.push(
                        "document_expiry",
                        "Document must remain valid through the whole itinerary",
                    );
                }
            }
        }
    }

    report
}
