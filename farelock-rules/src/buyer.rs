use std::sync::LazyLock;

use farelock_core::Buyer;
use regex::Regex;

use crate::report::ValidationReport;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

// Optional leading +, 10-15 digits, common separators tolerated
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{8,18}[0-9]$").unwrap());

/// Validate the buyer's contact fields and consent. An empty error map
/// means the buyer block is ready to submit.
pub fn validate_buyer(buyer: &Buyer) -> ValidationReport {
    let mut report = ValidationReport::new();

    if buyer.last_name.trim().is_empty() {
        report.push("last_name", "Required field");
    }
    if buyer.first_name.trim().is_empty() {
        report.push("first_name", "Required field");
    }

    let email = buyer.email.trim();
    if email.is_empty() {
        report.push("email", "Required field");
    } else if !EMAIL_RE.is_match(email) {
        report.push("email", "Enter a valid email address");
    }

    let phone = buyer.phone.trim();
    if phone.is_empty() {
        report.push("phone", "Required field");
    } else if !PHONE_RE.is_match(phone) {
        report.push("phone", "Enter a valid phone number");
    }

    if !buyer.consent {
        report.push("consent", "Consent to data processing is required");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_buyer() -> Buyer {
        Buyer {
            last_name: "Smith".to_string(),
            first_name: "John".to_string(),
            email: "john.smith@example.com".to_string(),
            phone: "+7 912 345-67-89".to_string(),
            consent: true,
        }
    }

    #[test]
    fn test_valid_buyer_passes() {
        assert!(validate_buyer(&valid_buyer()).is_valid());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut buyer = valid_buyer();
        for email in ["not-an-email", "a@b", "a b@c.com", ""] {
            buyer.email = email.to_string();
            assert!(
                validate_buyer(&buyer).errors.contains_key("email"),
                "accepted bad email {:?}",
                email
            );
        }
    }

    #[test]
    fn test_bad_phone_rejected() {
        let mut buyer = valid_buyer();
        for phone in ["12", "phone", ""] {
            buyer.phone = phone.to_string();
            assert!(
                validate_buyer(&buyer).errors.contains_key("phone"),
                "accepted bad phone {:?}",
                phone
            );
        }
    }

    #[test]
    fn test_missing_consent_rejected() {
        let mut buyer = valid_buyer();
        buyer.consent = false;
        assert!(validate_buyer(&buyer).errors.contains_key("consent"));
    }
}
