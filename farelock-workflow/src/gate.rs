use farelock_core::{AccessGrant, BookingStage};

/// Outcome of a navigation attempt against the latest fetched grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The requested stage is accessible.
    Proceed,
    /// Requested stage is forbidden; go to the furthest stage the
    /// booking has legitimately reached.
    Redirect(BookingStage),
    /// No stage is accessible at all (e.g. the hold expired before
    /// anything was saved); back to the entry point.
    RedirectHome,
}

/// Gate a navigation attempt. Evaluated on every stage entry against
/// the latest fetched grant, never against cached history, since the
/// grant can shrink between visits when the hold expires.
pub fn resolve(requested: BookingStage, grant: &AccessGrant) -> GateOutcome {
    if grant.allows(requested) {
        return GateOutcome::Proceed;
    }
    match grant.last_accessible() {
        Some(stage) => GateOutcome::Redirect(stage),
        None => GateOutcome::RedirectHome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(stages: &[BookingStage]) -> AccessGrant {
        AccessGrant { accessible_stages: stages.to_vec() }
    }

    #[test]
    fn test_accessible_stage_proceeds() {
        let g = grant(&[BookingStage::Passengers, BookingStage::Confirmation]);
        assert_eq!(resolve(BookingStage::Confirmation, &g), GateOutcome::Proceed);
    }

    #[test]
    fn test_forbidden_stage_redirects_to_last_accessible() {
        let g = grant(&[BookingStage::Passengers, BookingStage::Confirmation]);
        // Redirect lands on confirmation, not passengers
        assert_eq!(
            resolve(BookingStage::Payment, &g),
            GateOutcome::Redirect(BookingStage::Confirmation)
        );
    }

    #[test]
    fn test_empty_grant_redirects_home() {
        assert_eq!(resolve(BookingStage::Payment, &grant(&[])), GateOutcome::RedirectHome);
    }

    #[test]
    fn test_shrunk_grant_demotes() {
        // The user had reached payment, but the hold expired and the
        // fresh grant only allows passengers again
        let g = grant(&[BookingStage::Passengers]);
        assert_eq!(
            resolve(BookingStage::Payment, &g),
            GateOutcome::Redirect(BookingStage::Passengers)
        );
    }
}
