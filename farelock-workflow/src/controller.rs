use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use farelock_core::{AccessGrant, AccessToken, ApiFieldError, Booking, BookingStage, Buyer, Passenger};
use farelock_pricing::PriceSummary;
use farelock_rules::{find_duplicates, validate_buyer, validate_passenger, ValidationReport};
use tracing::{debug, info, warn};

use crate::authority::{AuthorityError, BookingAuthority, SubmitPassengersRequest};
use crate::gate::{self, GateOutcome};

const GENERIC_FAILURE: &str = "The operation could not be completed. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Locally computed field errors; nothing was sent to the server.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),

    /// Duplicate passenger groups block submission outright.
    #[error("Duplicate passengers in the booking")]
    DuplicatePassengers(Vec<Vec<usize>>),

    /// Authority-rejected write, surfaced verbatim.
    #[error("Rejected by the booking authority")]
    Rejected(Vec<ApiFieldError>),

    /// Network/5xx; retryable by the user re-submitting.
    #[error("{0}")]
    Transport(String),

    /// A newer request superseded this one; discard the response.
    #[error("Superseded by a newer request")]
    Superseded,
}

impl From<AuthorityError> for WorkflowError {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Rejected(errors) => WorkflowError::Rejected(errors),
            AuthorityError::Transport(msg) => {
                warn!("authority transport failure: {}", msg);
                WorkflowError::Transport(GENERIC_FAILURE.to_string())
            }
            AuthorityError::Status(code) => {
                warn!("authority returned status {}", code);
                WorkflowError::Transport(GENERIC_FAILURE.to_string())
            }
        }
    }
}

/// Which expiry instant the countdown should track on the active
/// stage, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSource {
    BookingHold(Option<DateTime<Utc>>),
    PaymentHold(Option<DateTime<Utc>>),
    Suppressed,
}

impl CountdownSource {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            CountdownSource::BookingHold(at) | CountdownSource::PaymentHold(at) => *at,
            CountdownSource::Suppressed => None,
        }
    }
}

/// Everything a stage needs before it may render.
#[derive(Debug)]
pub struct StageView {
    pub stage: BookingStage,
    pub booking: Booking,
    pub grant: AccessGrant,
    pub countdown: CountdownSource,
    pub price_summary: Option<PriceSummary>,
    /// A malformed breakdown is surfaced alongside the view, not
    /// swallowed and not clamped.
    pub price_error: Option<String>,
}

#[derive(Debug)]
pub enum StageEntry {
    View(StageView),
    Redirect(BookingStage),
    RedirectHome,
}

/// Result of a successful passenger-stage submission. Both re-fetches
/// completed before this was produced, so the next stage's gate never
/// sees stale accessible stages.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub booking: Booking,
    pub grant: AccessGrant,
    pub next: BookingStage,
    pub access_token: Option<AccessToken>,
}

/// Top-level orchestration: loads booking state, gates stage entry,
/// runs the validators and drives the passenger-stage submission.
/// Display components read the snapshot it produces; only this
/// controller's submission path mutates server state.
pub struct BookingWorkflowController {
    authority: Arc<dyn BookingAuthority>,
    generation: AtomicU64,
}

impl BookingWorkflowController {
    pub fn new(authority: Arc<dyn BookingAuthority>) -> Self {
        Self { authority, generation: AtomicU64::new(0) }
    }

    fn begin_request(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Guard against out-of-order completion: a response is only
    /// applied while its request is still the newest one.
    fn ensure_current(&self, seq: u64) -> Result<(), WorkflowError> {
        if self.generation.load(Ordering::SeqCst) == seq {
            Ok(())
        } else {
            Err(WorkflowError::Superseded)
        }
    }

    /// Enter a stage: fetch the booking snapshot and the access grant
    /// (sequenced, both required before rendering), then gate the
    /// navigation attempt against the fresh grant.
    pub async fn enter_stage(
        &self,
        public_id: &str,
        requested: BookingStage,
        token: Option<&AccessToken>,
    ) -> Result<StageEntry, WorkflowError> {
        let seq = self.begin_request();

        let booking = self.authority.fetch_details(public_id, token).await?;
        self.ensure_current(seq)?;
        let grant = self.authority.fetch_access(public_id, token).await?;
        self.ensure_current(seq)?;

        match gate::resolve(requested, &grant) {
            GateOutcome::Proceed => {
                let countdown = countdown_source(requested, &booking);
                let (price_summary, price_error) = match booking.price_details.as_ref() {
                    None => (None, None),
                    Some(details) => match farelock_pricing::aggregate(details) {
                        Ok(summary) => (Some(summary), None),
                        Err(e) => {
                            warn!("booking {}: bad price breakdown: {}", public_id, e);
                            (None, Some(e.to_string()))
                        }
                    },
                };
                Ok(StageEntry::View(StageView {
                    stage: requested,
                    booking,
                    grant,
                    countdown,
                    price_summary,
                    price_error,
                }))
            }
            GateOutcome::Redirect(stage) => {
                debug!("booking {}: stage {} forbidden, redirecting to {}", public_id, requested, stage);
                Ok(StageEntry::Redirect(stage))
            }
            GateOutcome::RedirectHome => {
                debug!("booking {}: no accessible stages, redirecting home", public_id);
                Ok(StageEntry::RedirectHome)
            }
        }
    }

    /// Submit the passenger stage: local validation and duplicate
    /// detection first (nothing is sent while they fail), then the
    /// atomic passengers+buyer write, then re-fetch of details AND
    /// grant before the stage transition is reported.
    pub async fn submit_passenger_stage(
        &self,
        public_id: &str,
        passengers: &[Passenger],
        buyer: &Buyer,
        token: Option<&AccessToken>,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let seq = self.begin_request();

        // Flight dates may have changed since the draft was built, so
        // validation always runs against a fresh snapshot
        let booking = self.authority.fetch_details(public_id, token).await?;
        self.ensure_current(seq)?;
        let leg_dates = booking.leg_departure_dates();
        let today = Utc::now().date_naive();

        let mut report = ValidationReport::new();
        for (idx, passenger) in passengers.iter().enumerate() {
            report.merge_prefixed(
                &format!("passengers[{}]", idx),
                validate_passenger(passenger, &leg_dates, today),
            );
        }
        report.merge_prefixed("buyer", validate_buyer(buyer));
        if !report.is_valid() {
            return Err(WorkflowError::Validation(report.errors));
        }

        let duplicates = find_duplicates(passengers);
        if !duplicates.is_empty() {
            warn!("booking {}: duplicate passengers block submission", public_id);
            return Err(WorkflowError::DuplicatePassengers(duplicates));
        }

        let request = SubmitPassengersRequest {
            public_id: public_id.to_string(),
            buyer: buyer.clone(),
            passengers: passengers.to_vec(),
            access_token: token.map(|t| t.as_str().to_string()),
        };
        let submitted = self.authority.submit_passengers(request).await?;
        info!("booking {}: passengers submitted, status {:?}", public_id, submitted.status);

        // Both reads must complete before the transition so the gate
        // at confirmation never evaluates a stale grant
        let booking = self.authority.fetch_details(public_id, token).await?;
        self.ensure_current(seq)?;
        let grant = self.authority.fetch_access(public_id, token).await?;
        self.ensure_current(seq)?;

        Ok(SubmitOutcome {
            booking,
            grant,
            next: BookingStage::Confirmation,
            access_token: token.cloned(),
        })
    }
}

/// Which hold the countdown tracks: the booking hold on the passenger
/// and confirmation stages, the payment hold on the payment stage, and
/// nothing on completion or once payment reached a terminal state.
pub fn countdown_source(stage: BookingStage, booking: &Booking) -> CountdownSource {
    if stage == BookingStage::Completion {
        return CountdownSource::Suppressed;
    }
    if booking.payment.as_ref().is_some_and(|p| p.status.is_terminal()) {
        return CountdownSource::Suppressed;
    }
    match stage {
        BookingStage::Passengers | BookingStage::Confirmation => {
            CountdownSource::BookingHold(booking.expires_at)
        }
        BookingStage::Payment => {
            CountdownSource::PaymentHold(booking.payment.as_ref().and_then(|p| p.expires_at))
        }
        BookingStage::Completion => CountdownSource::Suppressed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, TimeZone};
    use farelock_core::{
        BookingStatus, Direction, DocumentType, Gender, PassengerCategory, PaymentInfo,
        PaymentStatus,
    };
    use std::sync::Mutex;

    fn leg(departure: DateTime<Utc>) -> Direction {
        Direction {
            origin: "SVO".to_string(),
            destination: "LED".to_string(),
            departure_at: departure,
            arrival_at: departure + Duration::hours(2),
            seat_class: "economy".to_string(),
            tariff_code: "ECO".to_string(),
        }
    }

    fn booking_fixture() -> Booking {
        Booking {
            public_id: "PNR123".to_string(),
            status: BookingStatus::Created,
            expires_at: Some(Utc::now() + Duration::minutes(20)),
            directions: vec![leg(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap())],
            passengers: vec![],
            buyer: None,
            price_details: None,
            payment: None,
        }
    }

    fn grant_fixture(stages: &[BookingStage]) -> AccessGrant {
        AccessGrant { accessible_stages: stages.to_vec() }
    }

    struct MockAuthority {
        booking: Booking,
        grant: AccessGrant,
        submit_result: Option<AuthorityError>,
        calls: Mutex<Vec<&'static str>>,
        fetch_delay: Option<std::time::Duration>,
    }

    impl MockAuthority {
        fn new(booking: Booking, grant: AccessGrant) -> Self {
            Self { booking, grant, submit_result: None, calls: Mutex::new(vec![]), fetch_delay: None }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BookingAuthority for MockAuthority {
        async fn fetch_details(
            &self,
            _public_id: &str,
            _token: Option<&AccessToken>,
        ) -> Result<Booking, AuthorityError> {
            self.calls.lock().unwrap().push("details");
            if let Some(delay) = self.fetch_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.booking.clone())
        }

        async fn fetch_access(
            &self,
            _public_id: &str,
            _token: Option<&AccessToken>,
        ) -> Result<AccessGrant, AuthorityError> {
            self.calls.lock().unwrap().push("access");
            Ok(self.grant.clone())
        }

        async fn submit_passengers(
            &self,
            _request: SubmitPassengersRequest,
        ) -> Result<Booking, AuthorityError> {
            self.calls.lock().unwrap().push("submit");
            match &self.submit_result {
                None => Ok(self.booking.clone()),
                Some(AuthorityError::Rejected(errors)) => Err(AuthorityError::Rejected(errors.clone())),
                Some(AuthorityError::Transport(msg)) => Err(AuthorityError::Transport(msg.clone())),
                Some(AuthorityError::Status(code)) => Err(AuthorityError::Status(*code)),
            }
        }

        async fn fetch_passengers(
            &self,
            _public_id: &str,
            _token: Option<&AccessToken>,
        ) -> Result<Vec<Passenger>, AuthorityError> {
            Ok(self.booking.passengers.clone())
        }

        async fn save_passenger(
            &self,
            _public_id: &str,
            passenger: &Passenger,
            _token: Option<&AccessToken>,
        ) -> Result<Passenger, AuthorityError> {
            Ok(passenger.clone())
        }
    }

    fn valid_adult() -> Passenger {
        let mut p = Passenger::slot(PassengerCategory::Adult);
        p.last_name = "Иванов".to_string();
        p.first_name = "Пётр".to_string();
        p.gender = Some(Gender::Male);
        p.birth_date = NaiveDate::from_ymd_opt(1990, 5, 20);
        p.document_type = DocumentType::NationalPassport;
        p.document_number = "4509 123456".to_string();
        p
    }

    fn valid_buyer() -> Buyer {
        Buyer {
            last_name: "Иванов".to_string(),
            first_name: "Пётр".to_string(),
            email: "ivanov@example.com".to_string(),
            phone: "+7 912 345-67-89".to_string(),
            consent: true,
        }
    }

    #[tokio::test]
    async fn test_enter_forbidden_stage_redirects_to_last_accessible() {
        let mock = Arc::new(MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers, BookingStage::Confirmation]),
        ));
        let controller = BookingWorkflowController::new(mock.clone());

        let entry = controller.enter_stage("PNR123", BookingStage::Payment, None).await.unwrap();
        match entry {
            StageEntry::Redirect(stage) => assert_eq!(stage, BookingStage::Confirmation),
            other => panic!("expected redirect, got {:?}", other),
        }
        // Both reads happened, in order, before gating
        assert_eq!(mock.calls(), vec!["details", "access"]);
    }

    #[tokio::test]
    async fn test_enter_with_empty_grant_redirects_home() {
        let mock = Arc::new(MockAuthority::new(booking_fixture(), grant_fixture(&[])));
        let controller = BookingWorkflowController::new(mock);
        let entry = controller.enter_stage("PNR123", BookingStage::Payment, None).await.unwrap();
        assert!(matches!(entry, StageEntry::RedirectHome));
    }

    #[tokio::test]
    async fn test_enter_accessible_stage_yields_view_with_countdown() {
        let mock = Arc::new(MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers]),
        ));
        let controller = BookingWorkflowController::new(mock);
        let entry = controller.enter_stage("PNR123", BookingStage::Passengers, None).await.unwrap();
        match entry {
            StageEntry::View(view) => {
                assert_eq!(view.stage, BookingStage::Passengers);
                assert!(matches!(view.countdown, CountdownSource::BookingHold(Some(_))));
            }
            other => panic!("expected view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_blocks_on_local_validation_without_network_write() {
        let mock = Arc::new(MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers]),
        ));
        let controller = BookingWorkflowController::new(mock.clone());

        let incomplete = Passenger::slot(PassengerCategory::Adult);
        let result = controller
            .submit_passenger_stage("PNR123", &[incomplete], &valid_buyer(), None)
            .await;

        match result {
            Err(WorkflowError::Validation(errors)) => {
                assert!(errors.keys().any(|k| k.starts_with("passengers[0].")));
            }
            other => panic!("expected validation error, got {:?}", other.err()),
        }
        assert!(!mock.calls().contains(&"submit"));
    }

    #[tokio::test]
    async fn test_submit_blocks_on_duplicates() {
        let mock = Arc::new(MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers]),
        ));
        let controller = BookingWorkflowController::new(mock.clone());

        let result = controller
            .submit_passenger_stage("PNR123", &[valid_adult(), valid_adult()], &valid_buyer(), None)
            .await;

        match result {
            Err(WorkflowError::DuplicatePassengers(groups)) => assert_eq!(groups, vec![vec![0, 1]]),
            other => panic!("expected duplicate error, got {:?}", other.err()),
        }
        assert!(!mock.calls().contains(&"submit"));
    }

    #[tokio::test]
    async fn test_submit_refetches_both_before_advancing() {
        let mock = Arc::new(MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers, BookingStage::Confirmation]),
        ));
        let controller = BookingWorkflowController::new(mock.clone());

        let token = AccessToken("tok-42".to_string());
        let outcome = controller
            .submit_passenger_stage("PNR123", &[valid_adult()], &valid_buyer(), Some(&token))
            .await
            .unwrap();

        assert_eq!(outcome.next, BookingStage::Confirmation);
        // Token preserved across the transition
        assert_eq!(outcome.access_token, Some(token));
        // Validation snapshot, write, then both re-fetches before the
        // outcome is produced
        assert_eq!(mock.calls(), vec!["details", "submit", "details", "access"]);
        assert!(outcome.grant.allows(BookingStage::Confirmation));
    }

    #[tokio::test]
    async fn test_authority_rejection_surfaced_verbatim() {
        let rejected = vec![ApiFieldError::field(
            "passengers[0].document_number".to_string(),
            vec!["Document number already used".to_string()],
        )];
        let mut mock = MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers]),
        );
        mock.submit_result = Some(AuthorityError::Rejected(rejected.clone()));
        let controller = BookingWorkflowController::new(Arc::new(mock));

        let result = controller
            .submit_passenger_stage("PNR123", &[valid_adult()], &valid_buyer(), None)
            .await;
        match result {
            Err(WorkflowError::Rejected(errors)) => assert_eq!(errors, rejected),
            other => panic!("expected rejection, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_non_field_failure_gets_generic_message() {
        let mut mock = MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers]),
        );
        mock.submit_result = Some(AuthorityError::Status(502));
        let controller = BookingWorkflowController::new(Arc::new(mock));

        let result = controller
            .submit_passenger_stage("PNR123", &[valid_adult()], &valid_buyer(), None)
            .await;
        match result {
            Err(WorkflowError::Transport(msg)) => assert_eq!(msg, GENERIC_FAILURE),
            other => panic!("expected transport error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_stale_response_superseded_by_newer_request() {
        let mut mock = MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers]),
        );
        mock.fetch_delay = Some(std::time::Duration::from_millis(10));
        let controller = BookingWorkflowController::new(Arc::new(mock));

        // Two overlapping entries: the first is superseded mid-fetch
        let (first, second) = tokio::join!(
            controller.enter_stage("PNR123", BookingStage::Passengers, None),
            controller.enter_stage("PNR123", BookingStage::Passengers, None),
        );
        assert!(matches!(first, Err(WorkflowError::Superseded)));
        assert!(second.is_ok());
    }

    #[test]
    fn test_countdown_source_per_stage() {
        let mut booking = booking_fixture();
        let hold = booking.expires_at;

        assert_eq!(
            countdown_source(BookingStage::Passengers, &booking),
            CountdownSource::BookingHold(hold)
        );
        assert_eq!(
            countdown_source(BookingStage::Confirmation, &booking),
            CountdownSource::BookingHold(hold)
        );
        assert_eq!(countdown_source(BookingStage::Completion, &booking), CountdownSource::Suppressed);

        let pay_expiry = Some(Utc::now() + Duration::minutes(5));
        booking.payment = Some(PaymentInfo { status: PaymentStatus::Pending, expires_at: pay_expiry });
        let source = countdown_source(BookingStage::Payment, &booking);
        assert_eq!(source, CountdownSource::PaymentHold(pay_expiry));
        assert_eq!(source.expires_at(), pay_expiry);

        // Settled payment suppresses the countdown everywhere
        booking.payment = Some(PaymentInfo { status: PaymentStatus::Succeeded, expires_at: pay_expiry });
        assert_eq!(countdown_source(BookingStage::Payment, &booking), CountdownSource::Suppressed);
        assert_eq!(countdown_source(BookingStage::Passengers, &booking), CountdownSource::Suppressed);

        // A failed payment is retryable within the hold, so the
        // countdown stays up
        booking.payment = Some(PaymentInfo { status: PaymentStatus::Failed, expires_at: pay_expiry });
        assert_eq!(
            countdown_source(BookingStage::Payment, &booking),
            CountdownSource::PaymentHold(pay_expiry)
        );
    }

    #[tokio::test]
    async fn test_end_to_end_adult_and_infant_eligibility() {
        // Outbound 2024-06-01; adult born exactly 12 years before is
        // accepted, an infant already 2 by departure is rejected with
        // the category age error
        let mock = Arc::new(MockAuthority::new(
            booking_fixture(),
            grant_fixture(&[BookingStage::Passengers, BookingStage::Confirmation]),
        ));
        let controller = BookingWorkflowController::new(mock.clone());

        let mut adult = valid_adult();
        adult.birth_date = NaiveDate::from_ymd_opt(2012, 6, 1);

        let mut infant = Passenger::slot(PassengerCategory::Infant);
        infant.last_name = "Иванова".to_string();
        infant.first_name = "Анна".to_string();
        infant.gender = Some(Gender::Female);
        infant.document_type = DocumentType::BirthCertificate;
        infant.document_number = "IV-АБ 123456".to_string();
        infant.birth_date = NaiveDate::from_ymd_opt(2022, 5, 1);

        let result = controller
            .submit_passenger_stage("PNR123", &[adult.clone(), infant.clone()], &valid_buyer(), None)
            .await;
        match result {
            Err(WorkflowError::Validation(errors)) => {
                assert!(!errors.keys().any(|k| k.starts_with("passengers[0].")));
                assert!(errors["passengers[1].birth_date"].contains("under 2 years old"));
            }
            other => panic!("expected validation error, got {:?}", other.err()),
        }

        // Fix the infant's birth date and the whole submission goes through
        infant.birth_date = NaiveDate::from_ymd_opt(2023, 1, 15);
        let outcome = controller
            .submit_passenger_stage("PNR123", &[adult, infant], &valid_buyer(), None)
            .await
            .unwrap();
        assert_eq!(outcome.next, BookingStage::Confirmation);
    }
}
