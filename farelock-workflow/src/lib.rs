pub mod authority;
pub mod config;
pub mod controller;
pub mod countdown;
pub mod gate;

pub use authority::{AuthorityError, BookingAuthority, HttpAuthority, SubmitPassengersRequest};
pub use config::{AuthorityConfig, WorkflowConfig};
pub use controller::{countdown_source, BookingWorkflowController, CountdownSource, StageEntry, StageView, SubmitOutcome, WorkflowError};
pub use countdown::{format_remaining, remaining, CountdownClock, CountdownHandle};
pub use gate::{resolve, GateOutcome};
