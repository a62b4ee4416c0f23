pub mod buyer;
pub mod duplicates;
pub mod eligibility;
pub mod passenger;
pub mod report;

pub use buyer::validate_buyer;
pub use duplicates::find_duplicates;
pub use eligibility::{birth_date_window, document_expiry_floor, document_expiry_valid, BirthWindow};
pub use passenger::validate_passenger;
pub use report::ValidationReport;
