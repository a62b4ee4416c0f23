pub mod booking;
pub mod error;
pub mod passenger;
pub mod price;
pub mod stage;

pub use booking::{AccessGrant, AccessToken, Booking, BookingStatus, Buyer, Direction, PaymentInfo, PaymentStatus};
pub use error::{normalize_error_payload, parse_error_payload, ApiFieldError, CoreError, CoreResult};
pub use passenger::{DocumentProfile, DocumentType, Gender, Passenger, PassengerCategory, ScriptFamily};
pub use price::{CategoryPrice, DirectionPrice, PriceDetails};
pub use stage::BookingStage;
