use async_trait::async_trait;
use farelock_core::{
    parse_error_payload, AccessGrant, AccessToken, ApiFieldError, Booking, Buyer, Passenger,
};
use serde::Serialize;

use crate::config::AuthorityConfig;

#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// The write was rejected with a renderable error set, already
    /// normalized from whichever wire shape the authority used.
    #[error("Request rejected by the booking authority")]
    Rejected(Vec<ApiFieldError>),

    /// Network-level failure; the user may retry.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response with no usable error body.
    #[error("Unexpected status {0} from the booking authority")]
    Status(u16),
}

/// The atomic passenger-stage write: buyer and all passenger slots in
/// one request.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitPassengersRequest {
    pub public_id: String,
    pub buyer: Buyer,
    pub passengers: Vec<Passenger>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Boundary to the booking authority. The server owns booking state,
/// pricing and stage access; the client only reads snapshots and
/// appends passengers/buyer.
#[async_trait]
pub trait BookingAuthority: Send + Sync {
    async fn fetch_details(
        &self,
        public_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<Booking, AuthorityError>;

    async fn fetch_access(
        &self,
        public_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<AccessGrant, AuthorityError>;

    async fn submit_passengers(
        &self,
        request: SubmitPassengersRequest,
    ) -> Result<Booking, AuthorityError>;

    /// Ancillary incremental flow: list saved passengers.
    async fn fetch_passengers(
        &self,
        public_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<Vec<Passenger>, AuthorityError>;

    /// Ancillary incremental flow: save a single passenger slot.
    async fn save_passenger(
        &self,
        public_id: &str,
        passenger: &Passenger,
        token: Option<&AccessToken>,
    ) -> Result<Passenger, AuthorityError>;
}

/// REST implementation of the authority boundary.
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    pub fn new(config: &AuthorityConfig) -> Result<Self, AuthorityError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token_query(token: Option<&AccessToken>) -> Vec<(&'static str, String)> {
        token
            .map(|t| vec![("access_token", t.as_str().to_string())])
            .unwrap_or_default()
    }

    /// Decode a response: 2xx bodies deserialize into `T`, everything
    /// else is normalized into the error taxonomy at the boundary.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthorityError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| AuthorityError::Transport(e.to_string()));
        }
        let code = status.as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        match parse_error_payload(&body) {
            Ok(errors) if !errors.is_empty() => Err(AuthorityError::Rejected(errors)),
            // Unrecognized or non-JSON body: fall back to the status code
            _ => Err(AuthorityError::Status(code)),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<T, AuthorityError> {
        let response = self
            .client
            .get(self.url(path))
            .query(&Self::token_query(token))
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, AuthorityError> {
        let response = self
            .client
            .post(self.url(path))
            .query(&Self::token_query(token))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        Self::decode(response).await
    }
}

#[async_trait]
impl BookingAuthority for HttpAuthority {
    async fn fetch_details(
        &self,
        public_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<Booking, AuthorityError> {
        self.get(&format!("/bookings/{}/details", public_id), token).await
    }

    async fn fetch_access(
        &self,
        public_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<AccessGrant, AuthorityError> {
        self.get(&format!("/bookings/{}/access", public_id), token).await
    }

    async fn submit_passengers(
        &self,
        request: SubmitPassengersRequest,
    ) -> Result<Booking, AuthorityError> {
        // Token travels in the body for this endpoint
        self.post("/bookings/process/passengers", &request, None).await
    }

    async fn fetch_passengers(
        &self,
        public_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<Vec<Passenger>, AuthorityError> {
        self.get(&format!("/bookings/{}/passengers", public_id), token).await
    }

    async fn save_passenger(
        &self,
        public_id: &str,
        passenger: &Passenger,
        token: Option<&AccessToken>,
    ) -> Result<Passenger, AuthorityError> {
        self.post(&format!("/bookings/{}/passengers", public_id), passenger, token).await
    }
}
