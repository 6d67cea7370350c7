use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use tracing::{info, warn};

use shared_api::BookingApiClient;

use crate::error::SchedulingError;
use crate::models::{Appointment, CreateAppointmentRequest, Selection};
use crate::services::availability::AvailabilityStore;

/// Remote path for appointment creation.
pub const APPOINTMENTS_PATH: &str = "appointments";

/// Validates a selection snapshot and issues the create-appointment request.
///
/// Every precondition failure returns before any network traffic; exactly
/// one remote write happens per successful submission and none is retried
/// automatically.
#[derive(Clone)]
pub struct BookingSubmitter {
    api: Arc<BookingApiClient>,
}

impl BookingSubmitter {
    pub fn new(api: Arc<BookingApiClient>) -> Self {
        Self { api }
    }

    pub async fn submit(
        &self,
        selection: &Selection,
        availability: &AvailabilityStore,
        auth_token: Option<&str>,
    ) -> Result<DateTime<Utc>, SchedulingError> {
        // A booking must carry a deliberate hour choice
        let hour = selection.hour.ok_or(SchedulingError::HourNotSelected)?;

        if !availability.contains_hour(hour) {
            return Err(SchedulingError::UnknownHour { hour });
        }
        if !availability.is_hour_available(hour) {
            return Err(SchedulingError::SlotUnavailable { hour });
        }

        let scheduled_for = selection
            .date
            .and_hms_opt(hour, 0, 0)
            .ok_or(SchedulingError::InvalidTime { hour })?
            .and_utc();

        let request = CreateAppointmentRequest {
            provider_id: selection.provider_id.clone(),
            date: scheduled_for,
        };

        info!(
            "Booking appointment with provider {} at {}",
            request.provider_id, request.date
        );

        let body = serde_json::to_value(&request)
            .map_err(|e| SchedulingError::SubmissionFailed(e.to_string()))?;

        let created: Appointment = self
            .api
            .request(Method::POST, APPOINTMENTS_PATH, auth_token, Some(body))
            .await
            .map_err(|e| {
                warn!("Appointment creation failed: {}", e);
                SchedulingError::SubmissionFailed(e.to_string())
            })?;

        info!("Appointment {} created for {}", created.id, scheduled_for);
        Ok(scheduled_for)
    }
}
