use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_api::BookingApiClient;
use shared_config::AppConfig;

use crate::error::SchedulingError;
use crate::models::{AvailabilityItem, HourSlot, Provider, Selection};
use crate::services::availability::{day_availability_path, AvailabilityStore};
use crate::services::booking::BookingSubmitter;
use crate::services::notifications::{SessionEventReceiver, SessionNotifier};
use crate::services::providers::{ProviderDirectory, PROVIDERS_PATH};
use crate::services::selection::SelectionState;

/// User-displayable text broadcast when a submission fails.
const BOOKING_FAILURE_MESSAGE: &str =
    "There was an error while creating the appointment, please try again";

struct SessionInner {
    directory: ProviderDirectory,
    availability: AvailabilityStore,
    selection: SelectionState,
}

/// The scheduling surface handed to the presentation layer: the current
/// provider list, the morning/afternoon slot views, the selection snapshot,
/// a submit entry point and the notification channel for booking outcomes.
///
/// Clones share the same state, so the presentation and navigation layers
/// can each hold a handle.
pub struct SchedulingSession {
    api: Arc<BookingApiClient>,
    inner: Arc<RwLock<SessionInner>>,
    submitter: BookingSubmitter,
    notifier: SessionNotifier,
    auth_token: Option<String>,
}

impl SchedulingSession {
    /// Builds the session for the provider handed over by navigation and
    /// performs the initial fetches: the provider list and today's
    /// availability. Fetch failures are not fatal here; the affected data
    /// starts empty and stale and refreshes on the next selection change.
    pub async fn connect(
        config: &AppConfig,
        initial_provider_id: impl Into<String>,
        auth_token: Option<String>,
    ) -> Result<Self, SchedulingError> {
        let api = Arc::new(BookingApiClient::new(config));
        let selection = SelectionState::new(initial_provider_id, Utc::now().date_naive())?;

        let session = Self {
            submitter: BookingSubmitter::new(Arc::clone(&api)),
            inner: Arc::new(RwLock::new(SessionInner {
                directory: ProviderDirectory::new(),
                availability: AvailabilityStore::new(),
                selection,
            })),
            notifier: SessionNotifier::new(),
            api,
            auth_token,
        };

        if let Err(e) = session.refresh_providers().await {
            warn!("Initial provider list fetch failed: {}", e);
        }
        if let Err(e) = session.refresh_availability().await {
            warn!("Initial availability fetch failed: {}", e);
        }

        Ok(session)
    }

    /// Re-fetches the provider list, replacing it wholesale. The previous
    /// list survives a failed fetch.
    pub async fn refresh_providers(&self) -> Result<(), SchedulingError> {
        debug!("Fetching provider list");

        let providers: Vec<Provider> = self
            .api
            .request(Method::GET, PROVIDERS_PATH, self.auth_token.as_deref(), None)
            .await
            .map_err(|e| SchedulingError::FetchFailed(e.to_string()))?;

        self.inner.write().await.directory.replace(providers);
        Ok(())
    }

    /// Fetches availability for the currently selected provider and date.
    ///
    /// The fetch is keyed by the (provider, date) it was issued for; if the
    /// selection moves on while the request is in flight, the late response
    /// is discarded and the fetch issued for the new key wins.
    pub async fn refresh_availability(&self) -> Result<(), SchedulingError> {
        let (key, ticket) = {
            let mut inner = self.inner.write().await;
            let key = inner.selection.availability_key();
            let ticket = inner.availability.begin_fetch(key.clone());
            (key, ticket)
        };

        let path = day_availability_path(&key);
        let result: Result<Vec<AvailabilityItem>, _> = self
            .api
            .request(Method::GET, &path, self.auth_token.as_deref(), None)
            .await;

        let mut inner = self.inner.write().await;
        match result {
            Ok(items) => {
                inner.availability.complete_fetch(ticket, items);
                Ok(())
            }
            Err(e) => {
                inner.availability.fail_fetch(ticket);
                Err(SchedulingError::FetchFailed(e.to_string()))
            }
        }
    }

    /// Switches the selected provider. A real change resets the hour choice
    /// and triggers exactly one availability fetch for the new key.
    pub async fn select_provider(
        &self,
        provider_id: impl Into<String>,
    ) -> Result<(), SchedulingError> {
        let changed = self.inner.write().await.selection.set_provider(provider_id);
        if changed {
            self.refresh_availability().await?;
        }
        Ok(())
    }

    /// Switches the selected date. Only a calendar-date change resets the
    /// hour and refetches; intra-day time changes are no-ops.
    pub async fn select_date(&self, instant: DateTime<Utc>) -> Result<(), SchedulingError> {
        let changed = self.inner.write().await.selection.set_date(instant);
        if changed {
            self.refresh_availability().await?;
        }
        Ok(())
    }

    /// Picks an hour out of the currently loaded availability.
    pub async fn select_hour(&self, hour: u32) -> Result<(), SchedulingError> {
        let mut guard = self.inner.write().await;
        let SessionInner {
            availability,
            selection,
            ..
        } = &mut *guard;
        selection.set_hour(hour, availability)
    }

    /// Validates the current selection and issues the booking request.
    ///
    /// The outcome is also broadcast on the notification channel. The
    /// selection is left untouched either way, so a failed submission can be
    /// retried as-is by the user.
    pub async fn submit(&self) -> Result<DateTime<Utc>, SchedulingError> {
        let (selection, availability) = {
            let inner = self.inner.read().await;
            (inner.selection.selection(), inner.availability.clone())
        };

        match self
            .submitter
            .submit(&selection, &availability, self.auth_token.as_deref())
            .await
        {
            Ok(scheduled_for) => {
                self.notifier.notify_confirmed(scheduled_for);
                Ok(scheduled_for)
            }
            Err(e) => {
                self.notifier.notify_failed(BOOKING_FAILURE_MESSAGE);
                Err(e)
            }
        }
    }

    /// Notification channel carrying booking confirmations (with the booked
    /// instant) and user-displayable failures.
    pub fn subscribe(&self) -> SessionEventReceiver {
        self.notifier.subscribe()
    }

    pub async fn providers(&self) -> Vec<Provider> {
        self.inner.read().await.directory.providers().to_vec()
    }

    pub async fn morning_slots(&self) -> Vec<HourSlot> {
        self.inner.read().await.availability.morning_slots()
    }

    pub async fn afternoon_slots(&self) -> Vec<HourSlot> {
        self.inner.read().await.availability.afternoon_slots()
    }

    pub async fn selection(&self) -> Selection {
        self.inner.read().await.selection.selection()
    }

    /// True while the store is showing data kept from before a failed fetch.
    pub async fn availability_is_stale(&self) -> bool {
        self.inner.read().await.availability.is_stale()
    }

    /// Whether the chosen hour is present and bookable right now; the
    /// presentation layer uses this to gate the submit control.
    pub async fn hour_is_valid(&self) -> bool {
        let inner = self.inner.read().await;
        inner.selection.is_hour_valid(&inner.availability)
    }
}

impl Clone for SchedulingSession {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            inner: Arc::clone(&self.inner),
            submitter: self.submitter.clone(),
            notifier: self.notifier.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}
