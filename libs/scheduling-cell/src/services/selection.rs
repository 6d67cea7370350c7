use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::SchedulingError;
use crate::models::{AvailabilityKey, Selection};
use crate::services::availability::AvailabilityStore;

/// Tracks the user's current provider, date and hour choice and enforces
/// the allowed transitions between them.
///
/// The hour is dependent state: it only means something relative to the
/// availability loaded for the current provider and date, so any provider
/// or calendar-date change clears it.
#[derive(Debug, Clone)]
pub struct SelectionState {
    selection: Selection,
}

impl SelectionState {
    /// `provider_id` comes from the navigation collaborator and must be
    /// non-empty; `today` is the calendar date at construction time.
    pub fn new(provider_id: impl Into<String>, today: NaiveDate) -> Result<Self, SchedulingError> {
        let provider_id = provider_id.into();
        if provider_id.is_empty() {
            return Err(SchedulingError::MissingProvider);
        }

        Ok(Self {
            selection: Selection {
                provider_id,
                date: today,
                hour: None,
            },
        })
    }

    /// Replaces the provider. Returns whether it actually changed; a change
    /// resets the hour choice and requires a fresh availability fetch.
    pub fn set_provider(&mut self, provider_id: impl Into<String>) -> bool {
        let provider_id = provider_id.into();
        if provider_id.is_empty() {
            warn!("Ignoring empty provider id");
            return false;
        }
        if provider_id == self.selection.provider_id {
            return false;
        }

        debug!("Provider changed to {}", provider_id);
        self.selection.provider_id = provider_id;
        self.selection.hour = None;
        true
    }

    /// Replaces the date. Only the calendar-date portion of `instant` is
    /// kept; an intra-day time change is not a change at all, so it neither
    /// resets the hour nor asks for a reload.
    pub fn set_date(&mut self, instant: DateTime<Utc>) -> bool {
        let date = instant.date_naive();
        if date == self.selection.date {
            return false;
        }

        debug!("Date changed to {}", date);
        self.selection.date = date;
        self.selection.hour = None;
        true
    }

    /// Picks an hour slot. The hour must be part of the currently loaded
    /// availability; a slot that is present but marked unavailable is still
    /// selectable here (the presentation layer disables its control) and is
    /// rejected at submission time instead.
    pub fn set_hour(
        &mut self,
        hour: u32,
        availability: &AvailabilityStore,
    ) -> Result<(), SchedulingError> {
        if !availability.contains_hour(hour) {
            return Err(SchedulingError::UnknownHour { hour });
        }

        debug!("Hour {} selected", hour);
        self.selection.hour = Some(hour);
        Ok(())
    }

    pub fn clear_hour(&mut self) {
        self.selection.hour = None;
    }

    /// Read-only snapshot of the current picks.
    pub fn selection(&self) -> Selection {
        self.selection.clone()
    }

    pub fn availability_key(&self) -> AvailabilityKey {
        self.selection.availability_key()
    }

    /// Whether the chosen hour is present and bookable in the availability
    /// loaded right now. Callers use this to gate submission.
    pub fn is_hour_valid(&self, availability: &AvailabilityStore) -> bool {
        match self.selection.hour {
            Some(hour) => availability.is_hour_available(hour),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AvailabilityItem;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn loaded_store(items: Vec<AvailabilityItem>) -> AvailabilityStore {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_fetch(AvailabilityKey {
            provider_id: "p1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        });
        store.complete_fetch(ticket, items);
        store
    }

    fn state() -> SelectionState {
        SelectionState::new("p1", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_initial_provider_is_rejected() {
        let result = SelectionState::new("", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_matches!(result, Err(SchedulingError::MissingProvider));
    }

    #[test]
    fn test_provider_change_clears_hour() {
        let store = loaded_store(vec![AvailabilityItem { hour: 9, available: true }]);
        let mut state = state();

        state.set_hour(9, &store).unwrap();
        assert_eq!(state.selection().hour, Some(9));

        assert!(state.set_provider("p2"));
        assert_eq!(state.selection().hour, None);
        assert_eq!(state.selection().provider_id, "p2");
    }

    #[test]
    fn test_same_provider_is_not_a_change() {
        let mut state = state();
        assert!(!state.set_provider("p1"));
    }

    #[test]
    fn test_calendar_date_change_clears_hour() {
        let store = loaded_store(vec![AvailabilityItem { hour: 9, available: true }]);
        let mut state = state();
        state.set_hour(9, &store).unwrap();

        let next_day = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        assert!(state.set_date(next_day));
        assert_eq!(state.selection().hour, None);
        assert_eq!(
            state.selection().date,
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }

    #[test]
    fn test_intra_day_time_change_is_ignored() {
        let store = loaded_store(vec![AvailabilityItem { hour: 9, available: true }]);
        let mut state = state();
        state.set_hour(9, &store).unwrap();

        let same_day_evening = Utc.with_ymd_and_hms(2024, 3, 10, 19, 30, 0).unwrap();
        assert!(!state.set_date(same_day_evening));
        // The hour survives because nothing about the selection changed
        assert_eq!(state.selection().hour, Some(9));
    }

    #[test]
    fn test_hour_must_exist_in_loaded_availability() {
        let store = loaded_store(vec![AvailabilityItem { hour: 9, available: true }]);
        let mut state = state();

        assert_matches!(
            state.set_hour(10, &store),
            Err(SchedulingError::UnknownHour { hour: 10 })
        );
        assert_eq!(state.selection().hour, None);
    }

    #[test]
    fn test_unavailable_hour_is_selectable_but_not_valid() {
        let store = loaded_store(vec![AvailabilityItem { hour: 14, available: false }]);
        let mut state = state();

        state.set_hour(14, &store).unwrap();
        assert_eq!(state.selection().hour, Some(14));
        assert!(!state.is_hour_valid(&store));
    }

    #[test]
    fn test_available_hour_is_valid() {
        let store = loaded_store(vec![AvailabilityItem { hour: 9, available: true }]);
        let mut state = state();

        state.set_hour(9, &store).unwrap();
        assert!(state.is_hour_valid(&store));
    }
}
