use chrono::Datelike;
use tracing::{debug, warn};

use crate::models::{AvailabilityItem, AvailabilityKey, DayPeriod, HourSlot};

/// Remote path for the day-availability query of `key`, keyed by the
/// calendar-date parts only.
pub fn day_availability_path(key: &AvailabilityKey) -> String {
    format!(
        "providers/{}/day-availability?year={}&month={}&day={}",
        key.provider_id,
        key.date.year(),
        key.date.month(),
        key.date.day()
    )
}

/// Identifies one outstanding availability fetch. Only the most recently
/// issued ticket may apply its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    number: u64,
    key: AvailabilityKey,
}

impl FetchTicket {
    pub fn key(&self) -> &AvailabilityKey {
        &self.key
    }
}

/// Owns the raw availability collection for the currently selected
/// provider+date and derives the morning/afternoon bucket views.
///
/// The store never performs IO itself; the session begins a fetch, performs
/// the remote call, and hands the outcome back. Responses of superseded
/// fetches are discarded so that the last issued fetch always wins.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityStore {
    items: Vec<AvailabilityItem>,
    loaded_for: Option<AvailabilityKey>,
    stale: bool,
    last_ticket: u64,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an outstanding fetch for `key`.
    pub fn begin_fetch(&mut self, key: AvailabilityKey) -> FetchTicket {
        self.last_ticket += 1;
        debug!(
            "Availability fetch #{} for provider {} on {}",
            self.last_ticket, key.provider_id, key.date
        );
        FetchTicket {
            number: self.last_ticket,
            key,
        }
    }

    /// Applies a completed fetch, replacing the collection wholesale.
    /// Returns false when the response arrived for a superseded fetch and
    /// was discarded.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, items: Vec<AvailabilityItem>) -> bool {
        if ticket.number != self.last_ticket {
            debug!(
                "Discarding stale availability response #{} (newest is #{})",
                ticket.number, self.last_ticket
            );
            return false;
        }

        self.items = items;
        self.loaded_for = Some(ticket.key);
        self.stale = false;
        true
    }

    /// Records a failed fetch. The previous items are retained so the view
    /// does not flash all-unavailable; they are flagged stale instead.
    pub fn fail_fetch(&mut self, ticket: FetchTicket) {
        if ticket.number != self.last_ticket {
            debug!(
                "Ignoring failure of superseded availability fetch #{}",
                ticket.number
            );
            return;
        }

        warn!(
            "Availability fetch #{} failed, keeping previous data as stale",
            ticket.number
        );
        self.stale = true;
    }

    pub fn items(&self) -> &[AvailabilityItem] {
        &self.items
    }

    /// The (provider, date) the current items were loaded for, if any fetch
    /// has completed yet.
    pub fn loaded_for(&self) -> Option<&AvailabilityKey> {
        self.loaded_for.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn morning_slots(&self) -> Vec<HourSlot> {
        self.slots_for(DayPeriod::Morning)
    }

    pub fn afternoon_slots(&self) -> Vec<HourSlot> {
        self.slots_for(DayPeriod::Afternoon)
    }

    fn slots_for(&self, period: DayPeriod) -> Vec<HourSlot> {
        let mut slots: Vec<HourSlot> = self
            .items
            .iter()
            .filter(|item| period.contains(item.hour))
            .map(HourSlot::from_item)
            .collect();

        // Remote ordering is not trusted
        slots.sort_by_key(|slot| slot.hour);
        slots
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        self.items.iter().any(|item| item.hour == hour)
    }

    pub fn is_hour_available(&self, hour: u32) -> bool {
        self.items
            .iter()
            .any(|item| item.hour == hour && item.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(provider_id: &str, year: i32, month: u32, day: u32) -> AvailabilityKey {
        AvailabilityKey {
            provider_id: provider_id.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        }
    }

    fn item(hour: u32, available: bool) -> AvailabilityItem {
        AvailabilityItem { hour, available }
    }

    #[test]
    fn test_day_availability_path() {
        let path = day_availability_path(&key("p1", 2024, 3, 10));
        assert_eq!(path, "providers/p1/day-availability?year=2024&month=3&day=10");
    }

    #[test]
    fn test_slots_partition_at_noon() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_fetch(key("p1", 2024, 3, 10));
        assert!(store.complete_fetch(
            ticket,
            vec![item(8, true), item(11, false), item(12, true), item(17, true)],
        ));

        let morning: Vec<u32> = store.morning_slots().iter().map(|s| s.hour).collect();
        let afternoon: Vec<u32> = store.afternoon_slots().iter().map(|s| s.hour).collect();

        assert_eq!(morning, vec![8, 11]);
        assert_eq!(afternoon, vec![12, 17]);

        // Union reconstructs the collection exactly once per hour
        let mut union: Vec<u32> = morning.into_iter().chain(afternoon).collect();
        union.sort_unstable();
        assert_eq!(union, vec![8, 11, 12, 17]);
    }

    #[test]
    fn test_slots_are_sorted_even_when_remote_is_not() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_fetch(key("p1", 2024, 3, 10));
        store.complete_fetch(ticket, vec![item(10, true), item(8, true), item(9, false)]);

        let hours: Vec<u32> = store.morning_slots().iter().map(|s| s.hour).collect();
        assert_eq!(hours, vec![8, 9, 10]);
    }

    #[test]
    fn test_slot_labels() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_fetch(key("p1", 2024, 3, 10));
        store.complete_fetch(ticket, vec![item(9, true), item(15, false)]);

        assert_eq!(store.morning_slots()[0].label, "09:00");
        assert_eq!(store.afternoon_slots()[0].label, "15:00");
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut store = AvailabilityStore::new();

        let first = store.begin_fetch(key("a", 2024, 3, 10));
        let second = store.begin_fetch(key("b", 2024, 3, 10));

        assert!(store.complete_fetch(second, vec![item(14, true)]));
        // The older response arrives afterwards and must not clobber
        assert!(!store.complete_fetch(first, vec![item(9, true)]));

        assert_eq!(store.items(), &[item(14, true)][..]);
        assert_eq!(store.loaded_for().unwrap().provider_id, "b");
    }

    #[test]
    fn test_failed_fetch_retains_previous_items() {
        let mut store = AvailabilityStore::new();

        let first = store.begin_fetch(key("a", 2024, 3, 10));
        store.complete_fetch(first, vec![item(9, true)]);
        assert!(!store.is_stale());

        let second = store.begin_fetch(key("a", 2024, 3, 11));
        store.fail_fetch(second);

        assert_eq!(store.items(), &[item(9, true)][..]);
        assert!(store.is_stale());
    }

    #[test]
    fn test_successful_fetch_clears_stale_flag() {
        let mut store = AvailabilityStore::new();

        let first = store.begin_fetch(key("a", 2024, 3, 10));
        store.fail_fetch(first);
        assert!(store.is_stale());

        let second = store.begin_fetch(key("a", 2024, 3, 10));
        store.complete_fetch(second, vec![item(9, true)]);
        assert!(!store.is_stale());
    }

    #[test]
    fn test_hour_probes() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_fetch(key("a", 2024, 3, 10));
        store.complete_fetch(ticket, vec![item(9, true), item(14, false)]);

        assert!(store.contains_hour(9));
        assert!(store.contains_hour(14));
        assert!(!store.contains_hour(10));

        assert!(store.is_hour_available(9));
        assert!(!store.is_hour_available(14));
        assert!(!store.is_hour_available(10));
    }
}
