use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

// ==============================================================================
// REMOTE MODELS
// ==============================================================================

/// A bookable service professional, as returned by `GET providers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
}

/// One hour-of-day slot's bookable status for one provider on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityItem {
    pub hour: u32,
    pub available: bool,
}

/// The created appointment record. Opaque to this cell beyond confirming
/// that the booking went through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub provider_id: String,
    pub date: DateTime<Utc>,
}

// ==============================================================================
// DERIVED VIEWS
// ==============================================================================

/// An availability item enriched with its display label, ready for the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSlot {
    pub hour: u32,
    pub available: bool,
    pub label: String,
}

impl HourSlot {
    pub fn from_item(item: &AvailabilityItem) -> Self {
        Self {
            hour: item.hour,
            available: item.available,
            label: format_hour_label(item.hour),
        }
    }
}

/// Zero-padded 24-hour label, e.g. 9 -> "09:00".
pub fn format_hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Half-day bucket. The boundary is fixed: hours below 12 are morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
}

impl DayPeriod {
    pub fn contains(&self, hour: u32) -> bool {
        match self {
            DayPeriod::Morning => hour < 12,
            DayPeriod::Afternoon => hour >= 12,
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPeriod::Morning => write!(f, "morning"),
            DayPeriod::Afternoon => write!(f, "afternoon"),
        }
    }
}

// ==============================================================================
// SELECTION MODELS
// ==============================================================================

/// The user's in-progress provider/date/hour choice prior to submission.
///
/// `hour` is `None` until the user has deliberately picked a slot; midnight
/// is a legitimate value and never doubles as "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub provider_id: String,
    pub date: NaiveDate,
    pub hour: Option<u32>,
}

impl Selection {
    pub fn availability_key(&self) -> AvailabilityKey {
        AvailabilityKey {
            provider_id: self.provider_id.clone(),
            date: self.date,
        }
    }
}

/// The (provider, date) pair an availability fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityKey {
    pub provider_id: String,
    pub date: NaiveDate,
}

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

/// Payload for `POST appointments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub provider_id: String,
    pub date: DateTime<Utc>,
}

/// Outcome notifications consumed by the navigation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    BookingConfirmed { scheduled_for: DateTime<Utc> },
    BookingFailed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_label_is_zero_padded() {
        assert_eq!(format_hour_label(9), "09:00");
        assert_eq!(format_hour_label(15), "15:00");
        assert_eq!(format_hour_label(0), "00:00");
    }

    #[test]
    fn test_day_period_boundary() {
        assert!(DayPeriod::Morning.contains(0));
        assert!(DayPeriod::Morning.contains(11));
        assert!(!DayPeriod::Morning.contains(12));
        assert!(DayPeriod::Afternoon.contains(12));
        assert!(DayPeriod::Afternoon.contains(23));
        assert!(!DayPeriod::Afternoon.contains(11));
    }

    #[test]
    fn test_slot_from_item_carries_label() {
        let slot = HourSlot::from_item(&AvailabilityItem { hour: 8, available: true });
        assert_eq!(slot.hour, 8);
        assert!(slot.available);
        assert_eq!(slot.label, "08:00");
    }
}
