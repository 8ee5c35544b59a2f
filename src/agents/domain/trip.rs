//! Trip planning types: the accumulating trip request, the planning state
//! machine, and the worker facet model.

use serde::{Deserialize, Serialize};

/// Reply language detected from the user's utterances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Default when detection is inconclusive
    #[default]
    English,
    Italian,
    Spanish,
    French,
    German,
}

impl Language {
    /// English name of the language, used in prompts
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Italian => "Italian",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
        }
    }
}

/// Required trip parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripField {
    Origin,
    Destination,
    Dates,
    Duration,
    Budget,
}

impl TripField {
    /// All required fields, in the order they are asked for
    pub const ALL: [TripField; 5] = [
        TripField::Origin,
        TripField::Destination,
        TripField::Dates,
        TripField::Duration,
        TripField::Budget,
    ];

    /// Stable key used for memory lookup and extraction
    pub fn key(&self) -> &'static str {
        match self {
            TripField::Origin => "origin",
            TripField::Destination => "destination",
            TripField::Dates => "dates",
            TripField::Duration => "duration",
            TripField::Budget => "budget",
        }
    }
}

/// The accumulating set of trip parameters, merged field by field as the
/// router extracts them from conversation turns. Fan-out is gated on
/// [`TripRequest::is_complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Departure city or airport
    pub origin: Option<String>,
    /// One or more destinations
    #[serde(default)]
    pub destinations: Vec<String>,
    /// Travel dates, month or season, as the user phrased them
    pub dates: Option<String>,
    /// Trip duration in days
    pub duration_days: Option<u32>,
    /// Budget range, as the user phrased it (e.g. "1500 EUR")
    pub budget: Option<String>,
    /// Detected reply language
    #[serde(default)]
    pub language: Language,
}

impl TripRequest {
    /// Required fields that are still missing
    pub fn missing_fields(&self) -> Vec<TripField> {
        let mut missing = Vec::new();
        if self.origin.is_none() {
            missing.push(TripField::Origin);
        }
        if self.destinations.is_empty() {
            missing.push(TripField::Destination);
        }
        if self.dates.is_none() {
            missing.push(TripField::Dates);
        }
        if self.duration_days.is_none() {
            missing.push(TripField::Duration);
        }
        if self.budget.is_none() {
            missing.push(TripField::Budget);
        }
        missing
    }

    /// Whether every required field is present. This is the structural guard
    /// for fan-out: workers are never invoked while this is false.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fill a single missing field from a recalled value. Returns true if
    /// the field was empty and is now set.
    pub fn fill_field(&mut self, field: TripField, value: &str) -> bool {
        match field {
            TripField::Origin if self.origin.is_none() => {
                self.origin = Some(value.to_string());
                true
            }
            TripField::Destination if self.destinations.is_empty() => {
                self.destinations.push(value.to_string());
                true
            }
            TripField::Dates if self.dates.is_none() => {
                self.dates = Some(value.to_string());
                true
            }
            TripField::Duration if self.duration_days.is_none() => {
                if let Ok(days) = value.trim().parse() {
                    self.duration_days = Some(days);
                    true
                } else {
                    false
                }
            }
            TripField::Budget if self.budget.is_none() => {
                self.budget = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    /// The parameter subset handed to a worker agent for one facet
    pub fn subtask(&self, facet: TravelFacet) -> SubTask {
        // Flights need the origin; hotels and activities do not.
        let origin = match facet {
            TravelFacet::Flight => self.origin.clone(),
            _ => None,
        };
        SubTask {
            facet,
            origin,
            destinations: self.destinations.clone(),
            dates: self.dates.clone(),
            duration_days: self.duration_days,
            budget: self.budget.clone(),
            language: self.language,
        }
    }
}

/// Explicit planning state machine for one conversation. The transition
/// guard out of `CollectingParameters` is "all required fields present".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanningPhase {
    /// Asking clarifying questions until the trip request is complete
    #[default]
    CollectingParameters,
    /// All three workers dispatched, waiting on the join barrier
    FanningOut,
    /// Combining worker results into trip packages
    Synthesizing,
    /// Packages delivered for the current planning cycle
    Done,
}

/// The three travel facets, one per worker agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelFacet {
    Flight,
    Hotel,
    Activities,
}

impl TravelFacet {
    /// Fixed output slot the worker's result is keyed by, so the router can
    /// locate results deterministically regardless of completion order.
    pub fn output_key(&self) -> &'static str {
        match self {
            TravelFacet::Flight => "flight_options",
            TravelFacet::Hotel => "hotel_options",
            TravelFacet::Activities => "activity_options",
        }
    }

    /// Bounds on the number of option records a worker may return
    pub fn option_bounds(&self) -> (usize, usize) {
        match self {
            TravelFacet::Flight => (2, 5),
            TravelFacet::Hotel => (2, 5),
            TravelFacet::Activities => (3, 5),
        }
    }

    /// Human-readable facet name for user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            TravelFacet::Flight => "flights",
            TravelFacet::Hotel => "hotels",
            TravelFacet::Activities => "activities",
        }
    }
}

impl std::fmt::Display for TravelFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output_key())
    }
}

/// The parameter subset a worker agent receives for one fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    pub facet: TravelFacet,
    pub origin: Option<String>,
    pub destinations: Vec<String>,
    pub dates: Option<String>,
    pub duration_days: Option<u32>,
    pub budget: Option<String>,
    pub language: Language,
}

/// One textual option record (price, time, provider are informal text)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionRecord {
    pub text: String,
}

impl OptionRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A worker agent's answer: an ordered, bounded list of option records
/// under the facet's fixed output key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetOptions {
    pub facet: TravelFacet,
    pub options: Vec<OptionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_tracks_each_parameter() {
        let mut trip = TripRequest::default();
        assert_eq!(trip.missing_fields().len(), 5);
        assert!(!trip.is_complete());

        trip.origin = Some("Rome".to_string());
        trip.destinations.push("Paris".to_string());
        trip.dates = Some("June 10-17".to_string());
        assert_eq!(
            trip.missing_fields(),
            vec![TripField::Duration, TripField::Budget]
        );

        trip.duration_days = Some(7);
        trip.budget = Some("1500 EUR".to_string());
        assert!(trip.is_complete());
    }

    #[test]
    fn fill_field_only_sets_empty_fields() {
        let mut trip = TripRequest {
            budget: Some("1500 EUR".to_string()),
            ..Default::default()
        };
        assert!(!trip.fill_field(TripField::Budget, "2000 EUR"));
        assert_eq!(trip.budget.as_deref(), Some("1500 EUR"));

        assert!(trip.fill_field(TripField::Origin, "Rome"));
        assert_eq!(trip.origin.as_deref(), Some("Rome"));

        assert!(trip.fill_field(TripField::Duration, "7"));
        assert_eq!(trip.duration_days, Some(7));
        assert!(!trip.fill_field(TripField::Duration, "9"));
    }

    #[test]
    fn subtask_scopes_origin_to_flights() {
        let trip = TripRequest {
            origin: Some("Rome".to_string()),
            destinations: vec!["Paris".to_string()],
            dates: Some("June".to_string()),
            duration_days: Some(7),
            budget: Some("1500 EUR".to_string()),
            language: Language::English,
        };

        assert_eq!(
            trip.subtask(TravelFacet::Flight).origin.as_deref(),
            Some("Rome")
        );
        assert!(trip.subtask(TravelFacet::Hotel).origin.is_none());
        assert!(trip.subtask(TravelFacet::Activities).origin.is_none());
    }
}
