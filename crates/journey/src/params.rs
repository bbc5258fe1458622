//! Journey search parameters.
//!
//! Field names are snake_case on the tool side (what the model sends) and
//! camelCase on the wire (what the search API expects).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use wayfarer_core::error::SearchError;

/// Declare a closed set of wire values with their exact spelling.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }
    };
}

wire_enum!(
    /// Modes of transport.
    Mode {
        Bus => "public-bus",
        Tube => "tube",
        Train => "train",
        Overground => "overground",
        River => "river",
        Tram => "tram",
        Walking => "walking",
        Cycle => "cycle",
        Coach => "coach",
    }
);

wire_enum!(AccessibilityPreference {
    NoSolidStairs => "noSolidStairs",
    NoEscalators => "noEscalators",
    NoElevators => "noElevators",
    StepFreeToVehicle => "stepFreeToVehicle",
    StepFreeToPlatform => "stepFreeToPlatform",
});

wire_enum!(WalkingSpeed {
    Slow => "slow",
    Average => "average",
    Fast => "fast",
});

wire_enum!(
    /// What the search should optimise for.
    JourneyPreference {
        LeastInterchange => "leastinterchange",
        LeastWalking => "leastwalking",
        LeastTime => "leasttime",
    }
);

wire_enum!(CyclePreference {
    AllTheWay => "allTheWay",
    LeaveAtStation => "leaveAtStation",
    TakeOnTransport => "takeOnTransport",
    CycleHire => "cycleHire",
});

wire_enum!(Adjustment {
    TripFirst => "TripFirst",
    TripLast => "TripLast",
});

wire_enum!(BikeProficiency {
    Easy => "easy",
    Moderate => "moderate",
    Fast => "fast",
});

wire_enum!(
    /// Whether `time` is a departure or an arrival time.
    TimeIs {
        Departing => "departing",
        Arriving => "arriving",
    }
);

/// Optional search parameters; unset fields are left to the search API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneySearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_search: Option<bool>,
    /// YYYYMMDD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// HHMM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_is: Option<TimeIs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey_preference: Option<JourneyPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Vec<Mode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_preference: Option<Vec<AccessibilityPreference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_transfer_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_walking_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walking_speed: Option<WalkingSpeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_preference: Option<CyclePreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bike_proficiency: Option<Vec<BikeProficiency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_cycle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_walking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walking_optimization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxi_only_trip: Option<bool>,
}

impl JourneySearchParams {
    /// Parse and validate parameters from tool arguments or config.
    pub fn from_value(value: Value) -> Result<Self, SearchError> {
        let params: Self = serde_json::from_value(value)
            .map_err(|e| SearchError::InvalidParameter(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if let Some(date) = &self.date {
            NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| {
                SearchError::InvalidParameter(format!("date '{date}' must be in format YYYYMMDD"))
            })?;
        }
        if let Some(time) = &self.time {
            NaiveTime::parse_from_str(time, "%H%M").map_err(|_| {
                SearchError::InvalidParameter(format!("time '{time}' must be in format HHMM"))
            })?;
        }
        Ok(())
    }

    /// Field-by-field overlay: every field set in `overrides` wins.
    pub fn overlay(&self, overrides: &Self) -> Self {
        Self {
            via: overrides.via.clone().or_else(|| self.via.clone()),
            national_search: overrides.national_search.or(self.national_search),
            date: overrides.date.clone().or_else(|| self.date.clone()),
            time: overrides.time.clone().or_else(|| self.time.clone()),
            time_is: overrides.time_is.or(self.time_is),
            journey_preference: overrides.journey_preference.or(self.journey_preference),
            mode: overrides.mode.clone().or_else(|| self.mode.clone()),
            accessibility_preference: overrides
                .accessibility_preference
                .clone()
                .or_else(|| self.accessibility_preference.clone()),
            from_name: overrides.from_name.clone().or_else(|| self.from_name.clone()),
            to_name: overrides.to_name.clone().or_else(|| self.to_name.clone()),
            via_name: overrides.via_name.clone().or_else(|| self.via_name.clone()),
            max_transfer_minutes: overrides.max_transfer_minutes.or(self.max_transfer_minutes),
            max_walking_minutes: overrides.max_walking_minutes.or(self.max_walking_minutes),
            walking_speed: overrides.walking_speed.or(self.walking_speed),
            cycle_preference: overrides.cycle_preference.or(self.cycle_preference),
            adjustment: overrides.adjustment.or(self.adjustment),
            bike_proficiency: overrides
                .bike_proficiency
                .clone()
                .or_else(|| self.bike_proficiency.clone()),
            alternative_cycle: overrides.alternative_cycle.or(self.alternative_cycle),
            alternative_walking: overrides.alternative_walking.or(self.alternative_walking),
            walking_optimization: overrides.walking_optimization.or(self.walking_optimization),
            taxi_only_trip: overrides.taxi_only_trip.or(self.taxi_only_trip),
        }
    }

    /// Render as camelCase query parameters; lists are comma-joined.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let Ok(Value::Object(fields)) = serde_json::to_value(self) else {
            return Vec::new();
        };

        fields
            .into_iter()
            .filter_map(|(key, value)| query_value(&value).map(|v| (camel_case(&key), v)))
            .collect()
    }

    /// JSON-schema properties describing every parameter, for tool descriptors.
    pub fn schema_properties() -> Map<String, Value> {
        fn values<T>(all: &[T], as_str: fn(&T) -> &'static str) -> Vec<&'static str> {
            all.iter().map(as_str).collect()
        }

        let properties = json!({
            "via": {"type": "string", "description": "A location the journey must pass through"},
            "national_search": {"type": "boolean", "description": "Search beyond London"},
            "date": {"type": "string", "description": "Date of travel, format YYYYMMDD"},
            "time": {"type": "string", "description": "Time of travel, format HHMM"},
            "time_is": {"type": "string", "enum": values(TimeIs::ALL, TimeIs::as_str)},
            "journey_preference": {
                "type": "string",
                "enum": values(JourneyPreference::ALL, JourneyPreference::as_str)
            },
            "mode": {
                "type": "array",
                "items": {"type": "string", "enum": values(Mode::ALL, Mode::as_str)}
            },
            "accessibility_preference": {
                "type": "array",
                "items": {
                    "type": "string",
                    "enum": values(AccessibilityPreference::ALL, AccessibilityPreference::as_str)
                }
            },
            "from_name": {"type": "string"},
            "to_name": {"type": "string"},
            "via_name": {"type": "string"},
            "max_transfer_minutes": {"type": "integer", "minimum": 0},
            "max_walking_minutes": {"type": "integer", "minimum": 0},
            "walking_speed": {"type": "string", "enum": values(WalkingSpeed::ALL, WalkingSpeed::as_str)},
            "cycle_preference": {
                "type": "string",
                "enum": values(CyclePreference::ALL, CyclePreference::as_str)
            },
            "adjustment": {"type": "string", "enum": values(Adjustment::ALL, Adjustment::as_str)},
            "bike_proficiency": {
                "type": "array",
                "items": {"type": "string", "enum": values(BikeProficiency::ALL, BikeProficiency::as_str)}
            },
            "alternative_cycle": {"type": "boolean"},
            "alternative_walking": {"type": "boolean"},
            "walking_optimization": {"type": "boolean"},
            "taxi_only_trip": {"type": "boolean"},
        });

        match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
