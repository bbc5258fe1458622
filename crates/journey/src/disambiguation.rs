//! Location disambiguation.
//!
//! When a search comes back ambiguous (status 300), each location slot in the
//! payload carries a `<slot>LocationDisambiguation` block. The resolver turns
//! those blocks into per-slot candidate lists and expands them into the
//! concrete re-queries worth issuing.

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};
use wayfarer_core::error::SearchError;

/// Default minimum match quality when none is configured.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 900.0;

/// A location slot of a journey search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    From,
    To,
    Via,
}

impl Slot {
    /// Slots in combination order.
    pub const ALL: [Slot; 3] = [Slot::From, Slot::To, Slot::Via];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::From => "from",
            Slot::To => "to",
            Slot::Via => "via",
        }
    }

    fn block_key(&self) -> String {
        format!("{}LocationDisambiguation", self.as_str())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The search API's verdict on one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Several candidates; pick among them
    List,
    /// The input was recognised as-is
    Identified,
    /// Nothing matched
    Empty,
}

impl MatchStatus {
    pub fn parse(slot: Slot, raw: &str) -> Result<Self, SearchError> {
        match raw {
            "list" => Ok(Self::List),
            "identified" => Ok(Self::Identified),
            "empty" => Ok(Self::Empty),
            other => Err(SearchError::UnknownMatchStatus {
                slot: slot.to_string(),
                status: other.to_string(),
            }),
        }
    }
}

/// A normalized location, in the form the search API accepts as a path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationId {
    StationCode(String),
    Coordinates { lat: f64, lon: f64 },
    TransitStop(String),
}

impl LocationId {
    /// Normalize a candidate's `place`: station code, then coordinates, then stop id.
    fn from_place(place: &Value) -> Option<Self> {
        if let Some(code) = scalar_string(&place["icsCode"]) {
            return Some(Self::StationCode(code));
        }
        if let (Some(lat), Some(lon)) = (place["lat"].as_f64(), place["lon"].as_f64()) {
            return Some(Self::Coordinates { lat, lon });
        }
        scalar_string(&place["naptanId"]).map(Self::TransitStop)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StationCode(code) | Self::TransitStop(code) => f.write_str(code),
            Self::Coordinates { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// How one slot takes part in the re-queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotResolution {
    /// Reuse whatever the caller originally passed
    Original,
    /// The slot cannot be satisfied; combinations containing it are discarded
    Drop,
    /// Accepted candidates, possibly none
    Candidates(Vec<LocationId>),
}

impl SlotResolution {
    fn choices(&self) -> Vec<SlotChoice> {
        match self {
            Self::Original => vec![SlotChoice::Original],
            Self::Drop => vec![SlotChoice::Drop],
            Self::Candidates(ids) => ids.iter().cloned().map(SlotChoice::Location).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SlotChoice {
    Original,
    Drop,
    Location(LocationId),
}

impl SlotChoice {
    fn apply(&self, original: Option<&str>) -> Option<String> {
        match self {
            Self::Original => original.map(str::to_string),
            Self::Location(id) => Some(id.to_string()),
            Self::Drop => None,
        }
    }
}

/// One search to issue: concrete from/to plus optional via.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requery {
    pub from: String,
    pub to: String,
    pub via: Option<String>,
}

/// Per-slot resolutions of one ambiguous payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionSet {
    from: SlotResolution,
    to: SlotResolution,
    via: SlotResolution,
}

impl ResolutionSet {
    pub fn slot(&self, slot: Slot) -> &SlotResolution {
        match slot {
            Slot::From => &self.from,
            Slot::To => &self.to,
            Slot::Via => &self.via,
        }
    }

    fn slot_choices(&self) -> Vec<Vec<SlotChoice>> {
        Slot::ALL.iter().map(|s| self.slot(*s).choices()).collect()
    }

    /// Size of the cartesian product before dropping anything.
    pub fn unfiltered_len(&self) -> usize {
        self.slot_choices().iter().map(Vec::len).product()
    }

    /// Cartesian product in slot order, without combinations containing a drop,
    /// applied to the query that produced the ambiguity.
    pub fn requeries(&self, original: &Requery) -> Vec<Requery> {
        cartesian(&self.slot_choices())
            .into_iter()
            .filter(|combo| !combo.contains(&SlotChoice::Drop))
            .filter_map(|combo| match combo.as_slice() {
                [from, to, via] => Some(Requery {
                    from: from.apply(Some(original.from.as_str()))?,
                    to: to.apply(Some(original.to.as_str()))?,
                    via: via.apply(original.via.as_deref()),
                }),
                _ => None,
            })
            .collect()
    }

    /// True when no combination survives the drop filter.
    pub fn is_empty(&self) -> bool {
        cartesian(&self.slot_choices())
            .iter()
            .all(|combo| combo.contains(&SlotChoice::Drop))
    }
}

fn cartesian<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect()
    })
}

/// Turns ambiguous search payloads into candidate re-queries.
///
/// A pure function of payload and threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbiguityResolver {
    threshold: f64,
}

impl Default for AmbiguityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl AmbiguityResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn resolve(&self, payload: &Value) -> Result<ResolutionSet, SearchError> {
        let set = ResolutionSet {
            from: self.resolve_slot(payload, Slot::From)?,
            to: self.resolve_slot(payload, Slot::To)?,
            via: self.resolve_slot(payload, Slot::Via)?,
        };
        debug!(combinations = set.unfiltered_len(), "Resolved ambiguous payload");
        Ok(set)
    }

    pub fn resolve_slot(&self, payload: &Value, slot: Slot) -> Result<SlotResolution, SearchError> {
        let Some(block) = payload.get(slot.block_key()) else {
            return Ok(SlotResolution::Original);
        };
        let raw_status = block["matchStatus"].as_str().ok_or_else(|| {
            SearchError::MalformedPayload(format!("{slot} disambiguation has no matchStatus"))
        })?;

        match MatchStatus::parse(slot, raw_status)? {
            MatchStatus::Identified => Ok(SlotResolution::Original),
            MatchStatus::Empty => Ok(SlotResolution::Drop),
            MatchStatus::List => {
                let options = block["disambiguationOptions"]
                    .as_array()
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let mut accepted = Vec::new();
                for option in options {
                    if let Some(id) = self.accept(option)? {
                        accepted.push(id);
                    }
                }
                debug!(%slot, offered = options.len(), accepted = accepted.len(), "Filtered candidates");
                Ok(SlotResolution::Candidates(accepted))
            }
        }
    }

    /// `None` when the candidate scores below the threshold.
    fn accept(&self, option: &Value) -> Result<Option<LocationId>, SearchError> {
        let quality = match &option["matchQuality"] {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| SearchError::MalformedPayload(format!("candidate has no matchQuality: {option}")))?;

        if quality < self.threshold {
            warn!(quality, threshold = self.threshold, "Rejected low-quality candidate");
            return Ok(None);
        }

        LocationId::from_place(&option["place"])
            .map(Some)
            .ok_or_else(|| SearchError::UnresolvableCandidate(option.to_string()))
    }
}
