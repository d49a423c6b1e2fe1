// src/criteria/areas.rs
//
// Search areas: where we look, how long the commute to Moorgate is, and which
// schools make the area worth it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::OfstedRating;

/// One-way commute to Moorgate in minutes, as quoted in the area table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommuteRange {
    pub min: u32,
    pub max: u32,
    /// Quoted as "~N min" rather than measured.
    pub approx: bool,
}

impl CommuteRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max, approx: false }
    }

    pub const fn about(mins: u32) -> Self {
        Self { min: mins, max: mins, approx: true }
    }

    /// Accepts "38-45 min", "~40 min", "25 min", "25-30 mins", "30".
    pub fn parse(text: &str) -> Result<Self, String> {
        let t = text.trim();
        let (approx, t) = match t.strip_prefix('~') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, t),
        };
        let t = t
            .strip_suffix("mins")
            .or_else(|| t.strip_suffix("min"))
            .unwrap_or(t)
            .trim();

        let num = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| format!("Bad commute time: {text:?}"))
        };

        let (min, max) = match t.split_once('-') {
            Some((a, b)) => (num(a)?, num(b)?),
            None => {
                let v = num(t)?;
                (v, v)
            }
        };
        if min > max {
            return Err(format!("Commute range is reversed: {text:?}"));
        }
        Ok(Self { min, max, approx })
    }
}

impl fmt::Display for CommuteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.approx {
            write!(f, "~{} min", self.max)
        } else if self.min == self.max {
            write!(f, "{} min", self.min)
        } else {
            write!(f, "{}-{} min", self.min, self.max)
        }
    }
}

impl TryFrom<String> for CommuteRange {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CommuteRange> for String {
    fn from(c: CommuteRange) -> Self {
        c.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimarySchool {
    pub name: String,
    pub rating: OfstedRating,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
    /// Rightmove `REGION^<id>` location identifier.
    pub location_id: u32,
    pub commute: CommuteRange,
    pub grammar_schools: Vec<String>,
    pub primaries: Vec<PrimarySchool>,
    /// Drive to the nearest grammar school, when someone has measured it.
    #[serde(default)]
    pub grammar_drive_mins: Option<u32>,
    /// Straight-line distance from Moorgate.
    pub distance_km: u32,
}

impl Area {
    pub fn primaries_rated(&self, at_least: OfstedRating) -> impl Iterator<Item = &PrimarySchool> {
        self.primaries.iter().filter(move |p| p.rating.meets(at_least))
    }

    /// The five cells of the "Search Areas" sheet tab.
    pub fn table_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.commute.to_string(),
            self.grammar_schools.join(", "),
            self.primaries
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            format!("{} km", self.distance_km),
        ]
    }
}

fn area(
    name: &str,
    location_id: u32,
    commute: CommuteRange,
    grammar: &[&str],
    primaries: &[&str],
    distance_km: u32,
) -> Area {
    Area {
        name: name.to_string(),
        location_id,
        commute,
        grammar_schools: grammar.iter().map(|s| s.to_string()).collect(),
        primaries: primaries
            .iter()
            .map(|s| PrimarySchool { name: s.to_string(), rating: OfstedRating::Outstanding })
            .collect(),
        grammar_drive_mins: None,
        distance_km,
    }
}

/// The searched areas, north of the river first.
pub fn builtin_areas() -> Vec<Area> {
    use CommuteRange as C;
    vec![
        // North/Hertfordshire
        area("Hitchin", 61356, C::new(38, 45), &["Hitchin Boys/Girls"], &["Highover", "St Andrew's"], 56),
        area("Potters Bar", 1040, C::new(33, 37), &["Dame Alice Owen's"], &["Cranborne", "Wroxham"], 27),
        area("Welwyn Garden City", 1326, C::about(40), &["Access to Hitchin"], &["Templewood", "Applecroft"], 35),
        area("Watford", 1306, C::new(25, 30), &["Watford Grammar Boys/Girls"], &["Various"], 27),
        area("Barnet", 93536, C::new(30, 35), &["QE Boys", "Henrietta Barnett"], &["Various"], 16),
        area("Hatch End", 61267, C::about(30), &["Near Watford/Harrow grammars"], &["Various"], 24),
        // South/Kent
        area("Dartford", 330, C::new(33, 38), &["Dartford Boys/Girls"], &["Leigh Academy"], 29),
        area("Gravesend", 513, C::new(40, 45), &["Gravesend Grammar"], &["Cobham Primary"], 39),
        area("Orpington", 949, C::new(35, 40), &["Newstead Wood", "St Olave's"], &["Various"], 24),
        // South/Surrey
        area("Sutton", 40444, C::new(35, 40), &["Wilson's", "Nonsuch", "Wallington"], &["Various"], 21),
        area("Purley", 1056, C::new(30, 35), &["Near Sutton grammars"], &["Various"], 22),
    ]
}
