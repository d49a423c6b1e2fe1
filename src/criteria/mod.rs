// src/criteria/mod.rs
//! Search criteria: the fixed requirements a home must meet and the table of
//! areas worth searching.
//!
//! Two levels of filtering:
//! - **Area level**: commute to Moorgate, grammar-school access and rated
//!   primaries. An area that fails is never searched.
//! - **Listing level**: bedrooms, property type and price. The search URL
//!   already asks the listing site for these, but scraped results drift
//!   (promoted listings, mislabelled sub-types), so they are checked again.
//!
//! Unknown listing data passes. A listing with no bedroom count is more likely
//! a scrape gap than a wrong house.

mod areas;

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

pub use areas::{builtin_areas, Area, CommuteRange, PrimarySchool};

use crate::config::AreaSelector;
use crate::error::{Error, Result};
use crate::listing::Listing;

/// Ofsted inspection grade, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OfstedRating {
    Outstanding,
    Good,
    RequiresImprovement,
    Inadequate,
}

impl OfstedRating {
    /// At least as good as `required`.
    pub fn meets(self, required: OfstedRating) -> bool {
        self <= required
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    Detached,
    SemiDetached,
    Terraced,
    EndOfTerrace,
    Bungalow,
    Flat,
    Other,
}

impl PropertyType {
    /// Map a listing's free-text sub-type ("Semi-Detached", "Link Detached House").
    pub fn classify(text: &str) -> Option<Self> {
        let t = text.trim().to_ascii_lowercase();
        if t.is_empty() {
            return None;
        }
        let kind = if t.contains("semi") {
            PropertyType::SemiDetached
        } else if t.contains("end of terrace") || t.contains("end-of-terrace") {
            PropertyType::EndOfTerrace
        } else if t.contains("terrace") || t.contains("town house") {
            PropertyType::Terraced
        } else if t.contains("detached") {
            PropertyType::Detached
        } else if t.contains("bungalow") {
            PropertyType::Bungalow
        } else if t.contains("flat") || t.contains("apartment") || t.contains("maisonette") {
            PropertyType::Flat
        } else {
            PropertyType::Other
        };
        Some(kind)
    }

    /// Rightmove `propertyTypes` query token.
    pub fn search_key(self) -> Option<&'static str> {
        match self {
            PropertyType::Detached => Some("detached"),
            PropertyType::SemiDetached => Some("semi-detached"),
            PropertyType::Terraced | PropertyType::EndOfTerrace => Some("terraced"),
            PropertyType::Bungalow => Some("bungalow"),
            PropertyType::Flat => Some("flat"),
            PropertyType::Other => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::Detached => "detached",
            PropertyType::SemiDetached => "semi-detached",
            PropertyType::Terraced => "terraced",
            PropertyType::EndOfTerrace => "end of terrace",
            PropertyType::Bungalow => "bungalow",
            PropertyType::Flat => "flat",
            PropertyType::Other => "other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub max_commute_mins: u32,
    pub max_grammar_drive_mins: u32,
    pub required_ofsted: OfstedRating,
    pub bedrooms: u32,
    pub property_types: Vec<PropertyType>,
    pub min_price: u32,
    pub max_price: u32,
    pub max_days_since_added: u32,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            max_commute_mins: 45,
            max_grammar_drive_mins: 20,
            required_ofsted: OfstedRating::Outstanding,
            bedrooms: 4,
            property_types: vec![PropertyType::Detached, PropertyType::SemiDetached],
            min_price: 600_000,
            max_price: 900_000,
            max_days_since_added: 30,
        }
    }
}

/// Why an area or listing was turned down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    CommuteTooLong { mins: u32, limit: u32 },
    NoGrammarSchool,
    GrammarTooFar { mins: u32, limit: u32 },
    NoRatedPrimary { required: OfstedRating },
    Bedrooms { found: u32, wanted: u32 },
    PropertyType { found: PropertyType },
    Price { price: u32, min: u32, max: u32 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::CommuteTooLong { mins, limit } => {
                write!(f, "commute up to {mins} min (limit {limit})")
            }
            Rejection::NoGrammarSchool => write!(f, "no grammar school in reach"),
            Rejection::GrammarTooFar { mins, limit } => {
                write!(f, "grammar school {mins} min drive (limit {limit})")
            }
            Rejection::NoRatedPrimary { required } => {
                write!(f, "no {required:?} primary school")
            }
            Rejection::Bedrooms { found, wanted } => {
                write!(f, "{found} bedrooms (want {wanted})")
            }
            Rejection::PropertyType { found } => write!(f, "{} property", found.label()),
            Rejection::Price { price, min, max } => {
                write!(f, "price £{price} outside £{min}-£{max}")
            }
        }
    }
}

impl Requirements {
    pub fn check_area(&self, area: &Area) -> Vec<Rejection> {
        let mut out = Vec::new();
        if area.commute.max > self.max_commute_mins {
            out.push(Rejection::CommuteTooLong {
                mins: area.commute.max,
                limit: self.max_commute_mins,
            });
        }
        if area.grammar_schools.is_empty() {
            out.push(Rejection::NoGrammarSchool);
        }
        if let Some(mins) = area.grammar_drive_mins {
            if mins > self.max_grammar_drive_mins {
                out.push(Rejection::GrammarTooFar { mins, limit: self.max_grammar_drive_mins });
            }
        }
        if area.primaries_rated(self.required_ofsted).next().is_none() {
            out.push(Rejection::NoRatedPrimary { required: self.required_ofsted });
        }
        out
    }

    pub fn check_listing(&self, listing: &Listing) -> Vec<Rejection> {
        let mut out = Vec::new();
        if let Some(found) = listing.bedrooms {
            if found != self.bedrooms {
                out.push(Rejection::Bedrooms { found, wanted: self.bedrooms });
            }
        }
        if let Some(found) = PropertyType::classify(&listing.property_type) {
            if !self.property_types.contains(&found) {
                out.push(Rejection::PropertyType { found });
            }
        }
        if let Some(price) = listing.price_value() {
            if price < self.min_price || price > self.max_price {
                out.push(Rejection::Price { price, min: self.min_price, max: self.max_price });
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Vec<Rejection>),
}

impl Verdict {
    fn from_rejections(r: Vec<Rejection>) -> Self {
        if r.is_empty() { Verdict::Accepted } else { Verdict::Rejected(r) }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// "; "-joined reasons, empty when accepted.
    pub fn reasons(&self) -> String {
        match self {
            Verdict::Accepted => String::new(),
            Verdict::Rejected(r) => r.iter().map(|x| x.to_string()).collect::<Vec<_>>().join("; "),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub requirements: Requirements,
    pub areas: Vec<Area>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Criteria {
    pub fn builtin() -> Self {
        Self { requirements: Requirements::default(), areas: builtin_areas() }
    }

    /// Load a TOML criteria file (`[requirements]` + `[[areas]]`).
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let criteria = Self::from_toml(&text)?;
        tracing::info!(path = %path.display(), areas = criteria.areas.len(), "loaded criteria");
        Ok(criteria)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let criteria: Criteria = toml::from_str(text)?;
        if criteria.areas.is_empty() {
            return Err(Error::config("criteria file lists no areas"));
        }
        Ok(criteria)
    }

    /// Built-in table unless a file is given.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Case-insensitive lookup by area name.
    pub fn area(&self, name: &str) -> Option<&Area> {
        let name = name.trim();
        self.areas.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn require_area(&self, name: &str) -> Result<&Area> {
        self.area(name).ok_or_else(|| Error::UnknownArea { name: name.trim().to_string() })
    }

    pub fn eligible_areas(&self) -> impl Iterator<Item = &Area> {
        self.areas
            .iter()
            .filter(|a| self.requirements.check_area(a).is_empty())
    }

    /// Resolve a selector to eligible areas; also returns the names that
    /// matched nothing.
    pub fn select(&self, selector: &AreaSelector) -> (Vec<&Area>, Vec<String>) {
        match selector {
            AreaSelector::All => (self.eligible_areas().collect(), Vec::new()),
            AreaSelector::Named(names) => {
                let mut found: Vec<&Area> = Vec::new();
                let mut unknown = Vec::new();
                for name in names {
                    match self.area(name) {
                        Some(a) if !found.iter().any(|f| f.name == a.name) => found.push(a),
                        Some(_) => {}
                        None => unknown.push(name.clone()),
                    }
                }
                (found, unknown)
            }
        }
    }

    pub fn evaluate_area(&self, area: &Area) -> Verdict {
        Verdict::from_rejections(self.requirements.check_area(area))
    }

    /// Listing checks plus the checks of the area it was found in, if known.
    pub fn evaluate(&self, listing: &Listing) -> Verdict {
        let mut rejections = match self.area(&listing.area) {
            Some(area) => self.requirements.check_area(area),
            None => Vec::new(),
        };
        rejections.extend(self.requirements.check_listing(listing));
        Verdict::from_rejections(rejections)
    }
}
