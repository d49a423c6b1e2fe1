// src/specs/rightmove.rs
//
// Rightmove, as seen through the scraper actor:
// - search URL: find.html with location + requirement filters in the query
// - item: loosely typed JSON; field names vary between actor versions, so
//   every field has a fallback chain
// - property id: the numeric segment after `/properties/` in the listing URL

use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

use crate::config::consts::{DESCRIPTION_MAX_CHARS, MAX_IMAGES, RIGHTMOVE_SEARCH, SOURCE_NAME, UNKNOWN};
use crate::core::sanitize::{leading_u32, normalize_ws, truncate_chars};
use crate::criteria::{Area, Requirements};
use crate::error::Result;
use crate::listing::Listing;

/// Search-results URL for one area, filtered by the requirements.
pub fn search_url(area: &Area, req: &Requirements) -> Result<Url> {
    let mut types: Vec<&str> = req.property_types.iter().filter_map(|t| t.search_key()).collect();
    types.dedup();

    let mut url = Url::parse(RIGHTMOVE_SEARCH)?;
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("locationIdentifier", &format!("REGION^{}", area.location_id));
        q.append_pair("minBedrooms", &req.bedrooms.to_string());
        q.append_pair("maxBedrooms", &req.bedrooms.to_string());
        q.append_pair("minPrice", &req.min_price.to_string());
        q.append_pair("maxPrice", &req.max_price.to_string());
        if !types.is_empty() {
            q.append_pair("propertyTypes", &types.join(","));
        }
        q.append_pair("dontShow", "sharedOwnership");
        q.append_pair("maxDaysSinceAdded", &req.max_days_since_added.to_string());
        q.append_pair("sortType", "6"); // newest first
    }
    Ok(url)
}

/// `https://www.rightmove.co.uk/properties/123456#/?channel=RES_BUY` → "123456"
pub fn property_id(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/properties/")?;
    let id: String = rest.chars().take_while(|c| !matches!(c, '/' | '#' | '?')).collect();
    if id.is_empty() { None } else { Some(id) }
}

/// First present, non-empty field among `keys`, as text.
fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match raw.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn count(raw: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|k| match raw.get(*k)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => leading_u32(s),
        _ => None,
    })
}

/// Numeric prices come back bare; show them the way the site does.
fn format_pounds(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('£');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn price(raw: &Value) -> String {
    for key in ["price", "displayPrice"] {
        match raw.get(key) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_u64() {
                    return format_pounds(v);
                }
            }
            Some(Value::String(s)) if !s.trim().is_empty() => return normalize_ws(s),
            // some actor versions nest it: { "amount": 650000, "displayPrices": [...] }
            Some(Value::Object(o)) => {
                if let Some(v) = o.get("amount").and_then(Value::as_u64) {
                    return format_pounds(v);
                }
            }
            _ => {}
        }
    }
    UNKNOWN.to_string()
}

fn agent(raw: &Value) -> String {
    raw.get("agent")
        .and_then(|a| match a {
            Value::Object(_) => text(a, &["name", "branchDisplayName"]),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .or_else(|| text(raw, &["branchName"]))
        .unwrap_or_default()
}

fn images(raw: &Value) -> Vec<String> {
    let list = ["images", "propertyImages"]
        .iter()
        .find_map(|k| raw.get(*k).and_then(Value::as_array));
    let Some(list) = list else { return Vec::new() };
    list.iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => text(v, &["url", "srcUrl"]),
            _ => None,
        })
        .take(MAX_IMAGES)
        .collect()
}

/// Shape one raw actor item. Returns `None` when the item carries neither an
/// id nor a URL, since nothing downstream could refer to it.
pub fn to_listing(raw: &Value, area: &str, scraped_at: DateTime<Utc>) -> Option<Listing> {
    let url = text(raw, &["url", "propertyUrl"]).unwrap_or_default();
    let id = property_id(&url)
        .or_else(|| text(raw, &["propertyId", "id"]))
        .or_else(|| (!url.is_empty()).then(|| url.clone()))?;

    let description = text(raw, &["summary", "description"]).unwrap_or_default();

    Some(Listing {
        id,
        url,
        price: price(raw),
        address: text(raw, &["address", "displayAddress"])
            .map(|a| normalize_ws(&a))
            .unwrap_or_else(|| UNKNOWN.to_string()),
        bedrooms: count(raw, &["bedrooms"]),
        bathrooms: count(raw, &["bathrooms"]),
        property_type: text(raw, &["propertySubType", "propertyType"]).unwrap_or_default(),
        description: truncate_chars(&description, DESCRIPTION_MAX_CHARS),
        agent: agent(raw),
        added_date: text(raw, &["addedOrReduced", "listingUpdateDate"]).unwrap_or_default(),
        images: images(raw),
        area: area.to_string(),
        scraped_at,
        source: SOURCE_NAME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pounds_grouping() {
        assert_eq!(format_pounds(650000), "£650,000");
        assert_eq!(format_pounds(1250000), "£1,250,000");
        assert_eq!(format_pounds(999), "£999");
    }
}
