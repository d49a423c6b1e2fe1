// tests/message_format.rs
use chrono::Utc;

use home_search::listing::Listing;
use home_search::notify::{area_counts, format_batch_message};

fn listing(id: &str, area: &str, price: &str, address: &str) -> Listing {
    Listing {
        id: id.into(),
        url: format!("https://www.rightmove.co.uk/properties/{id}"),
        price: price.into(),
        address: address.into(),
        bedrooms: Some(4),
        bathrooms: None,
        property_type: "Detached".into(),
        description: String::new(),
        agent: String::new(),
        added_date: String::new(),
        images: vec![],
        area: area.into(),
        scraped_at: Utc::now(),
        source: "rightmove".into(),
    }
}

#[test]
fn empty_batch_is_empty_message() {
    assert_eq!(format_batch_message(&[], Some("https://x")), "");
}

#[test]
fn single_listing() {
    let l = listing("1", "Barnet", "£700,000", "1 Oak Road");
    let msg = format_batch_message(&[l], None);
    assert_eq!(
        msg,
        "*New Property!*\n\n*£700,000*\n1 Oak Road\nArea: Barnet\n\nhttps://www.rightmove.co.uk/properties/1"
    );
}

#[test]
fn batch_with_counts_top_three_and_sheet_link() {
    let long = "A very long address line that goes on and on past fifty characters";
    let ls = vec![
        listing("1", "Sutton", "£650,000", long),
        listing("2", "Barnet", "£700,000", "2 Elm Way"),
        listing("3", "Barnet", "£710,000", "3 Elm Way"),
        listing("4", "Purley", "£720,000", "4 Ash Lane"),
    ];
    let msg = format_batch_message(&ls, Some("https://docs.google.com/spreadsheets/d/abc"));

    let expected = [
        "*4 New Properties!*\n",
        "  Barnet: 2",
        "  Sutton: 1",
        "  Purley: 1",
        "\n*Top 3:*",
        &format!("\n£650,000 - Sutton\n{}\nhttps://www.rightmove.co.uk/properties/1", &long[..50]),
        "\n£700,000 - Barnet\n2 Elm Way\nhttps://www.rightmove.co.uk/properties/2",
        "\n£710,000 - Barnet\n3 Elm Way\nhttps://www.rightmove.co.uk/properties/3",
        "\n...and 1 more",
        "\nView all: https://docs.google.com/spreadsheets/d/abc",
    ]
    .join("\n");
    assert_eq!(msg, expected);
}

#[test]
fn no_more_line_or_link_for_small_batch() {
    let ls = vec![
        listing("1", "Sutton", "£650,000", "1 Road"),
        listing("2", "", "£700,000", "2 Road"),
    ];
    let msg = format_batch_message(&ls, None);
    assert!(msg.starts_with("*2 New Properties!*\n"));
    assert!(msg.contains("  Unknown: 1"));
    assert!(!msg.contains("more"));
    assert!(!msg.contains("View all"));
}

#[test]
fn counts_keep_first_seen_order_on_ties() {
    let ls = vec![
        listing("1", "Watford", "£1", "a"),
        listing("2", "Dartford", "£1", "b"),
        listing("3", "Dartford", "£1", "c"),
        listing("4", "Orpington", "£1", "d"),
    ];
    assert_eq!(area_counts(&ls), vec![("Dartford", 2), ("Watford", 1), ("Orpington", 1)]);
}
