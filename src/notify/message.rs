// src/notify/message.rs
//
// WhatsApp text for a batch of new listings. `*bold*` is WhatsApp markup.

use crate::config::consts::UNKNOWN;
use crate::core::sanitize::truncate_chars;
use crate::listing::Listing;

const TOP_N: usize = 3;
const ADDRESS_MAX_CHARS: usize = 50;

fn area_of(l: &Listing) -> &str {
    if l.area.is_empty() { UNKNOWN } else { &l.area }
}

/// Per-area counts, most common first; ties keep first-seen order.
pub fn area_counts(listings: &[Listing]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for l in listings {
        let area = area_of(l);
        match counts.iter_mut().find(|(a, _)| *a == area) {
            Some((_, n)) => *n += 1,
            None => counts.push((area, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1)); // stable
    counts
}

pub fn format_batch_message(listings: &[Listing], sheet_url: Option<&str>) -> String {
    match listings {
        [] => String::new(),
        [l] => format!(
            "*New Property!*\n\n*{}*\n{}\nArea: {}\n\n{}",
            l.price,
            l.address,
            area_of(l),
            l.url
        ),
        _ => {
            let mut lines = vec![format!("*{} New Properties!*\n", listings.len())];
            for (area, n) in area_counts(listings) {
                lines.push(format!("  {area}: {n}"));
            }
            lines.push("\n*Top 3:*".to_string());
            for l in listings.iter().take(TOP_N) {
                lines.push(format!(
                    "\n{} - {}\n{}\n{}",
                    l.price,
                    area_of(l),
                    truncate_chars(&l.address, ADDRESS_MAX_CHARS),
                    l.url
                ));
            }
            if listings.len() > TOP_N {
                lines.push(format!("\n...and {} more", listings.len() - TOP_N));
            }
            if let Some(url) = sheet_url.filter(|u| !u.is_empty()) {
                lines.push(format!("\nView all: {url}"));
            }
            lines.join("\n")
        }
    }
}
