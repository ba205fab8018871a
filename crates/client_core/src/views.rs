//! Client-side derived views over the loaded lists and fetched details.

use shared::domain::{Format, PriceSuggestion, Priority, Record};

const ZERO_DECIMAL_CURRENCIES: &[&str] = &["JPY", "KRW"];

/// Case-insensitive substring match on title or artist; blank queries keep everything.
pub fn filter_records<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| {
            r.title.to_lowercase().contains(&needle) || r.artist.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Buckets in High, Medium, Low, unprioritised order, each keeping list order.
pub fn group_by_priority(records: &[Record]) -> Vec<(Option<Priority>, Vec<&Record>)> {
    Priority::ALL
        .into_iter()
        .map(Some)
        .chain(std::iter::once(None))
        .map(|bucket| {
            let members: Vec<&Record> = records.iter().filter(|r| r.priority == bucket).collect();
            (bucket, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

pub fn format_summary(formats: &[Format]) -> String {
    formats
        .iter()
        .map(|f| {
            if f.descriptions.is_empty() {
                f.name.clone()
            } else {
                format!("{}, {}", f.name, f.descriptions.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// `Mono` or `Stereo` from the first format that names either.
pub fn audio_channel(formats: &[Format]) -> Option<&'static str> {
    formats.iter().find_map(|f| {
        let has = |label: &str| f.descriptions.iter().any(|d| d == label);
        if has("Mono") {
            Some("Mono")
        } else if has("Stereo") {
            Some("Stereo")
        } else {
            None
        }
    })
}

pub fn format_price(price: &PriceSuggestion) -> String {
    let currency = price.currency.trim().to_ascii_uppercase();
    let decimals = if ZERO_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        0
    } else {
        2
    };
    let raw = format!("{:.*}", decimals, price.value.abs());
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let sign = if price.value < 0.0 { "-" } else { "" };
    format!("{currency} {sign}{grouped}")
}
