use std::fmt::Write as _;

use client_core::views::{audio_channel, format_price, format_summary, group_by_priority};
use shared::domain::{ListKind, Priority, Record, RecordDetail};

pub const ADDED_MARKER: &str = "[added]";

pub fn record_line(record: &Record) -> String {
    let mut line = format!(
        "{:>10}  {} - {} ({})",
        record.id.0, record.artist, record.title, record.year
    );
    if let Some(priority) = record.priority {
        let _ = write!(line, " [{priority}]");
    }
    line
}

pub fn search_line(record: &Record, in_collection: bool) -> String {
    let line = record_line(record);
    if in_collection {
        format!("{line} {ADDED_MARKER}")
    } else {
        line
    }
}

pub fn empty_list_notice(kind: ListKind, filter: Option<&str>) -> String {
    match filter.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => format!("No records in your {} match '{query}'.", kind_label(kind)),
        None => format!("Your {} is empty.", kind_label(kind)),
    }
}

pub fn kind_label(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Inventory => "inventory",
        ListKind::Wishlist => "wishlist",
    }
}

fn bucket_heading(priority: Option<Priority>, count: usize) -> String {
    match priority {
        Some(priority) => format!("{priority} priority ({count})"),
        None => format!("No priority ({count})"),
    }
}

pub fn grouped_lines(records: &[Record]) -> Vec<String> {
    let mut lines = Vec::new();
    for (priority, members) in group_by_priority(records) {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(bucket_heading(priority, members.len()));
        lines.extend(members.into_iter().map(record_line));
    }
    lines
}

/// Multi-line detail view; `held` is the collection entry for this release, if any.
pub fn detail_text(detail: &RecordDetail, held: Option<(ListKind, &Record)>) -> String {
    let record = &detail.record;
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", record.artist, record.title);
    let _ = writeln!(out, "Year:    {}", record.year);
    let _ = writeln!(out, "Country: {}", detail.country);

    let summary = format_summary(&detail.formats);
    if !summary.is_empty() {
        let _ = writeln!(out, "Format:  {summary}");
    }
    if let Some(channel) = audio_channel(&detail.formats) {
        let _ = writeln!(out, "Audio:   {channel}");
    }
    match &detail.price_suggestion {
        Some(price) => {
            let _ = writeln!(out, "Lowest price: {}", format_price(price));
        }
        None => {
            let _ = writeln!(out, "Lowest price: not available");
        }
    }

    let status = match held {
        Some((ListKind::Wishlist, Record {
            priority: Some(priority),
            ..
        })) => format!("In wishlist ({priority} priority)"),
        Some((kind, _)) => format!("In {}", kind_label(kind)),
        None => "Not in collection".to_string(),
    };
    let _ = writeln!(out, "Status:  {status}");

    if !detail.tracklist.is_empty() {
        let _ = writeln!(out, "\nTracklist:");
        for track in &detail.tracklist {
            let _ = writeln!(
                out,
                "  {:<4} {}{}",
                track.position,
                track.title,
                if track.duration.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", track.duration)
                }
            );
        }
    }
    if let Some(notes) = &detail.notes {
        let _ = writeln!(out, "\nNotes:\n{}", notes.trim());
    }
    out
}
