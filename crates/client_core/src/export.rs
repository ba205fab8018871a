//! CSV rendering of record lists against a fixed column schema.

use std::borrow::Cow;

use shared::domain::{ListKind, Record};

pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// A named column and the accessor that renders its cell.
pub struct Column<T> {
    pub name: &'static str,
    pub value: fn(&T) -> String,
}

fn record_id(record: &Record) -> String {
    record.id.to_string()
}

fn record_title(record: &Record) -> String {
    record.title.clone()
}

fn record_artist(record: &Record) -> String {
    record.artist.clone()
}

fn record_year(record: &Record) -> String {
    record.year.to_string()
}

fn record_cover_image(record: &Record) -> String {
    record.cover_image.clone()
}

fn record_priority(record: &Record) -> String {
    record
        .priority
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

fn record_discogs_id(record: &Record) -> String {
    record
        .discogs_id
        .map(|id| id.to_string())
        .unwrap_or_default()
}

pub static INVENTORY_COLUMNS: &[Column<Record>] = &[
    Column { name: "id", value: record_id },
    Column { name: "title", value: record_title },
    Column { name: "artist", value: record_artist },
    Column { name: "year", value: record_year },
    Column { name: "cover_image", value: record_cover_image },
    Column { name: "discogs_id", value: record_discogs_id },
];

pub static WISHLIST_COLUMNS: &[Column<Record>] = &[
    Column { name: "id", value: record_id },
    Column { name: "title", value: record_title },
    Column { name: "artist", value: record_artist },
    Column { name: "year", value: record_year },
    Column { name: "cover_image", value: record_cover_image },
    Column { name: "priority", value: record_priority },
    Column { name: "discogs_id", value: record_discogs_id },
];

pub fn columns_for(kind: ListKind) -> &'static [Column<Record>] {
    match kind {
        ListKind::Inventory => INVENTORY_COLUMNS,
        ListKind::Wishlist => WISHLIST_COLUMNS,
    }
}

/// Quotes a cell holding a comma, double quote or newline; inner quotes are doubled.
pub fn escape_cell(value: &str) -> Cow<'_, str> {
    if value.contains(&[',', '"', '\n'][..]) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn render_row(cells: impl Iterator<Item = String>) -> String {
    cells
        .map(|cell| escape_cell(&cell).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Header line plus one line per row, joined by `\n`. No rows yields `""`.
pub fn to_csv<T>(columns: &[Column<T>], rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(columns.iter().map(|c| c.name.to_string())));
    for row in rows {
        lines.push(render_row(columns.iter().map(|c| (c.value)(row))));
    }
    lines.join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub content: String,
}

pub fn export_list(kind: ListKind, records: &[Record]) -> ExportFile {
    ExportFile {
        filename: kind.export_filename(),
        mime_type: CSV_MIME_TYPE,
        content: to_csv(columns_for(kind), records),
    }
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
