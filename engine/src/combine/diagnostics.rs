//! Human-readable mismatch reports for the combiner.
//!
//! Reports are plain text meant to be shown verbatim. Header comparison is
//! done on trimmed cells; surrounding whitespace is handled by the caller.

use std::collections::{BTreeMap, BTreeSet};

/// Build the full report for two header rows that do not match.
pub(crate) fn header_report(reference: &str, expected: &[String], file: &str, found: &[String]) -> String {
    let mut sections = vec![format!("Headers in '{}' don't match '{}'.", file, reference)];

    let expected_set: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    let found_set: BTreeSet<&str> = found.iter().map(String::as_str).collect();

    let missing = ordered_difference(expected, &found_set);
    let extra = ordered_difference(found, &expected_set);

    if !missing.is_empty() {
        sections.push(format!(
            "Missing headers (in '{}' but not in '{}'): {}",
            reference,
            file,
            quote_list(&missing)
        ));
    }
    if !extra.is_empty() {
        sections.push(format!(
            "Extra headers (in '{}' but not in '{}'): {}",
            file,
            reference,
            quote_list(&extra)
        ));
    }

    for (name, headers) in [(reference, expected), (file, found)] {
        let duplicates = duplicate_columns(headers);
        if !duplicates.is_empty() {
            let lines: Vec<String> = duplicates
                .iter()
                .map(|(header, columns)| format!("  - {:?} at columns {}", header, join_numbers(columns)))
                .collect();
            sections.push(format!("Duplicate headers in '{}':\n{}", name, lines.join("\n")));
        }
    }

    let near = near_matches(&missing, &extra);
    if !near.is_empty() {
        sections.push(format!(
            "Possible near-matches (differ only by case, spacing or control characters):\n{}",
            near.join("\n")
        ));
    }

    if missing.is_empty() && extra.is_empty() && expected.len() == found.len() {
        let moved: Vec<String> = expected
            .iter()
            .enumerate()
            .filter(|(i, header)| found.get(*i) != Some(*header))
            .filter_map(|(i, header)| {
                found
                    .iter()
                    .position(|h| h == header)
                    .map(|j| format!("  - {:?} expected at column {}, found at column {}", header, i + 1, j + 1))
            })
            .collect();
        if !moved.is_empty() {
            sections.push(format!("Same headers in a different order:\n{}", moved.join("\n")));
        }
    }

    if let Some(column) = first_differing_column(expected, found) {
        sections.push(format!(
            "First difference at column {}:\n  expected: {}\n  found:    {}",
            column + 1,
            neighbourhood(expected, column),
            neighbourhood(found, column)
        ));
    }

    sections.push(format!(
        "Column counts: '{}' has {}, '{}' has {}",
        reference,
        expected.len(),
        file,
        found.len()
    ));

    sections.join("\n\n")
}

/// Build the report for two schema rows that do not match.
///
/// Lists at most `limit` columns, then `+N more`.
pub(crate) fn schema_report(
    reference: &str,
    headers: &[String],
    expected: &[String],
    file: &str,
    found: &[String],
    limit: usize,
) -> String {
    let width = expected.len().max(found.len());
    let diffs: Vec<String> = (0..width)
        .filter(|&i| expected.get(i) != found.get(i))
        .map(|i| {
            let header = headers.get(i).cloned().unwrap_or_else(|| format!("column {}", i + 1));
            format!(
                "  - {}: expected {}, found {}",
                header,
                display_cell(expected.get(i)),
                display_cell(found.get(i))
            )
        })
        .collect();

    let mut report = format!("Schema row in '{}' doesn't match '{}':\n", file, reference);
    report.push_str(&diffs.iter().take(limit).cloned().collect::<Vec<_>>().join("\n"));
    if diffs.len() > limit {
        report.push_str(&format!("\n  (+{} more)", diffs.len() - limit));
    }
    report
}

/// Case-folded form with control characters and byte order marks removed and
/// whitespace collapsed.
pub(crate) fn normalize(header: &str) -> String {
    let visible: String = header
        .chars()
        .filter(|c| !c.is_control() && *c != '\u{feff}')
        .collect();
    visible.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Index and characters of the first position where two strings differ.
pub(crate) fn first_difference(a: &str, b: &str) -> Option<(usize, Option<char>, Option<char>)> {
    let mut left = a.chars();
    let mut right = b.chars();
    let mut index = 0;
    loop {
        match (left.next(), right.next()) {
            (None, None) => return None,
            (l, r) if l != r => return Some((index, l, r)),
            _ => index += 1,
        }
    }
}

fn ordered_difference<'a>(headers: &'a [String], other: &BTreeSet<&str>) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    headers
        .iter()
        .map(String::as_str)
        .filter(|h| !other.contains(h) && seen.insert(*h))
        .collect()
}

fn duplicate_columns(headers: &[String]) -> Vec<(&str, Vec<usize>)> {
    let mut columns: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, header) in headers.iter().enumerate() {
        columns.entry(header.as_str()).or_default().push(i + 1);
    }
    let mut duplicates: Vec<(&str, Vec<usize>)> =
        columns.into_iter().filter(|(_, cols)| cols.len() > 1).collect();
    duplicates.sort_by_key(|(_, cols)| cols[0]);
    duplicates
}

fn near_matches(missing: &[&str], extra: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();
    for expected in missing {
        let key = normalize(expected);
        for found in extra.iter().filter(|f| normalize(f) == key) {
            let detail = match first_difference(expected, found) {
                Some((index, l, r)) => format!(
                    "first difference at character {}: {} vs {}",
                    index + 1,
                    describe_char(l),
                    describe_char(r)
                ),
                None => "identical".to_string(),
            };
            lines.push(format!("  - {:?} vs {:?}: {}", expected, found, detail));
        }
    }
    lines
}

fn first_differing_column(expected: &[String], found: &[String]) -> Option<usize> {
    (0..expected.len().max(found.len())).find(|&i| expected.get(i) != found.get(i))
}

fn neighbourhood(headers: &[String], column: usize) -> String {
    let start = column.saturating_sub(1);
    (start..=column + 1)
        .map(|i| format!("[{}] {}", i + 1, display_cell(headers.get(i))))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn display_cell(cell: Option<&String>) -> String {
    match cell {
        Some(value) => format!("{:?}", value),
        None => "(none)".to_string(),
    }
}

fn describe_char(c: Option<char>) -> String {
    match c {
        Some(c) => format!("{:?}", c),
        None => "end of text".to_string(),
    }
}

fn quote_list(headers: &[&str]) -> String {
    headers.iter().map(|h| format!("{:?}", h)).collect::<Vec<_>>().join(", ")
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers.iter().map(usize::to_string).collect::<Vec<_>>().join(", ")
}
