//! Free-text MX record lists as typed into the dashboard forms.
//!
//! Email services take one record per line; sites take a comma-separated
//! list. Both drop blank entries and surrounding whitespace.

pub fn parse_mx_lines(text: &str) -> Vec<String> {
    split_records(text, '\n')
}

pub fn parse_mx_list(text: &str) -> Vec<String> {
    split_records(text, ',')
}

/// Inverse of [`parse_mx_lines`] for pre-filling an edit form.
pub fn join_mx_lines(records: &[String]) -> String {
    records.join("\n")
}

/// Inverse of [`parse_mx_list`] for pre-filling an edit form.
pub fn join_mx_list(records: &[String]) -> String {
    records.join(", ")
}

fn split_records(text: &str, separator: char) -> Vec<String> {
    text.split(separator)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(str::to_string)
        .collect()
}
