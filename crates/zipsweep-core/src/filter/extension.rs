/// Extension predicate.
///
/// A name matches when it ends with `.` plus one of the selected extensions,
/// compared case-insensitively, and has at least one character before that
/// dot. When `log` is selected, rotated logs such as `app.log.3` also match.
use std::collections::BTreeSet;

const LOG_EXTENSION: &str = "log";

/// Check `file_name` against the selected (lowercase) extensions.
///
/// An empty selection never matches.
pub fn matches_extension(file_name: &str, extensions: &BTreeSet<String>) -> bool {
    if extensions.is_empty() {
        return false;
    }
    let lower = file_name.to_lowercase();

    extensions.iter().any(|ext| {
        has_suffix_extension(&lower, ext) || (ext == LOG_EXTENSION && is_rotated_log(&lower))
    })
}

/// `name` is `<stem>.<ext>` with a non-empty stem.
fn has_suffix_extension(name: &str, ext: &str) -> bool {
    match name.strip_suffix(ext).and_then(|rest| rest.strip_suffix('.')) {
        Some(stem) => !stem.is_empty(),
        None => false,
    }
}

/// `name` is `<stem>.log.<digits>` with a non-empty stem.
fn is_rotated_log(name: &str) -> bool {
    let Some((head, digits)) = name.rsplit_once('.') else {
        return false;
    };
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && has_suffix_extension(head, LOG_EXTENSION)
}
