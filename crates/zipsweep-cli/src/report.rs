/// Rendering of candidate lists: a plain-text table for the terminal and a
/// CSV export.
use crate::size::{format_size, format_size_auto, SizeUnit};
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;
use zipsweep_core::archive::entry_name;
use zipsweep_core::archive::ArchiveResult;
use zipsweep_core::model::FileCandidate;

/// Modification times as shown in listings, local time.
pub fn format_timestamp(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y/%m/%d %H:%M:%S").to_string()
}

/// One line per candidate (`[x]` when selected) followed by a total of the
/// selected sizes in MB.
pub fn write_table(
    out: &mut impl Write,
    candidates: &[FileCandidate],
    is_selected: impl Fn(usize) -> bool,
) -> io::Result<()> {
    let mut total: u64 = 0;
    for (i, candidate) in candidates.iter().enumerate() {
        let selected = is_selected(i);
        if selected {
            total += candidate.size_bytes();
        }
        writeln!(
            out,
            "[{}] {}  {:>10}  {}  {}",
            if selected { 'x' } else { ' ' },
            format_timestamp(candidate.last_modified()),
            format_size_auto(candidate.size_bytes()),
            candidate.parent_dir().display(),
            candidate.file_name()
        )?;
    }
    writeln!(
        out,
        "{} files, {} selected",
        candidates.len(),
        format_size(total, SizeUnit::MB)
    )
}

/// Export candidates as CSV with a header row.
pub fn write_csv<W: Write>(
    writer: W,
    root: &Path,
    candidates: &[FileCandidate],
) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "relative_path",
        "directory",
        "file_name",
        "last_modified",
        "size_bytes",
    ])?;
    for candidate in candidates {
        let relative = entry_name(root, candidate.path()).unwrap_or_default();
        csv.write_record([
            relative,
            candidate.parent_dir().display().to_string(),
            candidate.file_name().to_string(),
            format_timestamp(candidate.last_modified()),
            candidate.size_bytes().to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Summary printed after a successful archive.
pub fn write_archive_summary(out: &mut impl Write, result: &ArchiveResult) -> io::Result<()> {
    writeln!(out, "Archive written: {}", result.destination.display())?;
    writeln!(
        out,
        "  {} entries, {} archived, {} on disk",
        result.entry_count,
        format_size(result.source_bytes, SizeUnit::MB),
        format_size(result.total_bytes_written, SizeUnit::MB)
    )?;
    if result.deleted > 0 {
        writeln!(out, "  {} originals deleted", result.deleted)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn candidate(path: &str, size: u64) -> FileCandidate {
        FileCandidate::new(PathBuf::from(path), SystemTime::UNIX_EPOCH, size)
    }

    #[test]
    fn table_totals_only_selected_rows() {
        let candidates = vec![candidate("/r/a.log", 1_048_576), candidate("/r/b.log", 10)];
        let mut out = Vec::new();
        write_table(&mut out, &candidates, |i| i == 0).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[x]"));
        assert!(lines[1].starts_with("[ ]"));
        assert_eq!(lines[2], "2 files, 1MB selected");
    }

    #[test]
    fn csv_has_header_and_relative_paths() {
        let candidates = vec![candidate("/r/sub/a.log", 5)];
        let mut out = Vec::new();
        write_csv(&mut out, Path::new("/r"), &candidates).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("relative_path,directory,file_name,last_modified,size_bytes")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("sub/a.log,/r/sub,a.log,"), "{row}");
        assert!(row.ends_with(",5"), "{row}");
    }
}
