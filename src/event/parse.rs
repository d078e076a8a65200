use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::event::model::{EntityRef, Event};
use crate::foundation::error::{KinegraphError, KinegraphResult};

/// Sentinel in the `to_type` column marking a record without a target entity.
pub const NO_TARGET: &str = "NA";

/// Parse an event table from a reader, one record per line.
///
/// Cells are trimmed of surrounding whitespace; a message cell may carry one
/// pair of surrounding double quotes, which is stripped. Blank lines are
/// skipped. Any malformed record (wrong column count, non-integer time)
/// aborts the parse with the 1-based line number.
pub fn parse_events<R: Read>(r: R) -> KinegraphResult<Vec<Event>> {
    let mut out = Vec::new();
    for (idx, line) in BufReader::new(r).lines().enumerate() {
        let line_no = idx + 1;
        let line =
            line.map_err(|e| KinegraphError::record(format!("line {line_no}: read: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }
        let event = parse_record(&line)
            .map_err(|msg| KinegraphError::record(format!("line {line_no}: {msg}")))?;
        out.push(event);
    }
    Ok(out)
}

/// Parse an event table from a file on disk.
pub fn parse_events_path(path: impl AsRef<Path>) -> KinegraphResult<Vec<Event>> {
    let path = path.as_ref();
    let f = std::fs::File::open(path).map_err(|e| {
        KinegraphError::record(format!("open event table '{}': {e}", path.display()))
    })?;
    parse_events(f)
}

fn parse_record(line: &str) -> Result<Event, String> {
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();
    if cells.len() != 6 {
        return Err(format!("expected 6 columns, found {}", cells.len()));
    }

    let time_ms: i64 = cells[0]
        .parse()
        .map_err(|_| format!("time_in_ms is not an integer: '{}'", cells[0]))?;

    let to = if cells[3] == NO_TARGET {
        None
    } else {
        Some(EntityRef::new(cells[3], cells[4]))
    };

    Ok(Event {
        time_ms,
        from: EntityRef::new(cells[1], cells[2]),
        to,
        message: unquote(cells[5]).to_owned(),
    })
}

fn unquote(cell: &str) -> &str {
    cell.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(cell)
}
