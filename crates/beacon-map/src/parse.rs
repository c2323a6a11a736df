//! Reader for the scanner report text format.
//!
//! ```text
//! --- scanner 0 ---
//! 404,-588,-901
//! 528,-643,409
//!
//! --- scanner 1 ---
//! 686,422,578
//! ```
//!
//! A block is a header line followed by one `x,y,z` line per beacon and ends
//! at a blank line, the next header, or the end of input.

use beacon_map_core::{Coordinate, Scanner, ScannerId};
use std::collections::HashSet;

/// Malformed scanner report. Line numbers are 1-based.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: malformed scanner header {text:?} (expected `--- scanner <id> ---`)")]
    BadHeader { line: usize, text: String },
    #[error("line {line}: malformed coordinate {text:?} (expected `x,y,z`)")]
    BadCoordinate { line: usize, text: String },
    #[error("line {line}: coordinate outside of a scanner block")]
    OrphanCoordinate { line: usize },
    #[error("line {line}: scanner {id} is reported twice")]
    DuplicateScanner { line: usize, id: ScannerId },
    #[error("input contains no scanner blocks")]
    Empty,
}

fn parse_header(text: &str) -> Option<ScannerId> {
    let inner = text.strip_prefix("---")?.strip_suffix("---")?.trim();
    inner.strip_prefix("scanner")?.trim().parse().ok()
}

fn parse_coordinate(text: &str) -> Option<Coordinate> {
    let mut parts = text.split(',').map(|p| p.trim().parse::<i32>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coordinate::new(x, y, z))
}

/// Parse every scanner block of `input`, in order.
pub fn parse_scanners(input: &str) -> Result<Vec<Scanner>, ParseError> {
    let mut scanners = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<Scanner> = None;

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();

        if text.is_empty() {
            scanners.extend(current.take());
        } else if text.starts_with("---") {
            let id = parse_header(text).ok_or_else(|| ParseError::BadHeader {
                line,
                text: text.to_string(),
            })?;
            if !seen.insert(id) {
                return Err(ParseError::DuplicateScanner { line, id });
            }
            scanners.extend(current.replace(Scanner::new(id)));
        } else {
            let scanner = current
                .as_mut()
                .ok_or(ParseError::OrphanCoordinate { line })?;
            let position = parse_coordinate(text).ok_or_else(|| ParseError::BadCoordinate {
                line,
                text: text.to_string(),
            })?;
            scanner.push(position);
        }
    }
    scanners.extend(current);

    if scanners.is_empty() {
        return Err(ParseError::Empty);
    }
    log::debug!(
        "parsed {} scanners, {} beacon reports",
        scanners.len(),
        scanners.iter().map(Scanner::len).sum::<usize>()
    );
    Ok(scanners)
}
