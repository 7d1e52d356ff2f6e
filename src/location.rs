//! Recursive-descent parser for GenBank location strings.
//!
//! ## Location Grammar
//!
//! ```text
//! location   := range | point | join | complement
//! join       := "join(" location ("," location)* ")"
//! complement := "complement(" location ")"
//! range      := bound ".." bound
//! point      := bound
//! bound      := ["<" | ">"] integer
//! ```
//!
//! Examples accepted:
//!
//! ```text
//! 340..565
//! <1..>3311
//! 467
//! complement(4918..5163)
//! join(12..78,134..202)
//! complement(join(5..10,20..25))
//! join(complement(1..10),20..30)
//! ```
//!
//! Partial-boundary markers (`<`, `>`) are stripped; only the numeric
//! bound is kept. Operators may nest arbitrarily; each `complement()`
//! level toggles the strand of the enclosed intervals.

use thiserror::Error;

use crate::model::Location;

/// Errors that can occur while parsing a location string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("empty location")]
    Empty,

    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParens(String),

    #[error("join() with no sub-locations in '{0}'")]
    EmptyJoin(String),

    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    #[error("unrecognized location syntax '{0}'")]
    InvalidSyntax(String),
}

/// Result type for location parsing.
pub type LocationResult<T> = Result<T, LocationError>;

/// Parses a complete GenBank location string into an expression tree.
pub fn parse_location(input: &str) -> LocationResult<Location> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LocationError::Empty);
    }
    parse_expr(input)
}

fn parse_expr(input: &str) -> LocationResult<Location> {
    let input = input.trim();

    if let Some(inner) = strip_operator(input, "complement")? {
        return Ok(Location::Complement(Box::new(parse_expr(inner)?)));
    }

    if let Some(inner) = strip_operator(input, "join")? {
        let parts = split_top_level(inner);
        if parts.iter().all(|p| p.trim().is_empty()) {
            return Err(LocationError::EmptyJoin(input.to_string()));
        }
        let subs = parts
            .into_iter()
            .map(parse_expr)
            .collect::<LocationResult<Vec<_>>>()?;
        return Ok(Location::Join(subs));
    }

    parse_interval(input)
}

/// If `input` is `name(...)` with the final ')' matching the opening
/// parenthesis, returns the enclosed text. Returns `None` when `input`
/// does not start with `name(`.
fn strip_operator<'a>(input: &'a str, name: &str) -> LocationResult<Option<&'a str>> {
    let Some(rest) = input.strip_prefix(name) else {
        return Ok(None);
    };
    let Some(inner) = rest.strip_prefix('(') else {
        return Ok(None);
    };

    // The operator's closing parenthesis must be the last character of
    // the whole expression, otherwise e.g. "join(1..2)x" would parse.
    let mut depth = 1usize;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    if i + 1 == inner.len() {
                        return Ok(Some(&inner[..i]));
                    }
                    return Err(LocationError::InvalidSyntax(input.to_string()));
                }
            }
            _ => {}
        }
    }
    Err(LocationError::UnbalancedParens(input.to_string()))
}

/// Splits on commas at parenthesis depth zero, so that
/// `complement(1..10),20..30` yields two parts.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Parses `a..b` or a single point `a`.
fn parse_interval(input: &str) -> LocationResult<Location> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LocationError::Empty);
    }

    match input.split_once("..") {
        Some((start, end)) => Ok(Location::Range {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        }),
        None => Ok(Location::Point(parse_bound(input)?)),
    }
}

/// Parses one coordinate bound, stripping a partial marker if present.
fn parse_bound(token: &str) -> LocationResult<u64> {
    let token = token.trim();
    let digits = token
        .strip_prefix('<')
        .or_else(|| token.strip_prefix('>'))
        .unwrap_or(token);
    digits
        .parse::<u64>()
        .map_err(|_| LocationError::InvalidCoordinate(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;

    #[test]
    fn test_simple_range() {
        let loc = parse_location("340..565").unwrap();
        assert_eq!(loc, Location::Range { start: 340, end: 565 });
    }

    #[test]
    fn test_single_point() {
        let loc = parse_location("467").unwrap();
        assert_eq!(loc, Location::Point(467));
    }

    #[test]
    fn test_partial_markers_stripped() {
        let loc = parse_location("<1..>3311").unwrap();
        assert_eq!(loc, Location::Range { start: 1, end: 3311 });
    }

    #[test]
    fn test_complement() {
        let loc = parse_location("complement(4918..5163)").unwrap();
        let spans = loc.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 4918);
        assert!(spans[0].complement);
    }

    #[test]
    fn test_join() {
        let loc = parse_location("join(12..78,134..202)").unwrap();
        assert_eq!(
            loc.spans(),
            vec![Span::new(12, 78), Span::new(134, 202)]
        );
    }

    #[test]
    fn test_complement_of_join() {
        let loc = parse_location("complement(join(5..10,20..25))").unwrap();
        let spans = loc.spans();
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.complement));
        // Source order preserved under complement.
        assert_eq!(spans[0].start, 5);
        assert_eq!(spans[1].start, 20);
    }

    #[test]
    fn test_nested_complement_inside_join() {
        let loc = parse_location("join(complement(1..10),20..30)").unwrap();
        let spans = loc.spans();
        assert!(spans[0].complement);
        assert!(!spans[1].complement);
    }

    #[test]
    fn test_whitespace_tolerated() {
        let loc = parse_location("join( 12..78, 134..202 )").unwrap();
        assert_eq!(loc.spans().len(), 2);
    }

    #[test]
    fn test_empty_location() {
        assert_eq!(parse_location(""), Err(LocationError::Empty));
        assert_eq!(parse_location("   "), Err(LocationError::Empty));
    }

    #[test]
    fn test_invalid_coordinate() {
        assert!(matches!(
            parse_location("abc..5"),
            Err(LocationError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(matches!(
            parse_location("join(1..2"),
            Err(LocationError::UnbalancedParens(_))
        ));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(matches!(
            parse_location("join(1..2)x"),
            Err(LocationError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_empty_join_rejected() {
        assert!(matches!(
            parse_location("join()"),
            Err(LocationError::EmptyJoin(_))
        ));
    }
}
