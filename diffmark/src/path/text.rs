//! Line and character ranges for text diffs.
//!
//! Grammar: `N`, `N1-N2` (1-based inclusive lines), `N-emptyK` (insert K
//! placeholder lines before line N) and, for full text, an optional
//! `:K1-K2,K3-K4` suffix of 0-based inclusive character intervals on the
//! starting line.

use crate::constants::EMPTY_MARKER;

/// A 0-based inclusive character interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharInterval {
    pub start: usize,
    pub end: usize,
}

impl CharInterval {
    /// Returns true if `pos` lies inside the interval.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// A parsed text range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    /// First line, 1-based.
    pub start: usize,
    /// Last line, inclusive.
    pub end: usize,
    /// Number of placeholder lines to insert before `start`.
    pub empty: Option<usize>,
    /// Character intervals on line `start`.
    pub intervals: Vec<CharInterval>,
}

impl TextRange {
    /// Parses a range; `None` if malformed.
    pub fn parse(range: &str) -> Option<TextRange> {
        let (lines, intervals) = match range.trim().split_once(':') {
            Some((l, i)) => (l.trim(), Some(i.trim())),
            None => (range.trim(), None),
        };

        let (start, rest) = match lines.split_once('-') {
            Some((s, r)) => (parse_line(s)?, Some(r.trim())),
            None => (parse_line(lines)?, None),
        };

        let mut parsed = TextRange {
            start,
            end: start,
            empty: None,
            intervals: Vec::new(),
        };
        match rest {
            None => {}
            Some(r) => match r.strip_prefix(EMPTY_MARKER) {
                Some(count) => {
                    let count: usize = count.trim().parse().ok()?;
                    if count == 0 {
                        return None;
                    }
                    parsed.empty = Some(count);
                }
                None => {
                    let end = parse_line(r)?;
                    if end < start {
                        return None;
                    }
                    parsed.end = end;
                }
            },
        }

        if let Some(intervals) = intervals {
            parsed.intervals = parse_intervals(intervals)?;
        }
        Some(parsed)
    }

    /// Parses a comma-separated interval list on its own, as used by
    /// `cursor:C-D` exclusion rules.
    pub fn parse_intervals(value: &str) -> Option<Vec<CharInterval>> {
        parse_intervals(value)
    }

    /// Returns true if this range inserts placeholder lines.
    pub fn is_insertion(&self) -> bool {
        self.empty.is_some()
    }

    /// Returns true if `line` lies in `start..=end`.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

fn parse_line(s: &str) -> Option<usize> {
    let n: usize = s.trim().parse().ok()?;
    (n >= 1).then_some(n)
}

fn parse_intervals(value: &str) -> Option<Vec<CharInterval>> {
    let mut intervals = Vec::new();
    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (s, e) = part.split_once('-')?;
        let start: usize = s.trim().parse().ok()?;
        let end: usize = e.trim().parse().ok()?;
        if end < start {
            return None;
        }
        intervals.push(CharInterval { start, end });
    }
    if intervals.is_empty() {
        return None;
    }
    Some(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_range() {
        let r = TextRange::parse("2").unwrap();
        assert_eq!((r.start, r.end), (2, 2));
        let r = TextRange::parse("3-5").unwrap();
        assert_eq!((r.start, r.end), (3, 5));
        assert!(r.contains_line(4));
        assert!(!r.is_insertion());
    }

    #[test]
    fn test_empty_marker() {
        let r = TextRange::parse("4-empty2").unwrap();
        assert_eq!(r.start, 4);
        assert_eq!(r.empty, Some(2));
        assert!(r.is_insertion());
    }

    #[test]
    fn test_intervals() {
        let r = TextRange::parse("1:0-2,5-7").unwrap();
        assert_eq!(
            r.intervals,
            vec![
                CharInterval { start: 0, end: 2 },
                CharInterval { start: 5, end: 7 }
            ]
        );
        let r = TextRange::parse("2-3:4-4").unwrap();
        assert_eq!(r.end, 3);
        assert!(r.intervals[0].contains(4));
    }

    #[test]
    fn test_malformed() {
        for bad in ["", "0", "x", "5-3", "2-empty0", "2-emptyx", "1:3-1", "1:", "1:a-b"] {
            assert!(TextRange::parse(bad).is_none(), "{bad}");
        }
    }
}
