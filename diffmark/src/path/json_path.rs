//! `/seg/seg` paths into JSON documents.

use std::fmt;

/// One segment of a JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonSegment {
    /// A bare integer. Indexes an array, or names a key in an object.
    Index(usize),
    /// An object key.
    Key(String),
}

impl JsonSegment {
    /// The segment as an object key.
    pub fn as_key(&self) -> String {
        match self {
            JsonSegment::Index(i) => i.to_string(),
            JsonSegment::Key(k) => k.clone(),
        }
    }
}

/// A parsed JSON path. The empty path is the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<JsonSegment>,
}

impl JsonPath {
    /// Parses a path. Quoted segments may contain `/`; `\"` and `\\`
    /// escape inside quotes. Returns `None` on an unterminated quote.
    pub fn parse(path: &str) -> Option<JsonPath> {
        let mut segments = Vec::new();
        let mut chars = path.trim().chars().peekable();

        while let Some(c) = chars.next() {
            if c != '/' {
                // Paths must be absolute.
                if segments.is_empty() {
                    let mut seg = String::from(c);
                    read_bare(&mut chars, &mut seg);
                    segments.push(bare_segment(seg));
                    continue;
                }
                return None;
            }
            match chars.peek() {
                None => break,
                Some('"') => {
                    chars.next();
                    let mut seg = String::new();
                    let mut closed = false;
                    while let Some(c) = chars.next() {
                        match c {
                            '\\' => seg.push(chars.next()?),
                            '"' => {
                                closed = true;
                                break;
                            }
                            _ => seg.push(c),
                        }
                    }
                    if !closed || !matches!(chars.peek(), None | Some('/')) {
                        return None;
                    }
                    segments.push(JsonSegment::Key(seg));
                }
                Some('/') => return None,
                Some(_) => {
                    let mut seg = String::new();
                    read_bare(&mut chars, &mut seg);
                    segments.push(bare_segment(seg));
                }
            }
        }
        Some(JsonPath { segments })
    }

    /// Returns the segments.
    pub fn segments(&self) -> &[JsonSegment] {
        &self.segments
    }

    /// Returns true for the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the path without its last segment.
    pub fn parent(&self) -> Option<JsonPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(JsonPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns the last segment.
    pub fn last(&self) -> Option<&JsonSegment> {
        self.segments.last()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            match seg {
                JsonSegment::Index(i) => write!(f, "/{i}")?,
                JsonSegment::Key(k) if k.contains(['/', '"']) || k.is_empty() => {
                    write!(f, "/\"{}\"", k.replace('\\', "\\\\").replace('"', "\\\""))?
                }
                JsonSegment::Key(k) => write!(f, "/{k}")?,
            }
        }
        Ok(())
    }
}

fn read_bare(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, seg: &mut String) {
    while let Some(&c) = chars.peek() {
        if c == '/' {
            break;
        }
        seg.push(c);
        chars.next();
    }
}

fn bare_segment(seg: String) -> JsonSegment {
    match seg.parse::<usize>() {
        Ok(i) => JsonSegment::Index(i),
        Err(_) => JsonSegment::Key(seg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let path = JsonPath::parse("/a/0/b").unwrap();
        assert_eq!(
            path.segments(),
            &[
                JsonSegment::Key("a".into()),
                JsonSegment::Index(0),
                JsonSegment::Key("b".into()),
            ]
        );
    }

    #[test]
    fn test_root() {
        assert!(JsonPath::parse("").unwrap().is_root());
        assert!(JsonPath::parse("/").unwrap().is_root());
    }

    #[test]
    fn test_quoted_segment() {
        let path = JsonPath::parse(r#"/"a/b"/"say \"hi\"""#).unwrap();
        assert_eq!(
            path.segments(),
            &[
                JsonSegment::Key("a/b".into()),
                JsonSegment::Key("say \"hi\"".into()),
            ]
        );
        assert_eq!(JsonPath::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_malformed() {
        assert!(JsonPath::parse("/\"open").is_none());
        assert!(JsonPath::parse("/a//b").is_none());
    }

    #[test]
    fn test_parent() {
        let path = JsonPath::parse("/list/2").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "/list");
        assert_eq!(path.last(), Some(&JsonSegment::Index(2)));
    }
}
