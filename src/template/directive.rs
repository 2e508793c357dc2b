//! `<codes>%<payload>` directive parsing

use std::collections::BTreeSet;
use std::fmt;

/// Separator between the code prefix and the payload
pub const CODE_SEPARATOR: char = '%';

/// Expansion codes understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Code {
    /// `b`: the first instance builds the image
    Build,
    /// `d`: the entry is duplicated once per instance
    Duplicate,
}

impl Code {
    /// Map a code character, ignoring anything unknown
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'b' => Some(Code::Build),
            'd' => Some(Code::Duplicate),
            _ => None,
        }
    }
}

/// A parsed entry name or script line
///
/// `marked` records whether the source contained a `%` at all. An entry such
/// as `x%net` is marked but carries no known code, which is not the same as
/// the codeless `net`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    /// Known codes found before the first `%`
    pub codes: BTreeSet<Code>,
    /// Raw prefix before the first `%`, kept for exact key matching
    pub prefix: String,
    /// Everything after the first `%`, or the whole string when unmarked
    pub payload: String,
    /// Whether a `%` was present
    pub marked: bool,
}

impl Directive {
    /// Parse a directive string
    ///
    /// Only the first `%` splits; a payload may therefore contain further `%`
    /// characters, but a payload with a `%` and no prefix cannot be expressed.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(CODE_SEPARATOR) {
            Some((prefix, payload)) => Self {
                codes: prefix.chars().filter_map(Code::from_char).collect(),
                prefix: prefix.to_string(),
                payload: payload.to_string(),
                marked: true,
            },
            None => Self {
                codes: BTreeSet::new(),
                prefix: String::new(),
                payload: raw.to_string(),
                marked: false,
            },
        }
    }

    /// Check for a code
    pub fn has(&self, code: Code) -> bool {
        self.codes.contains(&code)
    }

    /// Whether the entry is emitted once under its literal name
    pub fn is_codeless(&self) -> bool {
        !self.marked
    }

    /// Base name (the payload, for entry names)
    pub fn name(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.marked {
            write!(f, "{}{}{}", self.prefix, CODE_SEPARATOR, self.payload)
        } else {
            write!(f, "{}", self.payload)
        }
    }
}
