use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A position in a document: top-level block index, index of a text run
/// within that block (depth-first, across nested links) and a character
/// offset into the run's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    pub block: usize,
    pub run: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, run: usize, offset: usize) -> Self {
        Point { block, run, offset }
    }

    /// The (block, run) pair, without the character offset.
    pub fn run_key(&self) -> (usize, usize) {
        (self.block, self.run)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.block, self.run, self.offset)
    }
}

impl FromStr for Point {
    type Err = Error;

    /// Parses `block:run:offset`; trailing components may be left out and default to 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(Error::InvalidSelection(s.to_string()));
        }
        let mut numbers = [0usize; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| Error::InvalidSelection(s.to_string()))?;
        }
        Ok(Point::new(numbers[0], numbers[1], numbers[2]))
    }
}

/// A range between an anchor and a focus point. The two may be in either
/// order; `start`/`end` give the document-ordered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Selection { anchor, focus }
    }

    pub fn collapsed(at: Point) -> Self {
        Selection::new(at, at)
    }

    /// Select whole runs: from the start of run `(start.0, start.1)` to the
    /// end of run `(end.0, end.1)`.
    pub fn runs(start: (usize, usize), end: (usize, usize)) -> Self {
        Selection::new(
            Point::new(start.0, start.1, 0),
            Point::new(end.0, end.1, usize::MAX),
        )
    }

    pub fn start(&self) -> Point {
        self.anchor.min(self.focus)
    }

    pub fn end(&self) -> Point {
        self.anchor.max(self.focus)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collapsed() {
            write!(f, "{}", self.anchor)
        } else {
            write!(f, "{}..{}", self.anchor, self.focus)
        }
    }
}

impl FromStr for Selection {
    type Err = Error;

    /// Parses `anchor..focus` or a single point for a collapsed selection.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("..") {
            Some((anchor, focus)) => Ok(Selection::new(anchor.parse()?, focus.parse()?)),
            None => Ok(Selection::collapsed(s.parse()?)),
        }
    }
}
