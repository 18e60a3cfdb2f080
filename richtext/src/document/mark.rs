use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An inline formatting flag carried by a text run.
/// Marks have no associated value; a run either has one or it does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Highlight,
    Strikethrough,
}

impl Mark {
    /// Every mark, in serializer nesting order (outermost first).
    pub const ALL: [Mark; 5] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Highlight,
        Mark::Strikethrough,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Highlight => "highlight",
            Mark::Strikethrough => "strikethrough",
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mark::ALL
            .into_iter()
            .find(|mark| mark.name() == s)
            .ok_or_else(|| Error::UnknownMarkName(s.to_string()))
    }
}

/// The set of marks active on a run, stored as a bit set.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarkSet(u8);

impl MarkSet {
    pub fn empty() -> Self {
        MarkSet(0)
    }

    pub fn contains(&self, mark: Mark) -> bool {
        self.0 & mark.bit() != 0
    }

    pub fn insert(&mut self, mark: Mark) {
        self.0 |= mark.bit();
    }

    pub fn remove(&mut self, mark: Mark) {
        self.0 &= !mark.bit();
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        if on {
            self.insert(mark);
        } else {
            self.remove(mark);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Marks in `Mark::ALL` order, independent of insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Mark> + '_ {
        Mark::ALL.into_iter().filter(|mark| self.contains(*mark))
    }

    pub fn intersection(&self, other: &MarkSet) -> MarkSet {
        MarkSet(self.0 & other.0)
    }
}

impl fmt::Debug for MarkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut set = MarkSet::empty();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_order_ignores_insertion_order() {
        let mut set = MarkSet::empty();
        set.insert(Mark::Strikethrough);
        set.insert(Mark::Italic);
        set.insert(Mark::Bold);
        let marks: Vec<Mark> = set.iter().collect();
        assert_eq!(marks, vec![Mark::Bold, Mark::Italic, Mark::Strikethrough]);
    }

    #[test]
    fn insert_and_remove_are_independent() {
        let mut set: MarkSet = [Mark::Underline, Mark::Highlight].into_iter().collect();
        set.remove(Mark::Underline);
        assert!(!set.contains(Mark::Underline));
        assert!(set.contains(Mark::Highlight));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn names_round_trip() {
        for mark in Mark::ALL {
            assert_eq!(mark.name().parse::<Mark>(), Ok(mark));
        }
        assert_eq!(
            "code".parse::<Mark>(),
            Err(Error::UnknownMarkName("code".into()))
        );
    }
}
