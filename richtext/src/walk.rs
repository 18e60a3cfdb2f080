//! Traversal over the text runs and blocks a selection touches.
//!
//! Runs are addressed by `(block, run)` where `run` counts the text runs of
//! a top-level block in depth-first order. A run is selected when the
//! selection covers at least part of it:
//!
//! - every run strictly between the start and end runs is selected;
//! - the start run is skipped when the range begins at the very end of its
//!   text and continues into later runs;
//! - the end run is skipped when the range ends at offset 0 and began in an
//!   earlier run;
//! - a range confined to a single run (including a collapsed caret) selects
//!   that run.

use crate::document::{Document, Node, TextRun};
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunPoint {
    pub block: usize,
    pub run: usize,
}

/// A text run found by a walk, together with its address.
#[derive(Debug, Clone, Copy)]
pub struct RunRef<'a> {
    pub at: RunPoint,
    pub run: &'a TextRun,
}

/// Every text run in the document, in order.
pub fn all_text_runs(doc: &Document) -> Vec<RunRef<'_>> {
    let mut out = Vec::new();
    for (block, top) in doc.blocks.iter().enumerate() {
        for (run, text) in top.runs().into_iter().enumerate() {
            out.push(RunRef {
                at: RunPoint { block, run },
                run: text,
            });
        }
    }
    out
}

/// Text runs intersecting `sel` for which `pred` holds, in document order.
pub fn text_runs<'a>(
    doc: &'a Document,
    sel: &Selection,
    pred: impl Fn(&TextRun) -> bool,
) -> Vec<RunRef<'a>> {
    let (first, last) = block_span(doc, sel);
    let mut out = Vec::new();
    for block in first..last {
        for (run, text) in doc.blocks[block].runs().into_iter().enumerate() {
            let at = RunPoint { block, run };
            if selects(sel, at, text.char_len()) && pred(text) {
                out.push(RunRef { at, run: text });
            }
        }
    }
    out
}

/// Apply `f` to every text run intersecting `sel`. Returns how many runs were visited.
pub fn text_runs_mut(
    doc: &mut Document,
    sel: &Selection,
    mut f: impl FnMut(&mut TextRun),
) -> usize {
    let (first, last) = block_span(doc, sel);
    let mut visited = 0;
    for block in first..last {
        let mut run = 0;
        visit_runs_mut(&mut doc.blocks[block].children, &mut |text: &mut TextRun| {
            let at = RunPoint { block, run };
            run += 1;
            if selects(sel, at, text.char_len()) {
                f(text);
                visited += 1;
            }
        });
    }
    visited
}

/// Indices of the top-level blocks holding at least one run that `sel`
/// selects. A block reached only by a hanging edge is not included.
pub fn blocks(doc: &Document, sel: &Selection) -> Vec<usize> {
    let mut out: Vec<usize> = text_runs(doc, sel, |_| true)
        .iter()
        .map(|found| found.at.block)
        .collect();
    out.dedup();
    out
}

/// Half-open range of top-level block indices the selection reaches, clamped
/// to the document.
fn block_span(doc: &Document, sel: &Selection) -> (usize, usize) {
    let first = sel.start().block.min(doc.blocks.len());
    let last = sel.end().block.saturating_add(1).min(doc.blocks.len());
    (first, last.max(first))
}

fn selects(sel: &Selection, at: RunPoint, len: usize) -> bool {
    let start = sel.start();
    let end = sel.end();
    let key = (at.block, at.run);
    if key < start.run_key() || key > end.run_key() {
        return false;
    }
    if start.run_key() == end.run_key() {
        return true;
    }
    if key == start.run_key() && len > 0 && start.offset >= len {
        return false;
    }
    if key == end.run_key() && end.offset == 0 {
        return false;
    }
    true
}

fn visit_runs_mut(nodes: &mut [Node], f: &mut dyn FnMut(&mut TextRun)) {
    for node in nodes {
        match node {
            Node::Text(run) => f(run),
            Node::Block(block) => visit_runs_mut(&mut block.children, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use crate::selection::Point;

    fn doc() -> Document {
        Document::new(vec![
            Block::paragraph(vec![
                TextRun::plain("hello ").into(),
                Block::link("https://x.test", vec![TextRun::plain("world").into()]).into(),
            ]),
            Block::paragraph(vec![
                TextRun::plain("one").into(),
                TextRun::plain("two").into(),
            ]),
        ])
    }

    fn texts(runs: &[RunRef<'_>]) -> Vec<String> {
        runs.iter().map(|r| r.run.text.clone()).collect()
    }

    #[test]
    fn caret_selects_its_run() {
        let doc = doc();
        let sel = Selection::collapsed(Point::new(0, 1, 2));
        assert_eq!(texts(&text_runs(&doc, &sel, |_| true)), vec!["world"]);
    }

    #[test]
    fn range_spans_blocks_and_nested_links() {
        let doc = doc();
        let sel = Selection::new(Point::new(0, 0, 2), Point::new(1, 0, 1));
        assert_eq!(
            texts(&text_runs(&doc, &sel, |_| true)),
            vec!["hello ", "world", "one"]
        );
    }

    #[test]
    fn hanging_edges_are_skipped() {
        let doc = doc();
        // Starts at the end of "hello ", ends at the start of "two".
        let sel = Selection::new(Point::new(0, 0, 6), Point::new(1, 1, 0));
        assert_eq!(texts(&text_runs(&doc, &sel, |_| true)), vec!["world", "one"]);
    }

    #[test]
    fn out_of_range_selects_nothing() {
        let doc = doc();
        let sel = Selection::collapsed(Point::new(7, 0, 0));
        assert!(text_runs(&doc, &sel, |_| true).is_empty());
        assert!(blocks(&doc, &sel).is_empty());
    }

    #[test]
    fn blocks_follow_selected_runs() {
        let doc = doc();
        let hanging = Selection::new(Point::new(0, 0, 0), Point::new(1, 0, 0));
        assert_eq!(blocks(&doc, &hanging), vec![0]);

        let missing_run = Selection::collapsed(Point::new(0, 9, 0));
        assert!(text_runs(&doc, &missing_run, |_| true).is_empty());
        assert!(blocks(&doc, &missing_run).is_empty());

        let both = Selection::new(Point::new(0, 1, 0), Point::new(1, 1, 2));
        assert_eq!(blocks(&doc, &both), vec![0, 1]);
    }

    #[test]
    fn mutation_matches_read_walk() {
        let mut doc = doc();
        let sel = Selection::runs((0, 1), (1, 0));
        let visited = text_runs_mut(&mut doc, &sel, |run| run.text.make_ascii_uppercase());
        assert_eq!(visited, 2);
        let all: Vec<String> = texts(&all_text_runs(&doc));
        assert_eq!(all, vec!["hello ", "WORLD", "ONE", "two"]);
    }
}
