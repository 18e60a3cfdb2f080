//! Toggle-style edits and state queries over a (document, selection) pair.
//!
//! Every edit validates its input, works on a clone and returns the new
//! snapshot; the input document is never touched. A selection that reaches
//! no text (or no block) yields an unchanged copy rather than an error.

use richtext::walk;
use richtext::{BlockKind, Document, Mark, MarkSet, Selection, validate};
use tracing::{debug, trace, warn};

use crate::config::MixedSelectionPolicy;
use crate::error::{EditorError, Result};

/// Toggle `mark` on the selected runs: on for all of them unless every one
/// already has it, in which case off for all.
pub fn toggle_mark(doc: &Document, sel: &Selection, mark: Mark) -> Result<Document> {
    toggle_mark_with(doc, sel, mark, MixedSelectionPolicy::default())
}

/// `toggle_mark` with an explicit policy for selections whose runs disagree.
pub fn toggle_mark_with(
    doc: &Document,
    sel: &Selection,
    mark: Mark,
    policy: MixedSelectionPolicy,
) -> Result<Document> {
    check(doc)?;

    let states: Vec<bool> = walk::text_runs(doc, sel, |_| true)
        .iter()
        .map(|found| found.run.has(mark))
        .collect();
    if states.is_empty() {
        trace!(%sel, %mark, "selection reaches no text, nothing to toggle");
        return Ok(doc.clone());
    }

    let on = policy.resolve(&states);
    let mut next = doc.clone();
    let runs = walk::text_runs_mut(&mut next, sel, |run| run.marks.set(mark, on));
    debug!(%sel, %mark, on, runs, "toggled mark");
    Ok(next)
}

/// True iff the selection reaches at least one run and every such run has `mark`.
pub fn is_mark_active(doc: &Document, sel: &Selection, mark: Mark) -> bool {
    let runs = walk::text_runs(doc, sel, |_| true);
    !runs.is_empty() && runs.iter().all(|found| found.run.has(mark))
}

/// Marks shared by every selected run.
pub fn active_marks(doc: &Document, sel: &Selection) -> MarkSet {
    let runs = walk::text_runs(doc, sel, |_| true);
    let mut iter = runs.iter();
    let Some(first) = iter.next() else {
        return MarkSet::empty();
    };
    iter.fold(first.run.marks, |acc, found| acc.intersection(&found.run.marks))
}

/// Switch each selected top-level block between `target` and paragraph.
/// Link blocks are left alone.
pub fn toggle_block_type(doc: &Document, sel: &Selection, target: BlockKind) -> Result<Document> {
    if !target.is_toggleable() {
        return Err(EditorError::UntoggleableBlockKind(target));
    }
    check(doc)?;

    let indices = walk::blocks(doc, sel);
    if indices.is_empty() {
        trace!(%sel, kind = %target, "selection reaches no block, nothing to toggle");
        return Ok(doc.clone());
    }

    let mut next = doc.clone();
    let mut blocks = 0usize;
    for index in indices {
        let block = &mut next.blocks[index];
        if block.kind == BlockKind::Link {
            continue;
        }
        block.kind = if block.kind == target {
            BlockKind::Paragraph
        } else {
            target
        };
        blocks += 1;
    }
    debug!(%sel, kind = %target, blocks, "toggled block type");
    Ok(next)
}

/// True iff the selection reaches at least one block and every such block is `kind`.
pub fn is_block_active(doc: &Document, sel: &Selection, kind: BlockKind) -> bool {
    let indices = walk::blocks(doc, sel);
    !indices.is_empty() && indices.iter().all(|i| doc.blocks[*i].kind == kind)
}

fn check(doc: &Document) -> Result<()> {
    validate(doc).map_err(|violation| {
        warn!(%violation, "rejecting invalid document");
        EditorError::InvalidDocumentState(violation)
    })
}
