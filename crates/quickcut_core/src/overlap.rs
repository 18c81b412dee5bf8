use crate::types::{Bounds, Element, TimeMs};

/// Collision resolution and ordering for a single track's element list.
///
/// All routines here operate on derived `[start, end)` bounds and assume the
/// list is sorted ascending by start time on entry. `resolve_overlap` keeps
/// the track overlap-free with a single rightward cascade; `reindex` restores
/// the sort order after one element's start time changed, without a full sort.

/// True if `candidate` intersects any element's bounds, skipping
/// `ignore_index` so a moved element does not collide with its own stale
/// position.
pub fn overlaps(candidate: Bounds, elements: &[Element], ignore_index: Option<usize>) -> bool {
    elements.iter().enumerate().any(|(i, el)| {
        if ignore_index == Some(i) {
            return false;
        }
        candidate.intersects(&el.bounds())
    })
}

/// Shift elements rightward so `candidate` fits without overlap.
///
/// The first element the candidate overlaps (in current order, skipping
/// `ignore_index`) is pushed right by `candidate.end - its.start`. Every
/// element after it is then pushed just far enough to abut its updated
/// predecessor. Elements are never shifted left and never reordered; the
/// displaced block is the minimum contiguous run.
pub fn resolve_overlap(candidate: Bounds, elements: &mut [Element], ignore_index: Option<usize>) {
    if !overlaps(candidate, elements, ignore_index) {
        return;
    }

    let mut shift: Option<TimeMs> = None;
    let mut first_adjusted = false;

    for i in 0..elements.len() {
        let el_bounds = elements[i].bounds();

        if shift.is_none() && ignore_index != Some(i) && candidate.intersects(&el_bounds) {
            shift = Some(candidate.end - el_bounds.start);
        }

        if shift.is_some() && first_adjusted {
            // abut against the predecessor updated in a previous iteration
            let prev_end = elements[i - 1].end();
            if prev_end > el_bounds.start {
                elements[i].playback_start_time = prev_end;
            }
        }

        if let Some(amount) = shift {
            if !first_adjusted {
                elements[i].playback_start_time += amount;
                first_adjusted = true;
            }
        }
    }
}

/// Whether the element at `index` is still ordered correctly relative to its
/// immediate neighbors. A missing neighbor satisfies its side of the check.
fn at_correct_index(elements: &[Element], index: usize) -> bool {
    if elements.len() == 1 && index == 0 {
        return true;
    }
    if index > elements.len() - 1 {
        tracing::warn!(index, len = elements.len(), "index beyond track length");
        return true;
    }

    let start = elements[index].start();
    let before_ok = index == 0 || elements[index - 1].start() < start;
    let after_ok = index == elements.len() - 1 || elements[index + 1].start() > start;
    before_ok && after_ok
}

/// Set a new start time on the element at `index` and restore the sort order
/// if the change pushed it past a neighbor. The element is removed and
/// re-inserted at the first position whose follower starts later, or appended
/// if none does; O(n) and stable for the common small move.
///
/// An out-of-range index is a logged no-op.
pub fn reindex(elements: &mut Vec<Element>, index: usize, new_start: TimeMs) {
    if index >= elements.len() {
        tracing::warn!(index, len = elements.len(), "reindex index out of range");
        return;
    }

    elements[index].playback_start_time = new_start;

    if at_correct_index(elements, index) {
        return;
    }

    let el = elements.remove(index);
    match elements.iter().position(|e| e.start() > el.start()) {
        Some(pos) => elements.insert(pos, el),
        None => elements.push(el),
    }
}

/// Append an element arriving from outside this track (it has no prior index
/// here), then let `reindex` walk it into position.
pub fn insert_sorted(elements: &mut Vec<Element>, element: Element, new_start: TimeMs) {
    elements.push(element);
    let index = elements.len() - 1;
    reindex(elements, index, new_start);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
