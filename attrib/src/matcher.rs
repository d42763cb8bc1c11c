//! Nearest enclosing claim event for a selected candidate.

use attrib_core::{ClaimEvent, Provenance};

/// The claim event with the smallest span that fully contains the
/// candidate, among events sharing its governing scope.
///
/// Containment is inclusive on both ends. Ties on span length keep the
/// first event encountered in document order. `None` means no event in the
/// scope contains the candidate; the caller counts that and carries on.
#[must_use]
pub fn enclosing_event<'a>(
    candidate: &Provenance,
    events: &[&'a ClaimEvent],
) -> Option<&'a ClaimEvent> {
    let mut best: Option<&'a ClaimEvent> = None;
    for &event in events {
        if !event.provenance.contains(candidate) {
            continue;
        }
        match best {
            Some(b) if event.provenance.length >= b.provenance.length => {}
            _ => best = Some(event),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, start: usize, length: usize) -> ClaimEvent {
        ClaimEvent {
            id: id.into(),
            provenance: Provenance {
                scope: "s0".into(),
                start,
                length,
                text: String::new(),
            },
        }
    }

    fn cand(start: usize, length: usize) -> Provenance {
        Provenance {
            scope: "s0".into(),
            start,
            length,
            text: String::new(),
        }
    }

    #[test]
    fn picks_the_smallest_containing_event() {
        let outer = event("outer", 0, 100);
        let inner = event("inner", 10, 20);
        let found = enclosing_event(&cand(12, 5), &[&outer, &inner]).unwrap();
        assert_eq!(found.id, "inner");
    }

    #[test]
    fn exact_boundaries_count_as_contained() {
        let exact = event("exact", 12, 5);
        let found = enclosing_event(&cand(12, 5), &[&exact]).unwrap();
        assert_eq!(found.id, "exact");
    }

    #[test]
    fn non_containing_events_are_ignored() {
        let left = event("left", 0, 10);
        let partial = event("partial", 10, 5);
        assert!(enclosing_event(&cand(12, 5), &[&left, &partial]).is_none());
    }

    #[test]
    fn equal_length_keeps_the_first() {
        let a = event("a", 10, 10);
        let b = event("b", 12, 10);
        let found = enclosing_event(&cand(14, 2), &[&a, &b]).unwrap();
        assert_eq!(found.id, "a");
    }
}
