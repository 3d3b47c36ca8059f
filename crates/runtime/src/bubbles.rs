use std::collections::BTreeMap;

use foundation::DomId;

use crate::session::{StackingOrder, ZIndex};

/// Proof that an asynchronous load was started for a specific bubble
/// instance. A bubble closed and reopened gets a new generation, so the old
/// ticket stops being current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: DomId,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new bubble must be built; its link load should carry `ticket`.
    Created { z: ZIndex, ticket: FetchTicket },
    /// The bubble already exists and was raised.
    Promoted { z: ZIndex },
}

impl OpenOutcome {
    pub fn z(&self) -> ZIndex {
        match self {
            OpenOutcome::Created { z, .. } | OpenOutcome::Promoted { z } => *z,
        }
    }
}

#[derive(Debug)]
struct BubbleRecord {
    z: ZIndex,
    pinned: bool,
    generation: u64,
}

/// Live bubbles keyed by DOM id. At most one bubble exists per id.
#[derive(Debug, Default)]
pub struct BubbleRegistry {
    bubbles: BTreeMap<DomId, BubbleRecord>,
    next_generation: u64,
}

impl BubbleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, name: &str, stacking: &mut StackingOrder) -> OpenOutcome {
        let id = DomId::from_name(name);
        let z = stacking.issue();
        if let Some(record) = self.bubbles.get_mut(&id) {
            record.z = z;
            return OpenOutcome::Promoted { z };
        }

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.bubbles.insert(
            id.clone(),
            BubbleRecord {
                z,
                pinned: false,
                generation,
            },
        );
        tracing::debug!(%id, z = z.0, "bubble opened");
        OpenOutcome::Created {
            z,
            ticket: FetchTicket { id, generation },
        }
    }

    pub fn close(&mut self, id: &DomId) -> bool {
        self.bubbles.remove(id).is_some()
    }

    /// Raises a pressed bubble unless it is already on top.
    pub fn promote_on_press(&mut self, id: &DomId, stacking: &mut StackingOrder) -> Option<ZIndex> {
        let record = self.bubbles.get_mut(id)?;
        if stacking.is_top(record.z) {
            return None;
        }
        record.z = stacking.issue();
        Some(record.z)
    }

    /// Marks a bubble as opened on purpose, so hover-out keeps it.
    pub fn pin(&mut self, id: &DomId) -> bool {
        match self.bubbles.get_mut(id) {
            Some(record) => {
                record.pinned = true;
                true
            }
            None => false,
        }
    }

    pub fn is_pinned(&self, id: &DomId) -> bool {
        self.bubbles.get(id).is_some_and(|r| r.pinned)
    }

    pub fn contains(&self, id: &DomId) -> bool {
        self.bubbles.contains_key(id)
    }

    pub fn z_of(&self, id: &DomId) -> Option<ZIndex> {
        self.bubbles.get(id).map(|r| r.z)
    }

    /// Hover-out rule for a bubble opened by hovering: it goes away unless
    /// it was already open when the hover began or a click pinned it since.
    pub fn should_drop_on_leave(&self, id: &DomId, existed_before: bool) -> bool {
        !existed_before && self.bubbles.get(id).is_some_and(|r| !r.pinned)
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.bubbles
            .get(&ticket.id)
            .is_some_and(|r| r.generation == ticket.generation)
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[test]
    fn second_open_promotes_instead_of_duplicating() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();

        let first = reg.open("Acme Corp", &mut stacking);
        assert!(matches!(first, OpenOutcome::Created { .. }));
        let before = stacking.peek_next();

        let second = reg.open("Acme Corp", &mut stacking);
        assert!(matches!(second, OpenOutcome::Promoted { .. }));
        assert_eq!(reg.len(), 1);
        assert!(stacking.peek_next() > before);
        assert!(second.z() > first.z());
    }

    #[test]
    fn live_bubbles_never_share_a_z_index() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();
        for name in ["A", "B", "C", "A", "B"] {
            reg.open(name, &mut stacking);
        }
        let a = DomId::from_name("A");
        reg.promote_on_press(&a, &mut stacking);

        let zs: BTreeSet<ZIndex> = ["A", "B", "C"]
            .iter()
            .filter_map(|n| reg.z_of(&DomId::from_name(n)))
            .collect();
        assert_eq!(zs.len(), 3);
    }

    #[test]
    fn press_on_top_bubble_is_a_no_op() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();
        reg.open("A", &mut stacking);
        reg.open("B", &mut stacking);
        let b = DomId::from_name("B");
        let a = DomId::from_name("A");

        assert_eq!(reg.promote_on_press(&b, &mut stacking), None);
        let raised = reg.promote_on_press(&a, &mut stacking).unwrap();
        assert!(raised > reg.z_of(&b).unwrap());
        assert_eq!(reg.promote_on_press(&DomId::from_name("Z"), &mut stacking), None);
    }

    #[test]
    fn stale_ticket_after_close_and_reopen() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();
        let OpenOutcome::Created { ticket: old, .. } = reg.open("A", &mut stacking) else {
            panic!("expected a new bubble");
        };
        assert!(reg.is_current(&old));

        assert!(reg.close(&old.id));
        assert!(!reg.is_current(&old));

        let OpenOutcome::Created { ticket: new, .. } = reg.open("A", &mut stacking) else {
            panic!("expected a new bubble");
        };
        assert!(!reg.is_current(&old));
        assert!(reg.is_current(&new));
    }

    #[test]
    fn pin_survives_promotion() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();
        reg.open("A", &mut stacking);
        let a = DomId::from_name("A");
        assert!(!reg.is_pinned(&a));
        assert!(reg.pin(&a));
        reg.open("A", &mut stacking);
        assert!(reg.is_pinned(&a));
        assert!(!reg.pin(&DomId::from_name("missing")));
    }

    #[test]
    fn hover_only_bubble_drops_on_leave() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();
        let a = DomId::from_name("A");
        let existed_before = reg.contains(&a);
        reg.open("A", &mut stacking);
        assert!(reg.should_drop_on_leave(&a, existed_before));
    }

    #[test]
    fn click_during_hover_keeps_the_bubble() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();
        let a = DomId::from_name("A");
        reg.open("A", &mut stacking);
        reg.open("A", &mut stacking);
        reg.pin(&a);
        assert!(!reg.should_drop_on_leave(&a, false));
    }

    #[test]
    fn bubble_open_before_hover_survives_leave() {
        let mut stacking = StackingOrder::default();
        let mut reg = BubbleRegistry::new();
        let a = DomId::from_name("A");
        reg.open("A", &mut stacking);
        let existed_before = reg.contains(&a);
        reg.open("A", &mut stacking);
        assert!(existed_before);
        assert!(!reg.should_drop_on_leave(&a, existed_before));
    }

    #[test]
    fn leave_before_the_delay_has_nothing_to_drop() {
        let reg = BubbleRegistry::new();
        assert!(!reg.should_drop_on_leave(&DomId::from_name("A"), false));
    }
}
