//! Deferred structural mutation queue.
//!
//! Structural changes (body/joint add/remove) are never applied to the engine
//! sets directly; they are staged here and drained strictly FIFO at the safe
//! points (`World::step`, `World::snapshot`, or an explicit
//! `World::commit_staged`).

use std::collections::VecDeque;

use crate::core::{BodyId, JointId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StagedChange {
    AddBody(BodyId),
    RemoveBody(BodyId),
    AddJoint(JointId),
    RemoveJoint(JointId),
}

/// FIFO buffer of staged changes with a reentrancy guard on commit.
#[derive(Default)]
pub(crate) struct ChangeQueue {
    changes: VecDeque<StagedChange>,
    committing: bool,
}

impl ChangeQueue {
    pub fn push(&mut self, change: StagedChange) {
        self.changes.push_back(change);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Takes the current batch for draining. Returns `None` if a commit is
    /// already in flight; changes pushed while draining land in the next batch.
    pub fn begin_commit(&mut self) -> Option<VecDeque<StagedChange>> {
        if self.committing {
            return None;
        }
        self.committing = true;
        Some(std::mem::take(&mut self.changes))
    }

    pub fn end_commit(&mut self) {
        self.committing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_preserves_push_order() {
        let mut queue = ChangeQueue::default();
        queue.push(StagedChange::AddBody(BodyId::NULL));
        queue.push(StagedChange::RemoveBody(BodyId::NULL));
        queue.push(StagedChange::AddJoint(JointId::NULL));

        let batch = queue.begin_commit().expect("no commit in flight");
        assert_eq!(
            batch.into_iter().collect::<Vec<_>>(),
            vec![
                StagedChange::AddBody(BodyId::NULL),
                StagedChange::RemoveBody(BodyId::NULL),
                StagedChange::AddJoint(JointId::NULL),
            ]
        );
        queue.end_commit();
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn reentrant_commit_is_refused() {
        let mut queue = ChangeQueue::default();
        queue.push(StagedChange::AddBody(BodyId::NULL));

        let _batch = queue.begin_commit().expect("first commit proceeds");
        assert!(queue.begin_commit().is_none(), "nested commit must be refused");
        queue.end_commit();
        assert!(queue.begin_commit().is_some(), "commit allowed again after end");
    }

    #[test]
    fn pushes_during_commit_land_in_next_batch() {
        let mut queue = ChangeQueue::default();
        queue.push(StagedChange::AddBody(BodyId::NULL));

        let batch = queue.begin_commit().expect("no commit in flight");
        assert_eq!(batch.len(), 1);
        queue.push(StagedChange::RemoveBody(BodyId::NULL));
        queue.end_commit();
        assert_eq!(queue.len(), 1, "change staged mid-commit is deferred");
    }
}
