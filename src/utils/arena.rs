use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Slot identifier with generation tracking to prevent stale references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SlotId {
    index: u32,
    generation: u32,
}

impl SlotId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The null id, never handed out by an arena.
    pub const NULL: SlotId = SlotId {
        index: u32::MAX,
        generation: 0,
    };

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::NULL
    }
}

/// Generational arena that hands out stable ids while preventing use-after-free.
///
/// Backs the live body and joint registries: structural mutation happens only
/// through explicit insert/remove calls at commit time, never while iterating.
pub struct Arena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
            live: 0,
        }
    }

    pub fn insert(&mut self, item: T) -> SlotId {
        self.live += 1;
        if let Some(index) = self.free_list.pop_front() {
            let generation = self.generations[index];
            self.items[index] = Some(item);
            return SlotId::new(index as u32, generation);
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        SlotId::new(index as u32, 0)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        if self.is_valid(id) {
            self.items
                .get(id.index() as usize)
                .and_then(|slot| slot.as_ref())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        if self.is_valid(id) {
            self.items
                .get_mut(id.index() as usize)
                .and_then(|slot| slot.as_mut())
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        if !self.is_valid(id) {
            return None;
        }
        let index = id.index() as usize;
        let slot = self.items.get_mut(index)?;
        if slot.is_some() {
            self.generations[index] = self.generations[index].wrapping_add(1);
            self.free_list.push_back(index);
            self.live -= 1;
        }
        slot.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.items.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|_| SlotId::new(index as u32, self.generations[index]))
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn is_valid(&self, id: SlotId) -> bool {
        !id.is_null()
            && self
                .generations
                .get(id.index() as usize)
                .copied()
                .map(|generation| generation == id.generation())
                .unwrap_or(false)
    }
}
