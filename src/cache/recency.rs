//! Recency list over slot indices
//!
//! A doubly-linked list whose nodes are addressed by slot index instead of
//! pointers. The front is the least recently used slot, the back the most
//! recently used one. Links live in a `Vec` that only ever grows, so every
//! operation is O(1) and no node is ever freed.

/// Link sentinel for "no neighbour"
const NIL: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct Links {
    prev: u32,
    next: u32,
}

/// Index-linked LRU ordering
#[derive(Debug, Default)]
pub struct RecencyList {
    links: Vec<Links>,
    head: Option<u32>,
    tail: Option<u32>,
}

impl RecencyList {
    /// Create an empty list with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Number of linked slots
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no slot has been linked yet
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Least recently used slot
    pub fn front(&self) -> Option<u32> {
        self.head
    }

    /// Most recently used slot
    pub fn back(&self) -> Option<u32> {
        self.tail
    }

    /// Link the next slot (index `len()`) at the most recently used end
    pub fn push_back(&mut self) -> u32 {
        let idx = self.links.len() as u32;
        self.links.push(Links { prev: NIL, next: NIL });
        self.attach_back(idx);
        idx
    }

    /// Move an already linked slot to the most recently used end
    pub fn move_to_back(&mut self, idx: u32) {
        if self.tail == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_back(idx);
    }

    /// Slots from least to most recently used
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn detach(&mut self, idx: u32) {
        let Links { prev, next } = self.links[idx as usize];

        if prev == NIL {
            self.head = (next != NIL).then_some(next);
        } else {
            self.links[prev as usize].next = next;
        }

        if next == NIL {
            self.tail = (prev != NIL).then_some(prev);
        } else {
            self.links[next as usize].prev = prev;
        }

        self.links[idx as usize] = Links { prev: NIL, next: NIL };
    }

    fn attach_back(&mut self, idx: u32) {
        match self.tail {
            Some(tail) => {
                self.links[tail as usize].next = idx;
                self.links[idx as usize].prev = tail;
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}

/// Iterator over slot indices, LRU first
pub struct Iter<'a> {
    list: &'a RecencyList,
    cursor: Option<u32>,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let idx = self.cursor?;
        let next = self.list.links[idx as usize].next;
        self.cursor = (next != NIL).then_some(next);
        Some(idx)
    }
}
