//! A doubly linked list stored in a vector.
//!
//! Positions are plain indices into the backing storage, so the parser can hold on to
//! them while splicing neighbors in and out. Removed slots are never reused; a
//! position stays valid until the value stored there is removed.

use std::ops::Index;

pub type Position = usize;

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    prev: Option<Position>,
    next: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct Sequence<T> {
    slots: Vec<Slot<T>>,
    head: Option<Position>,
    tail: Option<Position>,
    len: usize,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }
}

impl<T> Sequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<Position> {
        self.head
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        self.slots.get(pos).and_then(|slot| slot.value.as_ref())
    }

    pub fn next(&self, pos: Position) -> Option<Position> {
        self.live(pos).next
    }

    pub fn prev(&self, pos: Position) -> Option<Position> {
        self.live(pos).prev
    }

    pub fn push_back(&mut self, value: T) -> Position {
        match self.tail {
            Some(tail) => self.insert_after(tail, value),
            None => {
                let pos = self.alloc(value, None, None);
                self.head = Some(pos);
                self.tail = Some(pos);
                pos
            }
        }
    }

    pub fn push_front(&mut self, value: T) -> Position {
        match self.head {
            Some(head) => self.insert_before(head, value),
            None => self.push_back(value),
        }
    }

    pub fn insert_after(&mut self, pos: Position, value: T) -> Position {
        let next = self.live(pos).next;
        let new = self.alloc(value, Some(pos), next);
        self.slots[pos].next = Some(new);
        match next {
            Some(next) => self.slots[next].prev = Some(new),
            None => self.tail = Some(new),
        }
        new
    }

    pub fn insert_before(&mut self, pos: Position, value: T) -> Position {
        let prev = self.live(pos).prev;
        let new = self.alloc(value, prev, Some(pos));
        self.slots[pos].prev = Some(new);
        match prev {
            Some(prev) => self.slots[prev].next = Some(new),
            None => self.head = Some(new),
        }
        new
    }

    /// Unlinks the value at `pos`, joining its neighbors to each other.
    pub fn remove(&mut self, pos: Position) -> T {
        let (prev, next) = {
            let slot = self.live(pos);
            (slot.prev, slot.next)
        };
        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }
        let slot = &mut self.slots[pos];
        slot.prev = None;
        slot.next = None;
        self.len -= 1;
        match slot.value.take() {
            Some(value) => value,
            None => unreachable!("slot {} was checked to be live", pos),
        }
    }

    /// Swaps in a new value at `pos` without touching any links.
    pub fn replace(&mut self, pos: Position, value: T) -> T {
        self.live(pos);
        match self.slots[pos].value.replace(value) {
            Some(old) => old,
            None => unreachable!("slot {} was checked to be live", pos),
        }
    }

    /// The first position at or after `from` whose value matches.
    pub fn find_forward(&self, from: Position, mut pred: impl FnMut(&T) -> bool) -> Option<Position> {
        let mut cur = Some(from);
        while let Some(pos) = cur {
            if pred(&self[pos]) {
                return Some(pos);
            }
            cur = self.next(pos);
        }
        None
    }

    /// The first position at or before `from` whose value matches.
    pub fn find_backward(&self, from: Position, mut pred: impl FnMut(&T) -> bool) -> Option<Position> {
        let mut cur = Some(from);
        while let Some(pos) = cur {
            if pred(&self[pos]) {
                return Some(pos);
            }
            cur = self.prev(pos);
        }
        None
    }

    #[cfg(test)]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            seq: self,
            cur: self.head,
        }
    }

    fn alloc(&mut self, value: T, prev: Option<Position>, next: Option<Position>) -> Position {
        self.slots.push(Slot {
            value: Some(value),
            prev,
            next,
        });
        self.len += 1;
        self.slots.len() - 1
    }

    fn live(&self, pos: Position) -> &Slot<T> {
        match self.slots.get(pos) {
            Some(slot) if slot.value.is_some() => slot,
            _ => panic!("position {} is not part of the sequence", pos),
        }
    }
}

impl<T> Index<Position> for Sequence<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        match self.get(pos) {
            Some(value) => value,
            None => panic!("position {} is not part of the sequence", pos),
        }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        for value in iter {
            seq.push_back(value);
        }
        seq
    }
}

#[cfg(test)]
pub struct Iter<'a, T> {
    seq: &'a Sequence<T>,
    cur: Option<Position>,
}

#[cfg(test)]
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.cur?;
        self.cur = self.seq.next(pos);
        Some(&self.seq[pos])
    }
}
