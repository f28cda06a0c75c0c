use super::entry::{resolve, resolve_mut, Entry};
use super::trace::{SearchPath, SearchStep};
use crate::arena::{Handle, TypedArena};
use crate::error::{Error, Result};
use tracing::debug;

/// A level together with the first entry linked at that level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct HeadPosition {
    pub level: usize,
    pub first: Handle,
}

/// The outcome of unlinking a key from the level heads.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct HeadRemoval {
    /// The head at which the downward walk stopped, if it stopped on a non-empty level.
    pub resume: Option<HeadPosition>,
    /// The lowest level at which the key was unlinked from a head.
    pub lowest_cleared: Option<usize>,
    pub removed: Option<Handle>,
}

/// The per-level head slots of an index. Slot `n` holds the first entry linked at level `n`.
///
/// The chain always has at least one level and never shrinks.
#[derive(Debug)]
pub(crate) struct LevelHeads {
    firsts: Vec<Option<Handle>>,
}

impl LevelHeads {
    pub fn new() -> Self {
        LevelHeads { firsts: vec![None] }
    }

    pub fn len(&self) -> usize {
        self.firsts.len()
    }

    pub fn add_level(&mut self) {
        self.firsts.push(None);
        debug!(levels = self.firsts.len(), "grew level chain");
    }

    /// Grows the chain until `level` is a valid level.
    pub fn ensure_level(&mut self, level: usize) {
        while self.firsts.len() <= level {
            self.add_level();
        }
    }

    pub fn level_at(&self, level: usize) -> Result<Option<Handle>> {
        self.firsts.get(level).cloned().ok_or(Error::LevelOutOfRange {
            level,
            height: self.firsts.len(),
        })
    }

    pub fn bottom(&self) -> Option<Handle> {
        self.firsts[0]
    }

    /// Empties every level without lowering the chain.
    pub fn clear(&mut self) {
        for first in &mut self.firsts {
            *first = None;
        }
    }

    /// Threads the entry stored under `handle` in as the first entry of every level, from its top
    /// level down, for as long as the level is empty or starts with a greater key.
    ///
    /// Returns the first level at which an entry with a smaller key already leads, together with
    /// that entry; the caller finishes linking that level and the ones below from there. Returns
    /// `None` if the entry became the first entry on all of its levels.
    pub fn locate_insertion_point<T>(
        &mut self,
        arena: &mut TypedArena<Entry<T>>,
        handle: Handle,
    ) -> Result<Option<HeadPosition>>
    where
        T: Ord,
    {
        let mut level = resolve(arena, handle)?.height() - 1;
        self.ensure_level(level);

        loop {
            let first = self.firsts[level];
            if let Some(first) = first {
                if resolve(arena, first)?.key() <= resolve(arena, handle)?.key() {
                    return Ok(Some(HeadPosition { level, first }));
                }
            }

            resolve_mut(arena, handle)?.set_link_at(level, first)?;
            self.firsts[level] = Some(handle);

            if level == 0 {
                return Ok(None);
            }
            level -= 1;
        }
    }

    /// Walks down from the top of the chain and returns the highest level whose first entry has
    /// a key less than or equal to `key`. Returns `None` if every level is empty or starts with a
    /// greater key.
    pub fn locate_search_entry<'a, T>(
        &self,
        arena: &'a TypedArena<Entry<T>>,
        key: &T,
        path: &mut SearchPath<'a, T>,
    ) -> Result<Option<HeadPosition>>
    where
        T: Ord,
    {
        let mut level = self.firsts.len() - 1;

        loop {
            let first = self.firsts[level];
            let first_key = match first {
                Some(first) => Some(resolve(arena, first)?.key()),
                None => None,
            };

            match (first, first_key) {
                (Some(first), Some(first_key)) if first_key <= key => {
                    return Ok(Some(HeadPosition { level, first }));
                },
                _ => path.record(move || SearchStep::Head { level, first: first_key }),
            }

            if level == 0 {
                return Ok(None);
            }
            level -= 1;
        }
    }

    /// Unlinks `key` from every level at which it is the first entry, from the top down.
    ///
    /// Entries that lead a level lead every level below it up to the point where a smaller key
    /// appears, so the walk stops at the first level led by a different entry. Removal from that
    /// level and the levels below it is left to the caller.
    pub fn remove_from_heads<T>(&mut self, arena: &mut TypedArena<Entry<T>>, key: &T) -> Result<HeadRemoval>
    where T: Ord {
        let mut position = self.locate_search_entry(arena, key, &mut SearchPath::disabled())?;
        let mut removal = HeadRemoval {
            resume: None,
            lowest_cleared: None,
            removed: None,
        };

        while let Some(HeadPosition { level, first }) = position {
            if resolve(arena, first)?.key() != key {
                break;
            }

            let successor = resolve_mut(arena, first)?.set_link_at(level, None)?;
            self.firsts[level] = successor;
            removal.removed = Some(first);
            removal.lowest_cleared = Some(level);

            if level == 0 {
                position = None;
            } else {
                let below = level - 1;
                position = self.firsts[below].map(|first| HeadPosition { level: below, first });
            }
        }

        removal.resume = position;
        Ok(removal)
    }
}

#[cfg(test)]
mod tests {
    use super::{HeadPosition, LevelHeads};
    use crate::arena::{Handle, TypedArena};
    use crate::error::Error;
    use crate::skiplist::entry::Entry;
    use crate::skiplist::trace::{SearchPath, SearchStep};

    fn thread(heads: &mut LevelHeads, arena: &mut TypedArena<Entry<u32>>, key: u32, height: usize) -> Handle {
        let handle = arena.allocate(Entry::new(key, height));
        assert_eq!(heads.locate_insertion_point(arena, handle), Ok(None));
        handle
    }

    #[test]
    fn test_new() {
        let heads = LevelHeads::new();
        assert_eq!(heads.len(), 1);
        assert_eq!(heads.level_at(0), Ok(None));
        assert_eq!(
            heads.level_at(1),
            Err(Error::LevelOutOfRange { level: 1, height: 1 }),
        );
    }

    #[test]
    fn test_ensure_level() {
        let mut heads = LevelHeads::new();
        heads.ensure_level(3);
        assert_eq!(heads.len(), 4);
        heads.ensure_level(2);
        assert_eq!(heads.len(), 4);
        heads.add_level();
        assert_eq!(heads.len(), 5);
    }

    #[test]
    fn test_locate_insertion_point_into_empty_chain() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        let handle = thread(&mut heads, &mut arena, 5, 3);

        assert_eq!(heads.len(), 3);
        for level in 0..3 {
            assert_eq!(heads.level_at(level), Ok(Some(handle)));
            assert_eq!(arena[handle].link_at(level), Ok(None));
        }
    }

    #[test]
    fn test_locate_insertion_point_before_first() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        let five = thread(&mut heads, &mut arena, 5, 2);
        let three = thread(&mut heads, &mut arena, 3, 1);

        assert_eq!(heads.level_at(1), Ok(Some(five)));
        assert_eq!(heads.level_at(0), Ok(Some(three)));
        assert_eq!(arena[three].link_at(0), Ok(Some(five)));
    }

    #[test]
    fn test_locate_insertion_point_stops_at_smaller_first() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        let one = thread(&mut heads, &mut arena, 1, 1);
        let five = arena.allocate(Entry::new(5, 2));

        assert_eq!(
            heads.locate_insertion_point(&mut arena, five),
            Ok(Some(HeadPosition { level: 0, first: one })),
        );
        assert_eq!(heads.level_at(1), Ok(Some(five)));
        assert_eq!(heads.level_at(0), Ok(Some(one)));
    }

    #[test]
    fn test_locate_search_entry() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        let eight = thread(&mut heads, &mut arena, 8, 3);
        let two = thread(&mut heads, &mut arena, 2, 1);

        let mut path = SearchPath::enabled();
        assert_eq!(heads.locate_search_entry(&arena, &1, &mut path), Ok(None));
        assert_eq!(path.len(), 3);

        let mut path = SearchPath::enabled();
        assert_eq!(
            heads.locate_search_entry(&arena, &5, &mut path),
            Ok(Some(HeadPosition { level: 0, first: two })),
        );
        let expected = [
            SearchStep::Head { level: 2, first: Some(&8u32) },
            SearchStep::Head { level: 1, first: Some(&8u32) },
        ];
        assert_eq!(path.steps(), &expected[..]);

        assert_eq!(
            heads.locate_search_entry(&arena, &9, &mut SearchPath::disabled()),
            Ok(Some(HeadPosition { level: 2, first: eight })),
        );
    }

    #[test]
    fn test_remove_from_heads() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        let five = thread(&mut heads, &mut arena, 5, 2);
        let three = thread(&mut heads, &mut arena, 3, 1);

        let removal = heads.remove_from_heads(&mut arena, &5).unwrap();
        assert_eq!(removal.removed, Some(five));
        assert_eq!(removal.lowest_cleared, Some(1));
        assert_eq!(removal.resume, Some(HeadPosition { level: 0, first: three }));
        assert_eq!(heads.level_at(1), Ok(None));
        assert_eq!(heads.len(), 2);
    }

    #[test]
    fn test_remove_from_heads_every_level() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        let seven = arena.allocate(Entry::new(7, 1));
        let three = thread(&mut heads, &mut arena, 3, 2);
        arena[three].set_link_at(0, Some(seven)).unwrap();

        let removal = heads.remove_from_heads(&mut arena, &3).unwrap();
        assert_eq!(removal.removed, Some(three));
        assert_eq!(removal.lowest_cleared, Some(0));
        assert_eq!(removal.resume, None);
        assert_eq!(heads.level_at(0), Ok(Some(seven)));
        assert_eq!(arena[three].link_at(0), Ok(None));
    }

    #[test]
    fn test_remove_from_heads_missing_key() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        let three = thread(&mut heads, &mut arena, 3, 1);

        let removal = heads.remove_from_heads(&mut arena, &4).unwrap();
        assert_eq!(removal.removed, None);
        assert_eq!(removal.lowest_cleared, None);
        assert_eq!(removal.resume, Some(HeadPosition { level: 0, first: three }));
    }

    #[test]
    fn test_clear_keeps_levels() {
        let mut arena = TypedArena::new(16);
        let mut heads = LevelHeads::new();
        thread(&mut heads, &mut arena, 3, 4);
        heads.clear();
        assert_eq!(heads.len(), 4);
        assert_eq!(heads.bottom(), None);
    }
}
