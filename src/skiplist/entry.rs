use crate::arena::{Handle, TypedArena};
use crate::error::{Error, Result};
use std::mem;

pub(crate) fn resolve<T>(arena: &TypedArena<Entry<T>>, handle: Handle) -> Result<&Entry<T>> {
    arena.get(handle).ok_or(Error::StaleHandle)
}

pub(crate) fn resolve_mut<T>(arena: &mut TypedArena<Entry<T>>, handle: Handle) -> Result<&mut Entry<T>> {
    arena.get_mut(handle).ok_or(Error::StaleHandle)
}

pub(crate) fn key_of<T>(arena: &TypedArena<Entry<T>>, handle: Option<Handle>) -> Result<Option<&T>> {
    handle.map(|handle| resolve(arena, handle).map(Entry::key)).transpose()
}

/// A stored key together with one forward link per level it participates in.
///
/// The height of an entry is fixed when it is created. An entry of height `h` is linked into
/// every level in `[0, h)` and never into a level at or above `h`.
#[derive(Debug)]
pub struct Entry<T> {
    key: T,
    links: Vec<Option<Handle>>,
}

impl<T> Entry<T> {
    /// Constructs an unlinked entry.
    ///
    /// # Panics
    ///
    /// Panics if `height` is zero.
    pub fn new(key: T, height: usize) -> Self {
        assert!(height > 0, "entry height must be non-zero.");
        Entry {
            key,
            links: vec![None; height],
        }
    }

    pub fn key(&self) -> &T {
        &self.key
    }

    pub fn height(&self) -> usize {
        self.links.len()
    }

    fn check_level(&self, level: usize) -> Result<()> {
        if level >= self.height() {
            return Err(Error::LevelOutOfRange {
                level,
                height: self.height(),
            });
        }
        Ok(())
    }

    /// Returns the successor of this entry at `level`.
    pub fn link_at(&self, level: usize) -> Result<Option<Handle>> {
        self.check_level(level)?;
        Ok(self.links[level])
    }

    /// Replaces the successor of this entry at `level` and returns the previous successor.
    pub fn set_link_at(&mut self, level: usize, successor: Option<Handle>) -> Result<Option<Handle>> {
        self.check_level(level)?;
        Ok(mem::replace(&mut self.links[level], successor))
    }

    /// Links `entry`, which is stored under `handle`, immediately after this entry at `level`.
    ///
    /// The level must be valid for both entries.
    pub fn splice_after(&mut self, entry: &mut Entry<T>, handle: Handle, level: usize) -> Result<()> {
        let shared_height = self.height().min(entry.height());
        if level >= shared_height {
            return Err(Error::LevelOutOfRange {
                level,
                height: shared_height,
            });
        }
        entry.links[level] = mem::replace(&mut self.links[level], Some(handle));
        Ok(())
    }
}
