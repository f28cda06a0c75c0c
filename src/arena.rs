//! Fast, but limited allocator with generation-checked handles.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A handle to an object allocated in a `TypedArena<T>`.
///
/// The handle records the generation of the block it was issued for. Once the object is freed
/// the block's generation advances, so an old handle no longer resolves even if the block is
/// reused.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
    generation: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Position {
    chunk_index: usize,
    block_index: usize,
}

enum Block<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next: Option<Position> },
}

/// A fast, but limited allocator that only allocates a single type of object.
///
/// All objects inside the arena will be destroyed when the typed arena is destroyed. Objects can
/// be freed individually, and the vacated blocks are kept on a free list and handed out again by
/// later allocations. The underlying container is a `Vec` of fixed-capacity chunks, so objects are
/// never moved once allocated and the code uses no unsafe code.
///
/// # Examples
///
/// ```
/// use skip_index::arena::TypedArena;
///
/// let mut arena = TypedArena::new(1024);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), Some(2));
/// assert_eq!(arena.get(x), None);
/// ```
pub struct TypedArena<T> {
    head: Option<Position>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    size: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    /// Constructs a new, empty `TypedArena<T>` with a specific number of objects per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use skip_index::arena::TypedArena;
    ///
    /// // creates a new TypedArena<T> that contains a maximum of 1024 u32's per chunk
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero.");
        TypedArena {
            head: None,
            chunks: Vec::new(),
            chunk_size,
            size: 0,
            capacity: 0,
        }
    }

    fn block(&self, handle: Handle) -> Option<&Block<T>> {
        self.chunks
            .get(handle.chunk_index)
            .and_then(|chunk| chunk.get(handle.block_index))
    }

    fn is_live(&self, handle: Handle) -> bool {
        match self.block(handle) {
            Some(Block::Occupied { generation, .. }) => *generation == handle.generation,
            _ => false,
        }
    }

    /// Allocates an object in the typed arena and returns a `Handle`. The handle can later be
    /// used to retrieve mutable and immutable references to the object, and to free it.
    ///
    /// # Examples
    ///
    /// ```
    /// use skip_index::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> Handle {
        self.size += 1;

        match self.head.take() {
            None => {
                if self.chunks.last().map_or(true, |chunk| chunk.len() == self.chunk_size) {
                    self.chunks.push(Vec::with_capacity(self.chunk_size));
                    self.capacity += self.chunk_size;
                }
                let chunk_index = self.chunks.len() - 1;
                let last_chunk = &mut self.chunks[chunk_index];
                last_chunk.push(Block::Occupied { generation: 0, value });
                Handle {
                    chunk_index,
                    block_index: last_chunk.len() - 1,
                    generation: 0,
                }
            },
            Some(position) => {
                let block = &mut self.chunks[position.chunk_index][position.block_index];
                let (generation, next) = match *block {
                    Block::Vacant { generation, next } => (generation, next),
                    Block::Occupied { .. } => unreachable!("free list points at an occupied block"),
                };
                *block = Block::Occupied { generation, value };
                self.head = next;
                Handle {
                    chunk_index: position.chunk_index,
                    block_index: position.block_index,
                    generation,
                }
            },
        }
    }

    /// Frees an object in the typed arena and returns it. Returns `None` if the handle is stale
    /// or does not belong to this arena, in which case nothing is freed.
    ///
    /// # Examples
    ///
    /// ```
    /// use skip_index::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(x), Some(0));
    /// assert_eq!(arena.free(x), None);
    /// ```
    pub fn free(&mut self, handle: Handle) -> Option<T> {
        if !self.is_live(handle) {
            return None;
        }
        let vacant = Block::Vacant {
            generation: handle.generation.wrapping_add(1),
            next: self.head,
        };
        let old_block = mem::replace(
            &mut self.chunks[handle.chunk_index][handle.block_index],
            vacant,
        );
        match old_block {
            Block::Occupied { value, .. } => {
                self.size -= 1;
                self.head = Some(Position {
                    chunk_index: handle.chunk_index,
                    block_index: handle.block_index,
                });
                Some(value)
            },
            Block::Vacant { .. } => unreachable!("live handle points at a vacant block"),
        }
    }

    /// Returns an immutable reference to an object in the typed arena. Returns `None` if the
    /// handle does not correspond to a live object.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.block(handle) {
            Some(Block::Occupied { generation, value }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to an object in the typed arena. Returns `None` if the handle
    /// does not correspond to a live object.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let block = self
            .chunks
            .get_mut(handle.chunk_index)
            .and_then(|chunk| chunk.get_mut(handle.block_index));
        match block {
            Some(Block::Occupied { generation, value }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Returns mutable references to two distinct objects at once. Returns `None` if either
    /// handle is not live or if both handles refer to the same object.
    ///
    /// # Examples
    ///
    /// ```
    /// use skip_index::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(2);
    /// let x = arena.allocate(1);
    /// let y = arena.allocate(2);
    /// {
    ///     let (a, b) = arena.get_pair_mut(x, y).unwrap();
    ///     std::mem::swap(a, b);
    /// }
    /// assert_eq!(arena[x], 2);
    /// assert_eq!(arena[y], 1);
    /// assert!(arena.get_pair_mut(x, x).is_none());
    /// ```
    pub fn get_pair_mut(&mut self, first: Handle, second: Handle) -> Option<(&mut T, &mut T)> {
        if !self.is_live(first) || !self.is_live(second) {
            return None;
        }
        if first.chunk_index == second.chunk_index && first.block_index == second.block_index {
            return None;
        }

        let (first_block, second_block) = if first.chunk_index == second.chunk_index {
            let chunk = &mut self.chunks[first.chunk_index];
            if first.block_index < second.block_index {
                let (left, right) = chunk.split_at_mut(second.block_index);
                (&mut left[first.block_index], &mut right[0])
            } else {
                let (left, right) = chunk.split_at_mut(first.block_index);
                (&mut right[0], &mut left[second.block_index])
            }
        } else if first.chunk_index < second.chunk_index {
            let (left, right) = self.chunks.split_at_mut(second.chunk_index);
            (
                &mut left[first.chunk_index][first.block_index],
                &mut right[0][second.block_index],
            )
        } else {
            let (left, right) = self.chunks.split_at_mut(first.chunk_index);
            (
                &mut right[0][first.block_index],
                &mut left[second.chunk_index][second.block_index],
            )
        };

        match (first_block, second_block) {
            (Block::Occupied { value: a, .. }, Block::Occupied { value: b, .. }) => Some((a, b)),
            _ => None,
        }
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of blocks reserved across all chunks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every object and releases all chunks.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.size = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle does not refer to a live object.")
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle).expect("Error: handle does not refer to a live object.")
    }
}
