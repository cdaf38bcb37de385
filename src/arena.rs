//! Chunked slot allocator that hands out copyable handles instead of references.

use std::mem;
use std::ops::{Index, IndexMut};

/// A handle to an object allocated in a `TypedArena<T>`.
///
/// Handles are plain values, so any number of them can refer to the same object without owning
/// it. A handle is only meaningful for the arena that produced it and becomes stale once the object
/// is freed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk: usize,
    slot: usize,
}

enum Slot<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator for a single type of object.
///
/// Objects live in fixed-size chunks so growing the arena never moves existing objects. Freed
/// slots are threaded onto a free list and reused by later allocations before a new chunk is
/// pushed. All objects still allocated are dropped with the arena.
///
/// # Examples
///
/// ```
/// use balanced_trees::arena::TypedArena;
///
/// let mut arena = TypedArena::new(64);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), 2);
/// assert_eq!(arena.get(x), None);
/// ```
pub struct TypedArena<T> {
    chunks: Vec<Vec<Slot<T>>>,
    free_head: Option<Handle>,
    chunk_size: usize,
    len: usize,
}

impl<T> TypedArena<T> {
    /// Constructs a new, empty `TypedArena<T>` that holds `chunk_size` objects per chunk. A chunk
    /// size of zero is treated as one.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// assert!(arena.is_empty());
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        TypedArena {
            chunks: Vec::new(),
            free_head: None,
            chunk_size: chunk_size.max(1),
            len: 0,
        }
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.chunks
            .get(handle.chunk)
            .and_then(|chunk| chunk.get(handle.slot))
    }

    fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot<T>> {
        self.chunks
            .get_mut(handle.chunk)
            .and_then(|chunk| chunk.get_mut(handle.slot))
    }

    /// Moves `value` into the arena and returns a handle to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate("x");
    /// assert_eq!(arena.get(x), Some(&"x"));
    /// ```
    pub fn allocate(&mut self, value: T) -> Handle {
        self.len += 1;

        if let Some(handle) = self.free_head {
            let slot = &mut self.chunks[handle.chunk][handle.slot];
            match mem::replace(slot, Slot::Occupied(value)) {
                Slot::Vacant(next) => self.free_head = next,
                Slot::Occupied(_) => unreachable!(),
            }
            return handle;
        }

        let needs_chunk = self
            .chunks
            .last()
            .map_or(true, |chunk| chunk.len() == self.chunk_size);
        if needs_chunk {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
        }

        let chunk = self.chunks.len() - 1;
        let slots = &mut self.chunks[chunk];
        slots.push(Slot::Occupied(value));
        Handle {
            chunk,
            slot: slots.len() - 1,
        }
    }

    /// Removes the object behind `handle` from the arena and returns it. The slot is reused by a
    /// later allocation.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to an allocated object.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(x), 0);
    /// ```
    pub fn free(&mut self, handle: Handle) -> T {
        let next = self.free_head;
        let slot = self
            .slot_mut(handle)
            .expect("Error: attempting to free an invalid handle.");
        match mem::replace(slot, Slot::Vacant(next)) {
            Slot::Occupied(value) => {
                self.free_head = Some(handle);
                self.len -= 1;
                value
            },
            Slot::Vacant(next) => {
                *slot = Slot::Vacant(next);
                panic!("Error: attempting to free a vacant slot.");
            },
        }
    }

    /// Returns an immutable reference to the object behind `handle`, or `None` if the handle does
    /// not refer to an allocated object.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.slot(handle) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the object behind `handle`, or `None` if the handle does not
    /// refer to an allocated object.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.slot_mut(handle) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the number of allocated objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no objects are allocated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every object and releases all chunks. Every outstanding handle becomes stale.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.free_head = None;
        self.len = 0;
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle does not refer to an allocated object.")
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle)
            .expect("Error: handle does not refer to an allocated object.")
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, TypedArena};

    #[test]
    #[should_panic]
    fn test_free_invalid_handle() {
        let mut arena: TypedArena<u32> = TypedArena::new(16);
        arena.free(Handle { chunk: 0, slot: 0 });
    }

    #[test]
    #[should_panic]
    fn test_double_free() {
        let mut arena = TypedArena::new(16);
        let x = arena.allocate(0);
        arena.free(x);
        arena.free(x);
    }

    #[test]
    fn test_allocate_fills_chunks_in_order() {
        let mut arena = TypedArena::new(2);
        assert_eq!(arena.allocate(0), Handle { chunk: 0, slot: 0 });
        assert_eq!(arena.allocate(1), Handle { chunk: 0, slot: 1 });
        assert_eq!(arena.allocate(2), Handle { chunk: 1, slot: 0 });
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut arena = TypedArena::new(0);
        assert_eq!(arena.allocate(0), Handle { chunk: 0, slot: 0 });
        assert_eq!(arena.allocate(1), Handle { chunk: 1, slot: 0 });
    }

    #[test]
    fn test_free_reuses_slots() {
        let mut arena = TypedArena::new(16);
        let x = arena.allocate(0);
        let y = arena.allocate(1);
        assert_eq!(arena.free(x), 0);
        assert_eq!(arena.free(y), 1);
        assert!(arena.is_empty());

        // most recently freed slot is handed out first
        assert_eq!(arena.allocate(2), y);
        assert_eq!(arena.allocate(3), x);
        assert_eq!(arena.allocate(4), Handle { chunk: 0, slot: 2 });
    }

    #[test]
    fn test_get_vacant_and_invalid() {
        let mut arena = TypedArena::new(16);
        let x = arena.allocate(0);
        arena.free(x);
        assert_eq!(arena.get(x), None);
        assert_eq!(arena.get(Handle { chunk: 3, slot: 0 }), None);
    }

    #[test]
    fn test_get_mut() {
        let mut arena = TypedArena::new(16);
        let x = arena.allocate(0);
        *arena.get_mut(x).unwrap() = 5;
        assert_eq!(arena[x], 5);
    }

    #[test]
    fn test_clear() {
        let mut arena = TypedArena::new(16);
        let x = arena.allocate(0);
        arena.allocate(1);
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.get(x), None);
        assert_eq!(arena.allocate(2), Handle { chunk: 0, slot: 0 });
    }
}
