use slab::Slab;
use static_assertions::const_assert_eq;
use std::{
    mem,
    num::NonZeroU32,
    ops::{Index, IndexMut},
};

/// An opaque number that identifies one value stored in an [`Arena32`]. Two ids compare equal iff they name the same slot, so
/// ids double as object identities.
///
/// An `Option<ArenaId32>` still only requires 32 bits.
pub type ArenaId32 = NonZeroU32;

const_assert_eq!(
    mem::size_of::<Option<ArenaId32>>(),
    mem::size_of::<ArenaId32>()
);

/// Stores up to `u32::MAX - 1` values of type `T`, indexed by 32-bit [`ArenaId32`].
///
/// Values are only ever appended; an id stays valid for the lifetime of the arena.
pub struct Arena32<T> {
    values: Slab<T>,
}

impl<T> Default for Arena32<T> {
    fn default() -> Self {
        Self { values: Slab::new() }
    }
}

impl<T> Arena32<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, id: ArenaId32) -> Option<&T> {
        self.values.get(Self::id_to_index(id))
    }

    #[inline]
    pub fn get_mut(&mut self, id: ArenaId32) -> Option<&mut T> {
        self.values.get_mut(Self::id_to_index(id))
    }

    #[inline]
    pub fn insert(&mut self, value: T) -> ArenaId32 {
        let index = self.values.insert(value);
        Self::index_to_id(index)
    }

    const MAX_VALID_INDEX: usize = (u32::MAX - 1) as usize;

    const fn id_to_index(id: ArenaId32) -> usize {
        // XOR flips all of the bits so that u32::MAX maps to slab index zero.
        (id.get() ^ u32::MAX) as usize
    }

    fn index_to_id(index: usize) -> ArenaId32 {
        assert!(index <= Self::MAX_VALID_INDEX, "Arena32 is full");
        // Any index below u32::MAX flips to a nonzero id.
        match NonZeroU32::new((index as u32) ^ u32::MAX) {
            Some(id) => id,
            None => unreachable!(),
        }
    }
}

impl<T> Index<ArenaId32> for Arena32<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: ArenaId32) -> &Self::Output {
        self.values.index(Self::id_to_index(id))
    }
}

impl<T> IndexMut<ArenaId32> for Arena32<T> {
    #[inline]
    fn index_mut(&mut self, id: ArenaId32) -> &mut Self::Output {
        self.values.index_mut(Self::id_to_index(id))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
