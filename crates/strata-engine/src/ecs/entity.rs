/// Opaque entity handle: a storage slot index plus a generation counter.
///
/// The generation is bumped every time a slot is recycled, so a handle kept
/// across a destroy never resolves to the new occupant of the same slot.
/// Entities own no data; they are keys into component storages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index into component storages.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation counter for stale-handle detection.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Pack the handle into a single u64 (generation in the high bits).
    #[inline]
    pub fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Rebuild a handle from its packed form.
    #[inline]
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}
