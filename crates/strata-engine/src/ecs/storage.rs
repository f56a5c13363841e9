use std::any::Any;

/// Sentinel for an empty sparse slot.
const EMPTY: u32 = u32::MAX;

/// Type-erased capability every component storage provides, so the Registry
/// can sweep an entity's components without knowing their concrete types.
pub(crate) trait AnyStorage {
    /// Drop the component held for this entity index, if any.
    fn remove_index(&mut self, index: u32);
    /// Drop every component in the storage.
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense per-type component store: a sparse array maps entity index → dense
/// slot, a pair of parallel dense arrays hold values and owning entities.
///
/// Add/remove/lookup are O(1). Removal swap-pops the last dense element into
/// the freed slot, so iteration order is NOT stable across removals — callers
/// must not rely on positional order persisting past a mutation.
pub struct ComponentStorage<T> {
    /// Entity index → dense slot, `EMPTY` when the entity has no component.
    sparse: Vec<u32>,
    /// Owning entity index per dense slot (parallel to `dense`).
    entities: Vec<u32>,
    /// Component values, hole-free.
    dense: Vec<T>,
}

impl<T: 'static> ComponentStorage<T> {
    /// Create a storage able to hold components for `capacity` entity slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            sparse: vec![EMPTY; capacity],
            entities: Vec::new(),
            dense: Vec::new(),
        }
    }

    /// Number of stored components.
    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Whether the entity index has a component here.
    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.sparse
            .get(index as usize)
            .is_some_and(|&slot| slot != EMPTY)
    }

    /// Insert a component for the entity index, returning the previous value
    /// if one was already stored.
    pub fn insert(&mut self, index: u32, value: T) -> Option<T> {
        let slot = *self.sparse.get(index as usize)?;
        if slot != EMPTY {
            let old = std::mem::replace(&mut self.dense[slot as usize], value);
            return Some(old);
        }
        self.sparse[index as usize] = self.dense.len() as u32;
        self.entities.push(index);
        self.dense.push(value);
        None
    }

    /// Remove and return the entity's component, or `None` if absent.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let slot = *self.sparse.get(index as usize)?;
        if slot == EMPTY {
            return None;
        }
        self.sparse[index as usize] = EMPTY;

        let slot = slot as usize;
        debug_assert_eq!(self.entities[slot], index, "dense/sparse index mismatch");

        // Swap the last dense element into the hole and repoint its sparse entry.
        let value = self.dense.swap_remove(slot);
        self.entities.swap_remove(slot);
        if let Some(&moved) = self.entities.get(slot) {
            self.sparse[moved as usize] = slot as u32;
        }
        Some(value)
    }

    /// Borrow the entity's component, or `None` if absent.
    #[inline]
    pub fn get(&self, index: u32) -> Option<&T> {
        let slot = *self.sparse.get(index as usize)?;
        if slot == EMPTY {
            return None;
        }
        self.dense.get(slot as usize)
    }

    /// Mutably borrow the entity's component, or `None` if absent.
    #[inline]
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let slot = *self.sparse.get(index as usize)?;
        if slot == EMPTY {
            return None;
        }
        self.dense.get_mut(slot as usize)
    }

    /// Iterate `(entity index, &component)` over the dense array.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// Iterate `(entity index, &mut component)` over the dense array.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }
}

impl<T: 'static> AnyStorage for ComponentStorage<T> {
    fn remove_index(&mut self, index: u32) {
        self.remove(index);
    }

    fn clear(&mut self) {
        for &index in &self.entities {
            self.sparse[index as usize] = EMPTY;
        }
        self.entities.clear();
        self.dense.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new(16);
        assert_eq!(storage.insert(3, 42), None);
        assert_eq!(storage.get(3), Some(&42));
        assert_eq!(storage.remove(3), Some(42));
        assert_eq!(storage.get(3), None);
    }

    #[test]
    fn insert_replaces_and_returns_old() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new(4);
        storage.insert(0, 1);
        assert_eq!(storage.insert(0, 2), Some(1));
        assert_eq!(storage.get(0), Some(&2));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn swap_remove_keeps_dense_arrays_hole_free() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new(8);
        storage.insert(0, "a");
        storage.insert(1, "b");
        storage.insert(2, "c");

        storage.remove(0);

        // The last element was swapped into the freed slot; all survivors
        // remain reachable and the dense array shrank by one.
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get(1), Some(&"b"));
        assert_eq!(storage.get(2), Some(&"c"));
        assert_eq!(storage.get(0), None);
    }

    #[test]
    fn out_of_range_index_is_absent() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new(2);
        assert_eq!(storage.insert(99, 5), None);
        assert_eq!(storage.get(99), None);
        assert_eq!(storage.remove(99), None);
    }

    #[test]
    fn iteration_visits_every_component() {
        let mut storage: ComponentStorage<u32> = ComponentStorage::new(8);
        for i in 0..5 {
            storage.insert(i, i * 10);
        }
        let mut seen: Vec<(u32, u32)> = storage.iter().map(|(e, &v)| (e, v)).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![(0, 0), (1, 10), (2, 20), (3, 30), (4, 40)]);
    }
}
