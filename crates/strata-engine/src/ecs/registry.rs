use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};

use crate::core::config::EngineConfig;
use crate::ecs::entity::Entity;
use crate::ecs::error::EcsError;
use crate::ecs::storage::{AnyStorage, ComponentStorage};

/// Per-slot bookkeeping for the entity allocator.
#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Central owner of all entities and component storages.
///
/// Handles are validated (generation check) on every operation, so a stale
/// handle kept across a destroy can never read or write the slot's new
/// occupant. One storage exists per component type, created lazily and
/// dispatched by `TypeId`.
pub struct Registry {
    slots: Vec<Slot>,
    /// Recycled entity indices, popped before fresh ones are minted.
    free: Vec<u32>,
    alive_count: usize,
    capacity: usize,
    storages: HashMap<TypeId, Box<dyn AnyStorage>>,
    /// String tags per entity index, for lookups by gameplay code.
    tags: HashMap<u32, HashSet<String>>,
}

impl Registry {
    /// Create a registry that can hold up to `capacity` live entities.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            alive_count: 0,
            capacity,
            storages: HashMap::new(),
            tags: HashMap::new(),
        }
    }

    /// Registry sized to the configured entity limit.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_entities)
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.alive_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Configured entity limit.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the handle refers to a live entity.
    pub fn contains(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    fn check(&self, entity: Entity) -> Result<(), EcsError> {
        if self.contains(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidHandle(entity))
        }
    }

    /// Create a new entity, recycling a destroyed slot when one is free.
    pub fn create(&mut self) -> Result<Entity, EcsError> {
        if self.alive_count >= self.capacity {
            return Err(EcsError::CapacityExceeded {
                limit: self.capacity,
            });
        }

        let entity = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            Entity::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                alive: true,
            });
            Entity::new(index, 0)
        };

        self.alive_count += 1;
        Ok(entity)
    }

    /// Destroy an entity: removes all its components, bumps the slot
    /// generation so the old handle goes stale, and recycles the index.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.check(entity)?;

        for storage in self.storages.values_mut() {
            storage.remove_index(entity.index());
        }
        self.tags.remove(&entity.index());

        let slot = &mut self.slots[entity.index() as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index());
        self.alive_count -= 1;
        Ok(())
    }

    /// Destroy every entity and drop every component.
    pub fn clear(&mut self) {
        for storage in self.storages.values_mut() {
            storage.clear();
        }
        self.tags.clear();
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.alive {
                slot.alive = false;
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.free.reverse();
        self.alive_count = 0;
    }

    fn storage<T: 'static>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref())
    }

    fn storage_mut<T: 'static>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut())
    }

    fn storage_or_create<T: 'static>(&mut self) -> &mut ComponentStorage<T> {
        let capacity = self.capacity;
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new(capacity)))
            .as_any_mut()
            .downcast_mut()
            .expect("storage type tag mismatch")
    }

    /// Attach a component. Fails if the entity already has one of this type.
    pub fn add<T: 'static>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        self.check(entity)?;
        let storage = self.storage_or_create::<T>();
        if storage.contains(entity.index()) {
            return Err(EcsError::DuplicateComponent {
                entity,
                type_name: type_name::<T>(),
            });
        }
        storage.insert(entity.index(), value);
        Ok(())
    }

    /// Detach and return the entity's `T` component; `Ok(None)` if absent.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Result<Option<T>, EcsError> {
        self.check(entity)?;
        Ok(self
            .storage_mut::<T>()
            .and_then(|s| s.remove(entity.index())))
    }

    /// Borrow the entity's `T` component; `Ok(None)` if absent.
    pub fn get<T: 'static>(&self, entity: Entity) -> Result<Option<&T>, EcsError> {
        self.check(entity)?;
        Ok(self.storage::<T>().and_then(|s| s.get(entity.index())))
    }

    /// Mutably borrow the entity's `T` component; `Ok(None)` if absent.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Result<Option<&mut T>, EcsError> {
        self.check(entity)?;
        Ok(self
            .storage_mut::<T>()
            .and_then(|s| s.get_mut(entity.index())))
    }

    /// Whether the entity holds a `T` component. Stale handles read as false.
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.contains(entity)
            && self
                .storage::<T>()
                .is_some_and(|s| s.contains(entity.index()))
    }

    fn entity_at(&self, index: u32) -> Entity {
        Entity::new(index, self.slots[index as usize].generation)
    }

    /// Iterate `(Entity, &T)` over every entity holding a `T`.
    pub fn view<T: 'static>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>()
            .into_iter()
            .flat_map(|s| s.iter())
            .map(|(index, value)| (self.entity_at(index), value))
    }

    /// Iterate `(Entity, &mut T)` over every entity holding a `T`.
    pub fn view_mut<T: 'static>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let slots = &self.slots;
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<ComponentStorage<T>>())
            .into_iter()
            .flat_map(|s| s.iter_mut())
            .map(move |(index, value)| {
                (
                    Entity::new(index, slots[index as usize].generation),
                    value,
                )
            })
    }

    /// Entities holding a `T` component, in dense-array order.
    pub fn entities_with<T: 'static>(&self) -> Vec<Entity> {
        self.view::<T>().map(|(e, _)| e).collect()
    }

    fn storage_len<T: 'static>(&self) -> usize {
        self.storage::<T>().map_or(0, ComponentStorage::len)
    }

    /// Entities holding both an `A` and a `B`, iterated over whichever
    /// storage is smaller.
    pub fn entities_with2<A: 'static, B: 'static>(&self) -> Vec<Entity> {
        if self.storage_len::<A>() <= self.storage_len::<B>() {
            self.view::<A>()
                .map(|(e, _)| e)
                .filter(|&e| self.has::<B>(e))
                .collect()
        } else {
            self.view::<B>()
                .map(|(e, _)| e)
                .filter(|&e| self.has::<A>(e))
                .collect()
        }
    }

    /// Entities holding all of `A`, `B` and `C`, iterated over the smallest
    /// of the three storages.
    pub fn entities_with3<A: 'static, B: 'static, C: 'static>(&self) -> Vec<Entity> {
        let (a, b, c) = (
            self.storage_len::<A>(),
            self.storage_len::<B>(),
            self.storage_len::<C>(),
        );
        if a <= b && a <= c {
            self.view::<A>()
                .map(|(e, _)| e)
                .filter(|&e| self.has::<B>(e) && self.has::<C>(e))
                .collect()
        } else if b <= c {
            self.view::<B>()
                .map(|(e, _)| e)
                .filter(|&e| self.has::<A>(e) && self.has::<C>(e))
                .collect()
        } else {
            self.view::<C>()
                .map(|(e, _)| e)
                .filter(|&e| self.has::<A>(e) && self.has::<B>(e))
                .collect()
        }
    }

    // -- Tags --

    /// Attach a string tag to an entity.
    pub fn add_tag(&mut self, entity: Entity, tag: impl Into<String>) -> Result<(), EcsError> {
        self.check(entity)?;
        self.tags.entry(entity.index()).or_default().insert(tag.into());
        Ok(())
    }

    /// Whether the entity carries the tag. Stale handles read as false.
    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.contains(entity)
            && self
                .tags
                .get(&entity.index())
                .is_some_and(|set| set.contains(tag))
    }

    /// All live entities carrying the tag, in index order.
    pub fn entities_with_tag(&self, tag: &str) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .tags
            .iter()
            .filter(|(_, set)| set.contains(tag))
            .map(|(&index, _)| self.entity_at(index))
            .collect();
        found.sort_unstable();
        found
    }
}
