use crate::key::RecyclerKey;
use ahash::AHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    struct PoolSlot;
}

/// Released adapters, stored in an arena with a stack of free slots per key.
pub struct RecyclerPool<A> {
    arena: SlotMap<PoolSlot, A>,
    free: AHashMap<RecyclerKey, SmallVec<[PoolSlot; 4]>>,
    capacity_per_key: usize,
    max_keys: usize,
}

impl<A> RecyclerPool<A> {
    pub fn new(capacity_per_key: usize, max_keys: usize) -> Self {
        RecyclerPool {
            arena: SlotMap::with_key(),
            free: AHashMap::new(),
            capacity_per_key,
            max_keys,
        }
    }

    pub fn pop(&mut self, key: &RecyclerKey) -> Option<A> {
        let slots = self.free.get_mut(key)?;
        let slot = slots.pop()?;
        if slots.is_empty() {
            self.free.remove(key);
        }
        self.arena.remove(slot)
    }

    /// Hands the adapter back when it cannot be pooled: the key is unique,
    /// its stack is full, or the pool already tracks `max_keys` keys.
    pub fn push(&mut self, key: RecyclerKey, adapter: A) -> Result<(), A> {
        if !key.is_recyclable() {
            return Err(adapter);
        }
        if !self.free.contains_key(&key) && self.free.len() >= self.max_keys {
            return Err(adapter);
        }
        let slots = self.free.entry(key).or_default();
        if slots.len() >= self.capacity_per_key {
            return Err(adapter);
        }
        slots.push(self.arena.insert(adapter));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn pooled_for(&self, key: &RecyclerKey) -> usize {
        self.free.get(key).map_or(0, |s| s.len())
    }

    pub fn clear(&mut self) {
        self.free.clear();
        self.arena.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::AdapterKind;

    fn list() -> RecyclerKey {
        RecyclerKey::Singleton(AdapterKind::List)
    }

    #[test]
    fn test_pop_is_lifo_per_key() {
        let mut pool = RecyclerPool::new(4, 4);
        pool.push(list(), "a").unwrap();
        pool.push(list(), "b").unwrap();
        pool.push(RecyclerKey::Singleton(AdapterKind::Stack), "s").unwrap();

        assert_eq!(pool.pop(&list()), Some("b"));
        assert_eq!(pool.pop(&list()), Some("a"));
        assert_eq!(pool.pop(&list()), None);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_capacity_and_unique_keys() {
        let mut pool = RecyclerPool::new(1, 1);
        assert!(pool.push(list(), 1).is_ok());
        assert_eq!(pool.push(list(), 2), Err(2));
        // a second key is over max_keys
        assert_eq!(
            pool.push(RecyclerKey::Singleton(AdapterKind::Stack), 3),
            Err(3)
        );
        assert_eq!(pool.push(RecyclerKey::unique(), 4), Err(4));
        assert_eq!(pool.pooled_for(&list()), 1);
    }

    #[test]
    fn test_clear() {
        let mut pool = RecyclerPool::new(4, 4);
        pool.push(list(), 1).unwrap();
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.pop(&list()), None);
    }
}
