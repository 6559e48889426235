//! Best-effort in-process user cache.
//!
//! Filled by the event worker after a store read, evicted synchronously by
//! every successful write. Losing an entry only costs one extra store read.
//!
//! Each id carries a generation that [`UserCache::evict`] bumps. A reader
//! takes the generation before going to the store and hands it back with
//! the row; [`UserCache::fill`] drops the row if a write evicted the entry
//! in between, so a read that raced a write never lands in the cache.

use dashmap::DashMap;

use super::models::User;
use crate::core_types::UserId;

#[derive(Default)]
pub struct UserCache {
    users: DashMap<UserId, User>,
    generations: DashMap<UserId, u64>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    /// Generation to pass to [`UserCache::fill`] for a store read of `id`.
    pub fn generation(&self, id: UserId) -> u64 {
        self.generations.get(&id).map_or(0, |g| *g)
    }

    /// Cache `user` unless it was evicted after `seen` was taken.
    pub fn fill(&self, user: User, seen: u64) -> bool {
        // Holding the generation entry serializes against `evict`.
        let generation = self.generations.entry(user.id).or_insert(0);
        if *generation != seen {
            return false;
        }
        self.users.insert(user.id, user);
        true
    }

    pub fn evict(&self, id: UserId) {
        let mut generation = self.generations.entry(id).or_insert(0);
        *generation += 1;
        self.users.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Role;
    use crate::core_types::Address;
    use chrono::Utc;

    fn user(id: UserId) -> User {
        User {
            id,
            first_name: "C".into(),
            last_name: "D".into(),
            email: format!("u{id}@example.com"),
            phone: String::new(),
            address: Address::default(),
            password_hash: String::new(),
            role: Role::General,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fill_get_evict() {
        let cache = UserCache::new();
        assert!(cache.is_empty());

        assert!(cache.fill(user(1), cache.generation(1)));
        assert!(cache.fill(user(2), cache.generation(2)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(1).map(|u| u.email).as_deref(), Some("u1@example.com"));

        cache.evict(1);
        assert!(cache.get(1).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fill_after_evict_is_dropped() {
        let cache = UserCache::new();
        let seen = cache.generation(7);
        cache.evict(7);

        assert!(!cache.fill(user(7), seen));
        assert!(cache.get(7).is_none());

        assert!(cache.fill(user(7), cache.generation(7)));
        assert!(cache.get(7).is_some());
    }
}
