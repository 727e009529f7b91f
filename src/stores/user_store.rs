use crate::core::error::StoreError;
use crate::models::user::User;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// In-memory store of users keyed by id
pub struct UserStore {
    users: DashMap<Uuid, User>,
}

impl UserStore {
    /// Create a new, empty UserStore
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }


    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            users: DashMap::with_capacity(capacity),
        }
    }

    /// Add a user to the store
    /// Fails if a user with the same id is already stored
    pub fn insert(&self, user: User) -> Result<Uuid, StoreError> {
        let id = user.id();
        match self.users.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUser(id)),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(id)
            }
        }
    }

    /// Get a copy of a user by id
    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.users.contains_key(&id)
    }

    /// Find users by exact username
    /// Note: This is a linear search; usernames are not unique
    pub fn find_by_username(&self, username: &str) -> Vec<User> {
        let mut found: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.value().username() == username)
            .map(|entry| entry.value().clone())
            .collect();
        sort_stable(&mut found);
        found
    }

    /// Add a role to a stored user. No-op if the user already has it.
    pub fn add_role(&self, id: Uuid, role: impl Into<String>) -> Result<(), StoreError> {
        let mut user = self.users.get_mut(&id).ok_or(StoreError::UserNotFound(id))?;
        user.add_role(role);
        Ok(())
    }

    pub fn is_admin(&self, id: Uuid) -> Result<bool, StoreError> {
        self.users
            .get(&id)
            .map(|entry| entry.value().is_admin())
            .ok_or(StoreError::UserNotFound(id))
    }

    /// Remove a user from the store by id
    /// Returns the removed user if it existed
    pub fn remove(&self, id: Uuid) -> Option<User> {
        self.users.remove(&id).map(|(_, user)| user)
    }

    /// All users holding the admin role, oldest first
    pub fn admins(&self) -> Vec<User> {
        let mut admins: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.value().is_admin())
            .map(|entry| entry.value().clone())
            .collect();
        sort_stable(&mut admins);
        admins
    }

    /// All users, oldest first
    pub fn all(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        sort_stable(&mut users);
        users
    }


    pub fn clear(&self) {
        self.users.clear();
    }


    pub fn len(&self) -> usize {
        self.users.len()
    }


    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

// DashMap iteration order is arbitrary
fn sort_stable(users: &mut [User]) {
    users.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn user(name: &str) -> User {
        User::create(name, format!("{}@example.com", name), None)
    }

    #[test]
    fn test_insert_and_get() {
        let store = UserStore::new();
        let u = user("john_doe");
        let id = store.insert(u.clone()).unwrap();

        assert_eq!(id, u.id());
        assert!(store.contains(id));
        assert_eq!(store.get(id), Some(u));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_duplicate_id() {
        let store = UserStore::new();
        let u = user("john_doe");
        store.insert(u.clone()).unwrap();

        let err = store.insert(u.clone()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUser(id) if id == u.id()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let store = UserStore::new();
        assert!(store.get(Uuid::new_v4()).is_none());
        assert!(!store.contains(Uuid::new_v4()));
    }

    #[test]
    fn test_same_username_different_users() {
        let store = UserStore::new();
        store.insert(user("same")).unwrap();
        store.insert(user("same")).unwrap();
        store.insert(user("other")).unwrap();

        let found = store.find_by_username("same");
        assert_eq!(found.len(), 2);
        assert_ne!(found[0].id(), found[1].id());
        assert!(store.find_by_username("nobody").is_empty());
    }

    #[test]
    fn test_add_role_through_store() {
        let store = UserStore::new();
        let id = store.insert(user("john_doe")).unwrap();

        assert!(!store.is_admin(id).unwrap());

        store.add_role(id, "admin").unwrap();
        store.add_role(id, "admin").unwrap();

        assert!(store.is_admin(id).unwrap());
        assert_eq!(store.get(id).unwrap().roles(), ["admin"]);
    }

    #[test]
    fn test_add_owned_role_through_store() {
        let store = UserStore::new();
        let id = store.insert(user("john_doe")).unwrap();

        let role = String::from("editor");
        store.add_role(id, role.clone()).unwrap();
        store.add_role(id, role).unwrap();

        assert_eq!(store.get(id).unwrap().roles(), ["editor"]);
    }

    #[test]
    fn test_add_role_missing_user() {
        let store = UserStore::new();
        let id = Uuid::new_v4();

        let err = store.add_role(id, "admin").unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(missing) if missing == id));
        assert!(matches!(store.is_admin(id), Err(StoreError::UserNotFound(_))));
    }

    #[test]
    fn test_get_returns_copy() {
        let store = UserStore::new();
        let id = store.insert(user("john_doe")).unwrap();

        let mut copy = store.get(id).unwrap();
        copy.add_role("admin");

        assert!(!store.is_admin(id).unwrap());
    }

    #[test]
    fn test_remove() {
        let store = UserStore::new();
        let id = store.insert(user("john_doe")).unwrap();

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(store.is_empty());
        assert!(store.remove(id).is_none());
    }

    #[test]
    fn test_admins() {
        let store = UserStore::new();
        let admin = store
            .insert(User::create("root", "root@example.com", Some(vec!["admin".to_string()])))
            .unwrap();
        store.insert(user("guest")).unwrap();

        let admins = store.admins();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id(), admin);
    }

    #[test]
    fn test_all_is_ordered_by_creation() {
        let store = UserStore::with_capacity(16);
        for name in ["a", "b", "c", "d"] {
            store.insert(user(name)).unwrap();
        }

        let all = store.all();
        assert_eq!(all.len(), 4);
        for pair in all.windows(2) {
            assert!(pair[0].created_at() <= pair[1].created_at());
        }
    }

    #[test]
    fn test_clear() {
        let store = UserStore::default();
        store.insert(user("a")).unwrap();
        store.insert(user("b")).unwrap();
        assert_eq!(store.len(), 2);

        store.clear();
        assert!(store.is_empty());
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_concurrent_add_role() {
        let store = Arc::new(UserStore::new());
        let id = store.insert(user("john_doe")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.add_role(id, "admin").unwrap();
                        store.add_role(id, "editor").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stored = store.get(id).unwrap();
        assert_eq!(stored.roles().len(), 2);
        assert!(stored.is_admin());
    }
}
