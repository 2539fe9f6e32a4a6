//! Room registry: enforces at-most-one-room membership per connection and
//! materializes room membership for fan-out.
//!
//! A `users` map (connection → current room) and a `rooms` map (room name
//! → ordered members), with `host`/`join` always routing through `leave`
//! to vacate the connection's prior room. The "no room" state is an
//! `Option<String>` rather than an empty-string sentinel.

use crate::error::RoomError;
use crate::state::ConnId;
use parking_lot::Mutex;
use std::collections::HashMap;

struct Inner {
    /// Connection → current room. Key presence means "registered"; `None`
    /// value means "no room" (the lobby state).
    conn_room: HashMap<ConnId, Option<String>>,
    /// Room name → ordered members. A key exists iff its list is non-empty.
    rooms: HashMap<String, Vec<ConnId>>,
}

/// Tracks room membership, enforcing at-most-one-room-per-connection and
/// no-empty-rooms.
pub struct RoomRegistry {
    inner: Mutex<Inner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                conn_room: HashMap::new(),
                rooms: HashMap::new(),
            }),
        }
    }

    /// Registers `id` with no current room. Fails on duplicate registration.
    pub fn add_connection(&self, id: ConnId) -> Result<(), RoomError> {
        let mut inner = self.inner.lock();
        if inner.conn_room.contains_key(&id) {
            return Err(RoomError::DuplicateConnection);
        }
        inner.conn_room.insert(id, None);
        Ok(())
    }

    /// Leaves any current room, then deregisters `id`. Fails on unknown `id`.
    pub fn remove_connection(&self, id: ConnId) -> Result<(), RoomError> {
        let mut inner = self.inner.lock();
        if !inner.conn_room.contains_key(&id) {
            return Err(RoomError::UnknownConnection);
        }
        Self::leave_locked(&mut inner, id);
        inner.conn_room.remove(&id);
        Ok(())
    }

    /// Creates room `name` with `id` as its sole member, vacating any prior
    /// room. Fails with `RoomExists` if `name` already exists — in which
    /// case `id`'s membership is left untouched.
    pub fn host(&self, id: ConnId, name: &str) -> Result<(), RoomError> {
        let mut inner = self.inner.lock();
        if !inner.conn_room.contains_key(&id) {
            return Err(RoomError::UnknownConnection);
        }
        if inner.rooms.contains_key(name) {
            return Err(RoomError::RoomExists);
        }
        inner.rooms.insert(name.to_string(), vec![id]);
        Self::leave_locked(&mut inner, id);
        inner.conn_room.insert(id, Some(name.to_string()));
        Ok(())
    }

    /// Adds `id` to the existing room `name`, vacating any prior room.
    /// Fails with `NoSuchRoom` if `name` does not exist.
    pub fn join(&self, id: ConnId, name: &str) -> Result<(), RoomError> {
        let mut inner = self.inner.lock();
        if !inner.conn_room.contains_key(&id) {
            return Err(RoomError::UnknownConnection);
        }
        if !inner.rooms.contains_key(name) {
            return Err(RoomError::NoSuchRoom);
        }
        inner.rooms.get_mut(name).unwrap().push(id);
        Self::leave_locked(&mut inner, id);
        inner.conn_room.insert(id, Some(name.to_string()));
        Ok(())
    }

    /// Removes `id` from its current room, deleting the room if it becomes
    /// empty. Returns `Ok(false)` (not an error) if `id` is in no room.
    /// Fails with `UnknownConnection` if `id` is not registered.
    pub fn leave(&self, id: ConnId) -> Result<bool, RoomError> {
        let mut inner = self.inner.lock();
        if !inner.conn_room.contains_key(&id) {
            return Err(RoomError::UnknownConnection);
        }
        Ok(Self::leave_locked(&mut inner, id))
    }

    /// The room `id` is currently in, if any.
    pub fn room_of(&self, id: ConnId) -> Option<String> {
        self.inner.lock().conn_room.get(&id).cloned().flatten()
    }

    /// Ordered members sharing `id`'s room, or empty if `id` is in no room
    /// (or unregistered).
    pub fn members_of(&self, id: ConnId) -> Vec<ConnId> {
        let inner = self.inner.lock();
        match inner.conn_room.get(&id).and_then(|r| r.as_ref()) {
            Some(room) => inner.rooms.get(room).cloned().unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Every live room and its ordered members, for diagnostic dumps only.
    pub fn snapshot(&self) -> Vec<(String, Vec<ConnId>)> {
        let inner = self.inner.lock();
        inner
            .rooms
            .iter()
            .map(|(name, members)| (name.clone(), members.clone()))
            .collect()
    }

    /// Internal leave, assuming `id` is already known to be registered.
    /// Returns whether `id` was actually in a room.
    fn leave_locked(inner: &mut Inner, id: ConnId) -> bool {
        let Some(room) = inner.conn_room.get(&id).cloned().flatten() else {
            return false;
        };
        if let Some(members) = inner.rooms.get_mut(&room) {
            // Remove a single occurrence (mirrors the original's find-then-erase):
            // host/join may transiently duplicate `id` in `members` before this
            // runs when re-hosting/re-joining the room `id` is already in.
            if let Some(pos) = members.iter().position(|&m| m == id) {
                members.remove(pos);
            }
            if members.is_empty() {
                inner.rooms.remove(&room);
            }
        }
        inner.conn_room.insert(id, None);
        true
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
