// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! The badge collection: user id -> ordered badges.

use alloc::collections::btree_map::{self, BTreeMap};
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BadgeError, KernelResult};
use crate::types::badge::{Badge, NewBadge};

/// Full mapping of user ids to badge sequences; the unit of read and write.
///
/// A user key is present iff its sequence is non-empty. Keys iterate in sorted
/// order so the serialized document is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BadgeCollection {
    users: BTreeMap<String, Vec<Badge>>,
}

impl BadgeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, dropping users whose sequence is empty.
    pub fn from_map(mut users: BTreeMap<String, Vec<Badge>>) -> Self {
        users.retain(|_, badges| !badges.is_empty());
        Self { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Number of users holding at least one badge.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn badge_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn badges_for(&self, user_id: &str) -> Option<&[Badge]> {
        self.users.get(user_id).map(Vec::as_slice)
    }

    pub fn get(&self, user_id: &str, index: usize) -> Option<&Badge> {
        self.users.get(user_id).and_then(|badges| badges.get(index))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<Badge>> {
        self.users.iter()
    }

    /// Appends to the end of the user's sequence, creating it if absent.
    pub fn push(&mut self, user_id: impl Into<String>, badge: Badge) {
        self.users.entry(user_id.into()).or_default().push(badge);
    }

    pub fn insert(&mut self, new: NewBadge) {
        self.push(new.user_id, new.badge);
    }

    /// Removes the badge at `index`, shifting later positions down by one.
    /// Drops the user entirely once their last badge is gone.
    pub fn remove(&mut self, user_id: &str, index: usize) -> KernelResult<Badge> {
        let badges = self.users.get_mut(user_id).ok_or(BadgeError::NotFound)?;
        if index >= badges.len() {
            return Err(BadgeError::NotFound);
        }

        let removed = badges.remove(index);
        if badges.is_empty() {
            self.users.remove(user_id);
        }
        Ok(removed)
    }

    /// Case-insensitive substring match on user id only. A blank term keeps
    /// every user.
    pub fn filter_by_user(&self, term: &str) -> BadgeCollection {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }

        let users = self
            .users
            .iter()
            .filter(|(user_id, _)| user_id.to_lowercase().contains(needle.as_str()))
            .map(|(user_id, badges)| (user_id.clone(), badges.clone()))
            .collect();
        Self { users }
    }
}

impl<'de> Deserialize<'de> for BadgeCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, Vec<Badge>>::deserialize(deserializer).map(Self::from_map)
    }
}

impl<'a> IntoIterator for &'a BadgeCollection {
    type Item = (&'a String, &'a Vec<Badge>);
    type IntoIter = btree_map::Iter<'a, String, Vec<Badge>>;

    fn into_iter(self) -> Self::IntoIter {
        self.users.iter()
    }
}

impl FromIterator<(String, Badge)> for BadgeCollection {
    fn from_iter<I: IntoIterator<Item = (String, Badge)>>(iter: I) -> Self {
        let mut collection = Self::new();
        for (user_id, badge) in iter {
            collection.push(user_id, badge);
        }
        collection
    }
}
