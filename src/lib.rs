// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![no_std]

//! badge-kernel: the badge collection model shared by the node and the dashboard.
//!
//! A collection maps user ids to ordered badge sequences. Position within a
//! sequence is the only badge identity, so every operation here preserves order.

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod error;
pub mod types;
pub mod collection;
pub mod verify;

pub use collection::BadgeCollection;
pub use error::{BadgeError, KernelResult};
pub use types::badge::{Badge, NewBadge};
