// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Operator-side controller for the badge dashboard.
//!
//! All UI state lives in one [`session::Session`]. Input arrives as
//! [`controller::Command`] values, and the view is recomputed from the session
//! by [`render::render`] after every command.

pub mod client;
pub mod session;
pub mod controller;
pub mod render;
