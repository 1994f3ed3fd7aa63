// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod api;
pub mod store;
pub mod relay;
pub mod server;
pub mod telemetry;
