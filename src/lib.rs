//! State engine for the infrastructure map dashboard.
//!
//! The dashboard shows hospitals and schools on a map next to a chart and a
//! detail panel. This crate owns the state behind it: category filtering,
//! chart aggregates, the single selected record and the view modes, including
//! the asynchronous fullscreen handshake with the host. Rendering
//! collaborators read [`state::Snapshot`]s and the [`render`] model built from
//! them.

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod data;
pub mod filter;
pub mod fullscreen;
pub mod render;
pub mod selection;
pub mod server;
pub mod state;
pub mod types;
pub mod view;

pub use controller::{Dashboard, DashboardError};
pub use data::Dataset;
pub use state::{DashboardState, Event, Snapshot};
