//! # Core Module
//!
//! Shared-ownership primitives used by the render thread.
//!
//! ## Key Components
//! - `StResource`: single-threaded reference-counted resource with interior mutability
//!
//! The engine runs its simulation and rendering on the event loop thread, so nothing here
//! needs to be `Send`.

pub mod st_resource;

pub use st_resource::StResource;
