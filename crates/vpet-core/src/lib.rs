//! Core infrastructure for the vpet runtime.
//!
//! This crate provides the building blocks shared by the simulation, the
//! renderer and the application shell: input event types, a FIFO event bus,
//! a tick-rate counter, and the logging subsystem.

pub mod bus;
pub mod event;
pub mod fps;
pub mod logging;
