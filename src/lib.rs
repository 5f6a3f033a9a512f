//! Pixelboard server library.
//!
//! Wires the canvas domain and broker crates into an axum application:
//! REST routes, the WebSocket duplex loop, the SSE announce stream, and
//! process lifecycle. The binary in `main.rs` is a thin wrapper; keeping
//! the assembly here lets integration tests drive the real router.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod server;
pub mod sse;
pub mod websocket;
