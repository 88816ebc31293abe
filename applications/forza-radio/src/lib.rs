//! Forza Radio headless player
//!
//! Composition root wiring the libraries together: configuration, preference
//! storage, the art resolver, the track source, and a simulated audio backend
//! standing in for a real decoder.

pub mod app;
pub mod config;
pub mod sink;
