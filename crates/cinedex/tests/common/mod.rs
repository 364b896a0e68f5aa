//! Shared test doubles for cinedex integration tests.
//!
//! Provides fake browsers, a scripted site extractor, and stub
//! collaborators so pipeline and scheduler behavior can be exercised
//! without chromedriver or the network.
#![allow(dead_code)]

pub mod fakes;

pub use fakes::*;
