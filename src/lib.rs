// src/lib.rs

//! Marathon Tracker Library
//!
//! Collects certified US marathons per state, ranked by finishers, with
//! course elevation change.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
