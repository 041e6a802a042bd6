//! Collection contact planning.
//!
//! Turns a snapshot of customers, loans and defaults into an
//! operational contact plan: who to call, when, how, and with what
//! staffing, grouped for a collections floor.

pub mod aggregation;
pub mod config;
pub mod csv_io;
pub mod domain;
pub mod error;
pub mod event;
pub mod extraction;
pub mod generator;
pub mod name_generator;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod rng;
pub mod rules;
pub mod scoring;
pub mod snapshot;
pub mod stage;
pub mod store;
pub mod types;
pub mod zoning;
