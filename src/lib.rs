//! Premium ledger - order and entitlement ledger for selling premium reports
//!
//! Admits purchase requests from a trusted front-end, tracks each order through
//! `pending -> paid | failed`, applies payment-provider webhooks idempotently and
//! answers "is this user premium right now?" with lazy expiry.

pub mod admission;
pub mod config;
pub mod db;
pub mod entitlements;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod models;
pub mod payments;
pub mod util;
