//! Payroll Computation and Adjustment Engine
//!
//! This crate turns an employee's base compensation, country-specific
//! statutory rule tables and ad-hoc custom adjustments into gross pay,
//! itemized deductions, employer contributions and net pay, and aggregates
//! those figures into pay run totals.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
