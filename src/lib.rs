//! Employee payroll back office: employee master data, daily attendance,
//! payroll entries, payment history, and printable text receipts served
//! over an actix-web JSON API.

pub mod api;
pub mod auth;
pub mod cascade;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod ids;
pub mod model;
pub mod routes;
pub mod utils;
pub mod validation;
