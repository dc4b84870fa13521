//! Cutting/allocation engine for made-to-measure window blinds.
//!
//! Fabric panels are packed onto roll stock with a first-fit-decreasing
//! guillotine heuristic; bottom-rail bars are aggregated against fixed-length
//! linear stock. The orchestrator groups an order's line items, runs both
//! engines, and produces the inventory requirements used to debit stock.

pub mod error;
pub mod guillotine;
pub mod linear;
pub mod orchestrator;
pub mod render;
pub mod solver;
pub mod types;
