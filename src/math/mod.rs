//! Numerical toolkit for the retrieval
//!
//! Derivative-free minimisation (Powell's direction-set method), bracketed root
//! finding (Brent), least-squares line fitting and small descriptive statistics.

pub mod brent;
pub mod linfit;
pub mod powell;
pub mod stats;

pub use brent::{RootOutcome, find_root};
pub use linfit::LinearFit;
pub use powell::minimize;
