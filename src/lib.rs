//! SCAPE-M atmospheric correction of MERIS land scenes.
//!
//! The scene is split into square cells. For every cell a visibility is
//! retrieved from dark targets and vegetation reference pixels and converted
//! to AOT at 550 nm; every clear pixel then gets a water vapour column and a
//! surface reflectance spectrum by inverting a radiative-transfer lookup table.

pub mod config;
pub mod lut;
pub mod math;
pub mod readers;
pub mod retrieval;
pub mod sensor;
pub mod solar;
pub mod utils;
pub mod writers;
