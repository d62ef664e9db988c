//! Static content tables.
//!
//! Building levels, task recipes, and tuning constants live here as code,
//! keyed by closed enums. This module contains no IO.

pub mod building_specs;
pub mod tuning;
