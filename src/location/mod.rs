//! South African location reference data.
//!
//! - `ProvinceTable`: province code → cities, towns and villages
//! - `LocationRegistry`: shared table with snapshot reads and rule-driven inserts
//! - `region_for`: metro/region inside a province

mod provinces;
mod regions;
mod registry;

pub use provinces::{LocationKind, Province, ProvinceTable};
pub use regions::region_for;
pub use registry::{AddedLocation, LocationRegistry, ProvinceRule, ProvinceRules};
