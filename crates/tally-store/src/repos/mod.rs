//! Repository modules implementing store operations, as `impl ProjectStore`
//! blocks per entity.

pub mod analysis;
pub mod dataset;
