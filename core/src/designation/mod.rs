pub mod packed;
pub mod types;

pub use packed::{pack, pack_record_columns, unpack};
pub use types::{
    CometDesignation, CometOrbitType, CometProvisional, Designation, Planet, ProvisionalMp,
    SatelliteDesignation,
};
