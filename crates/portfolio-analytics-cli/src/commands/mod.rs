pub mod analyze;
pub mod optimize;
pub mod returns;
pub mod weights;
