pub mod members;
pub mod rs_data;

pub use rs_data::RsData;
