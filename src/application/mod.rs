pub mod compare;
pub mod data_diff;
pub mod monitoring;
pub mod schema_diff;
