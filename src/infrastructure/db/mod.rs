pub mod inspector;
pub mod row_mapper;
