pub mod change;
pub mod document;
pub mod ports;
pub mod table_change;
pub mod value_objects;
