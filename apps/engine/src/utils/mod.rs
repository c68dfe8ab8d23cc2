pub mod ids;
pub mod join_code;
