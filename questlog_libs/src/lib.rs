pub mod api;
pub mod judge;

pub use api::ColumnList;
pub use questlog_derive::ColumnList;
