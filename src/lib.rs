pub mod aggregate;
pub mod chart;
pub mod clean;
pub mod error;
pub mod fetch;
pub mod output;
pub mod reports;
pub mod source;
pub mod table;
