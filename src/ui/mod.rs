pub mod chart;
pub mod format;
pub mod panels;
pub mod table;
