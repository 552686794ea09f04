pub mod charts;
pub mod series;
