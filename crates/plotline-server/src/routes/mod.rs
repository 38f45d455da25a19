pub mod chart;
pub mod collect;
pub mod health;
pub mod query;
pub mod sparkline;
