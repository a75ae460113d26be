pub mod analytics;
pub mod docs;
pub mod flow;
pub mod page;
