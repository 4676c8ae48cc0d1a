// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod models;
pub mod reader;
pub mod store;
pub mod track;
pub mod version;
