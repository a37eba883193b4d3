pub mod api;
pub mod config;
pub mod extractor;
pub mod http;
pub mod humanize;
pub mod logs;
pub mod normalize;
pub mod observability;
pub mod proxy;
