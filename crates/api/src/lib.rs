//! HTTP API: router, handlers, and the mapping between results and responses.

pub mod app;
