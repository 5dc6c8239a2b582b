#[macro_use]
extern crate napi_derive;

pub mod calendar;
pub mod config;
pub mod error;
pub mod history;
pub mod interaction;
pub mod mindmap;
pub mod model;
mod napi_convert;
mod napi_dto;
mod napi_exports;
pub mod notify;
pub mod search;
pub mod storage;
pub mod workspace;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("workbench_core=info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    });
}
