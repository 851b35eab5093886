//! Kanban flow metrics: rebuild per-column histories from status changelogs and
//! report lead time, flow efficiency, throughput and cumulative flow.

pub mod aggregate;
pub mod calendar;
pub mod cfd;
pub mod cli;
pub mod config;
pub mod error;
pub mod ext;
pub mod interval;
pub mod metrics;
pub mod model;
pub mod report;
pub mod source;
pub mod timeline;
pub mod util;

pub use config::FlowPolicy;
pub use model::FlowReport;
pub use report::build_report;
pub use timeline::{Item, RawTransition, StatusMap};
