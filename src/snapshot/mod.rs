mod service;

pub use service::{evaluate_reading, LatestView, MetricStatuses, MetricView, Snapshot, SnapshotService};
