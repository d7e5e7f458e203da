pub mod entropy;
pub mod metrics;
pub mod monitor;

pub use metrics::{AlertMetric, AlertSeverity, DiversityAlert, DiversityMetrics, DiversityReport};
pub use monitor::{DiversityMonitor, DiversitySample};
