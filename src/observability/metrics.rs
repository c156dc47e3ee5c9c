use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub records: IntGaugeVec,
    pub rejections_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let records = IntGaugeVec::new(
            Opts::new("records", "Current number of stored records by table"),
            &["table"],
        )
        .expect("valid records metric");

        let rejections_total = IntCounterVec::new(
            Opts::new("rejections_total", "Total rejected writes by reason"),
            &["reason"],
        )
        .expect("valid rejections_total metric");

        registry
            .register(Box::new(records.clone()))
            .expect("register records");
        registry
            .register(Box::new(rejections_total.clone()))
            .expect("register rejections_total");

        Self {
            registry,
            records,
            rejections_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
