use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_total: IntCounterVec,
    pub transitions_rejected_total: IntCounter,
    pub pending_requests: IntGauge,
    pub deliveries_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_total = IntCounterVec::new(
            Opts::new("orders_total", "Order transitions by resulting status"),
            &["status"],
        )
        .expect("valid orders_total metric");

        let transitions_rejected_total = IntCounter::new(
            "transitions_rejected_total",
            "Rejected order and delivery transitions",
        )
        .expect("valid transitions_rejected_total metric");

        let pending_requests = IntGauge::new(
            "pending_requests",
            "Delivery requests currently awaiting a driver",
        )
        .expect("valid pending_requests metric");

        let deliveries_total = IntCounterVec::new(
            Opts::new("deliveries_total", "Delivery events by outcome"),
            &["outcome"],
        )
        .expect("valid deliveries_total metric");

        registry
            .register(Box::new(orders_total.clone()))
            .expect("register orders_total");
        registry
            .register(Box::new(transitions_rejected_total.clone()))
            .expect("register transitions_rejected_total");
        registry
            .register(Box::new(pending_requests.clone()))
            .expect("register pending_requests");
        registry
            .register(Box::new(deliveries_total.clone()))
            .expect("register deliveries_total");

        Self {
            registry,
            orders_total,
            transitions_rejected_total,
            pending_requests,
            deliveries_total,
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
