use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Prometheus metrics for the relay, kept in a private registry so tests can
/// build as many servers as they like.
pub struct RelayMetrics {
    registry: Registry,
    pub reorders: IntCounterVec,
    pub moved_documents: HistogramVec,
    pub tool_calls: IntCounterVec,
    pub active_sessions: IntGauge,
}

impl RelayMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let reorders = IntCounterVec::new(
            Opts::new("rank_relay_reorders_total", "Reorder requests by outcome"),
            &["outcome"],
        )?;
        let moved_documents = HistogramVec::new(
            HistogramOpts::new(
                "rank_relay_moved_documents",
                "Documents re-keyed by a single reorder",
            )
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 1000.0]),
            &["scheme"],
        )?;
        let tool_calls = IntCounterVec::new(
            Opts::new("rank_relay_tool_calls_total", "MCP tool calls by tool name"),
            &["tool"],
        )?;
        let active_sessions =
            IntGauge::new("rank_relay_active_sessions", "Open MCP sessions")?;

        registry.register(Box::new(reorders.clone()))?;
        registry.register(Box::new(moved_documents.clone()))?;
        registry.register(Box::new(tool_calls.clone()))?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            reorders,
            moved_documents,
            tool_calls,
            active_sessions,
        })
    }

    /// Text exposition format for `GET /metrics`.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_recorded_values() {
        let metrics = RelayMetrics::new().unwrap();
        metrics.reorders.with_label_values(&["ok"]).inc();
        metrics
            .moved_documents
            .with_label_values(&["lexorank"])
            .observe(2.0);
        metrics.active_sessions.set(3);

        let text = metrics.render().unwrap();
        assert!(text.contains("rank_relay_reorders_total{outcome=\"ok\"} 1"));
        assert!(text.contains("rank_relay_moved_documents_count{scheme=\"lexorank\"} 1"));
        assert!(text.contains("rank_relay_active_sessions 3"));
    }

    #[test]
    fn registries_are_independent() {
        let first = RelayMetrics::new().unwrap();
        let second = RelayMetrics::new().unwrap();
        first.tool_calls.with_label_values(&["generate_ranks"]).inc();
        assert!(!second.render().unwrap().contains("generate_ranks"));
    }
}
