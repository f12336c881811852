//! Prometheus metrics for the HTTP service.

use prometheus::{
    register_int_counter_with_registry, Encoder, IntCounter, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    pub registry: Registry,
    pub votes_accepted: IntCounter,
    /// Submissions whose nonce did not exceed the stored one.
    pub votes_ignored: IntCounter,
    pub votes_rejected: IntCounter,
    pub freezes: IntCounter,
    pub multiproofs: IntCounter,
    pub upstream_errors: IntCounter,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let votes_accepted = register_int_counter_with_registry!(
            Opts::new("crossgov_votes_accepted_total", "Votes stored by the ledger"),
            registry
        )?;
        let votes_ignored = register_int_counter_with_registry!(
            Opts::new(
                "crossgov_votes_ignored_total",
                "Votes ignored because of a stale nonce"
            ),
            registry
        )?;
        let votes_rejected = register_int_counter_with_registry!(
            Opts::new(
                "crossgov_votes_rejected_total",
                "Votes rejected by validation or signature checks"
            ),
            registry
        )?;
        let freezes = register_int_counter_with_registry!(
            Opts::new("crossgov_freezes_total", "Successful proposal freezes"),
            registry
        )?;
        let multiproofs = register_int_counter_with_registry!(
            Opts::new("crossgov_multiproofs_total", "Multiproofs served"),
            registry
        )?;
        let upstream_errors = register_int_counter_with_registry!(
            Opts::new(
                "crossgov_upstream_errors_total",
                "Requests that failed on a chain read"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            votes_accepted,
            votes_ignored,
            votes_rejected,
            freezes,
            multiproofs,
            upstream_errors,
        })
    }

    /// Prometheus text exposition of every metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
