//! Prometheus text exposition format.
//!
//! Serializes everything gathered from a registry for scraping by a
//! Prometheus server or compatible agent.

use prometheus::{Encoder, Registry, TextEncoder};

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Render all metric families of `registry` into Prometheus text format.
///
/// Families without any series are omitted by the registry.
pub fn render_prometheus(registry: &Registry) -> Result<String, prometheus::Error> {
    let families = registry.gather();
    let mut buf = Vec::new();
    TextEncoder::new().encode(&families, &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
