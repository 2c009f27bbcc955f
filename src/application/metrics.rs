//! Names of the metrics the render pipeline emits, with their descriptions.

use metrics::Unit;

pub const RENDER_CACHE_HIT: &str = "docweave_render_cache_hit_total";
pub const RENDER_CACHE_MISS: &str = "docweave_render_cache_miss_total";
pub const VARIANT_UPLOADED: &str = "docweave_variant_uploaded_total";
/// Labelled with `stage`: fetch, decode, encode or upload.
pub const VARIANT_FAILED: &str = "docweave_variant_failed_total";
pub const ORPHAN_DELETED: &str = "docweave_orphan_deleted_total";
pub const RENDER_MS: &str = "docweave_render_ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Histogram,
}

pub struct MetricSpec {
    pub name: &'static str,
    pub kind: MetricKind,
    pub unit: Unit,
    pub help: &'static str,
}

pub const CATALOG: &[MetricSpec] = &[
    MetricSpec {
        name: RENDER_CACHE_HIT,
        kind: MetricKind::Counter,
        unit: Unit::Count,
        help: "Renders served from the render cache.",
    },
    MetricSpec {
        name: RENDER_CACHE_MISS,
        kind: MetricKind::Counter,
        unit: Unit::Count,
        help: "Render cache lookups that required a fresh render.",
    },
    MetricSpec {
        name: VARIANT_UPLOADED,
        kind: MetricKind::Counter,
        unit: Unit::Count,
        help: "Image variants written to the asset store.",
    },
    MetricSpec {
        name: VARIANT_FAILED,
        kind: MetricKind::Counter,
        unit: Unit::Count,
        help: "Image variant failures, labelled by stage.",
    },
    MetricSpec {
        name: ORPHAN_DELETED,
        kind: MetricKind::Counter,
        unit: Unit::Count,
        help: "Stored assets deleted because no inline object claims them.",
    },
    MetricSpec {
        name: RENDER_MS,
        kind: MetricKind::Histogram,
        unit: Unit::Milliseconds,
        help: "Render latency excluding the source fetch.",
    },
];
