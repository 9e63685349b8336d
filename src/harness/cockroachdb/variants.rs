//! @ai:module:intent Benchmark variants the CockroachDB driver knows how to run
//! @ai:module:layer domain
//! @ai:module:public_api Variant, FULL, SHORT, variants
//! @ai:module:stateless true

use std::fmt;

/// @ai:intent One KV workload at one cluster size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    /// Workload name understood by the driver, e.g. `kv95`.
    pub workload: &'static str,
    pub nodes: u32,
}

impl Variant {
    const fn new(workload: &'static str, nodes: u32) -> Self {
        Self { workload, nodes }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/nodes={}", self.workload, self.nodes)
    }
}

pub const FULL: [Variant; 6] = [
    Variant::new("kv0", 1),
    Variant::new("kv50", 1),
    Variant::new("kv95", 1),
    Variant::new("kv0", 3),
    Variant::new("kv50", 3),
    Variant::new("kv95", 3),
];

pub const SHORT: [Variant; 2] = [Variant::new("kv0", 3), Variant::new("kv95", 3)];

/// @ai:intent Variants selected by mode, in run order
/// @ai:effects pure
pub fn variants(short: bool) -> &'static [Variant] {
    if short {
        &SHORT
    } else {
        &FULL
    }
}
