// === Module Header START ===
// purpose: Group extension traits and helpers for third-party crates under a single `ext` namespace
// role: module/aggregation
// outputs: Re-exported submodules providing utility traits (e.g., JsonFetch)
// invariants: No side effects; pure extensions only
// === Module Header END ===

pub mod serde_json;
