/// Serde helpers for `#[serde(default = "crate::serde_defaults::...")]`.
///
/// Prefer using the fully-qualified path in serde attributes to avoid having to import these
/// symbols into individual modules (which can lead to merge-conflict reimports).
pub(crate) const fn default_qty() -> f64 {
    1.0
}

pub(crate) const fn default_tax_rate() -> u8 {
    10
}
