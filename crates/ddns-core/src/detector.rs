//! Change detection
//!
//! Compares the stored address with the freshly resolved one. Comparison is
//! exact string equality: the resolver renders addresses canonically
//! (`IpAddr`'s `Display`), so no further normalization is applied. A stored
//! value in another spelling therefore counts as a change and is rewritten
//! in canonical form after the next fully successful run.

/// Result of comparing the stored and the resolved address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Resolved address equals the last propagated one
    Unchanged,
    /// Address differs, or nothing was propagated yet
    Changed,
}

/// Compare the last known IP with the resolved IP
///
/// An empty `last_known_ip` is always [`Change::Changed`], which forces
/// propagation on the first valid run.
pub fn detect_change(last_known_ip: &str, resolved_ip: &str) -> Change {
    if last_known_ip.is_empty() || last_known_ip != resolved_ip {
        Change::Changed
    } else {
        Change::Unchanged
    }
}
