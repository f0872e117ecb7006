//! Repeated association lookup detection.
//!
//! Resolving a belongs-to for each record in a list, or walking a has-many per
//! parent, issues one remote query per record. The tracker counts association
//! lookups per (record type, association) and warns once a pair reaches the
//! threshold.
//!
//! # Example
//!
//! ```ignore
//! for amendment in &mut amendments {
//!     session.belongs_to(amendment, "subscription")?; // one query each
//! }
//! // warns on the third lookup of Amendment.subscription
//! ```

use std::collections::HashMap;

/// Tracks association lookups.
#[derive(Debug)]
pub struct LookupTracker {
    /// (record_type, association) -> lookup count
    counts: HashMap<(&'static str, &'static str), usize>,
    threshold: usize,
    enabled: bool,
}

impl Default for LookupTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of tracked lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupStats {
    pub total_lookups: usize,
    /// Distinct (record type, association) pairs looked up.
    pub associations: usize,
    /// Pairs at or over the threshold.
    pub repeated: usize,
}

impl LookupTracker {
    /// Create a tracker with the default threshold (3).
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            threshold: 3,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Count one remote lookup for `association` on `record_type`.
    pub fn record_lookup(&mut self, record_type: &'static str, association: &'static str) {
        if !self.enabled {
            return;
        }

        let count = self.counts.entry((record_type, association)).or_insert(0);
        *count += 1;

        if *count == self.threshold {
            tracing::warn!(
                target: "zuora::lookups",
                record_type,
                association,
                lookups = *count,
                threshold = self.threshold,
                "Repeated association lookups; consider one find() with a broader filter"
            );
        }
    }

    /// Clear all counts, e.g. at the start of a new unit of work.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    #[must_use]
    pub fn count_for(&self, record_type: &str, association: &str) -> usize {
        self.counts
            .iter()
            .find(|((t, a), _)| *t == record_type && *a == association)
            .map_or(0, |(_, count)| *count)
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        LookupStats {
            total_lookups: self.counts.values().sum(),
            associations: self.counts.len(),
            repeated: self
                .counts
                .values()
                .filter(|count| **count >= self.threshold)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_new_defaults() {
        let tracker = LookupTracker::new();
        assert_eq!(tracker.threshold(), 3);
        assert!(tracker.is_enabled());
    }

    #[test]
    fn test_tracker_counts_per_association() {
        let mut tracker = LookupTracker::new();
        tracker.record_lookup("Amendment", "subscription");
        tracker.record_lookup("Amendment", "subscription");
        tracker.record_lookup("Subscription", "amendments");

        assert_eq!(tracker.count_for("Amendment", "subscription"), 2);
        assert_eq!(tracker.count_for("Subscription", "amendments"), 1);
        assert_eq!(tracker.count_for("Account", "subscriptions"), 0);
    }

    #[test]
    fn test_tracker_disabled_no_recording() {
        let mut tracker = LookupTracker::new();
        tracker.disable();
        tracker.record_lookup("Amendment", "subscription");
        assert_eq!(tracker.count_for("Amendment", "subscription"), 0);

        tracker.enable();
        tracker.record_lookup("Amendment", "subscription");
        assert_eq!(tracker.count_for("Amendment", "subscription"), 1);
    }

    #[test]
    fn test_stats_and_reset() {
        let mut tracker = LookupTracker::new().with_threshold(2);
        tracker.record_lookup("Amendment", "subscription");
        tracker.record_lookup("Amendment", "subscription");
        tracker.record_lookup("Subscription", "account");

        assert_eq!(
            tracker.stats(),
            LookupStats {
                total_lookups: 3,
                associations: 2,
                repeated: 1,
            }
        );

        tracker.reset();
        assert_eq!(tracker.stats(), LookupStats::default());
    }
}
