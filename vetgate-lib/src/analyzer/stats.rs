use core::fmt;

/// Running counters of one analysis session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    evaluated_manifests: usize,
    evaluated_packages: usize,
    matched_packages: usize,
    error_count: usize,
}

impl MatchStats {
    pub(super) const fn inc_evaluated_manifests(&mut self) {
        self.evaluated_manifests += 1;
    }

    pub(super) const fn inc_evaluated_packages(&mut self) {
        self.evaluated_packages += 1;
    }

    pub(super) const fn inc_matched_packages(&mut self) {
        self.matched_packages += 1;
    }

    pub(super) const fn add_errors(&mut self, count: usize) {
        self.error_count += count;
    }

    #[must_use]
    pub const fn evaluated_manifests(&self) -> usize {
        self.evaluated_manifests
    }

    #[must_use]
    pub const fn evaluated_packages(&self) -> usize {
        self.evaluated_packages
    }

    /// Unique packages that matched, each package identity counted once.
    #[must_use]
    pub const fn matched_packages(&self) -> usize {
        self.matched_packages
    }

    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }
}

impl fmt::Display for MatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Filter evaluated with {} out of {} uniquely matched and {} error(s) across {} manifest(s)",
            self.matched_packages, self.evaluated_packages, self.error_count, self.evaluated_manifests
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let mut stats = MatchStats::default();
        stats.inc_evaluated_manifests();
        stats.inc_evaluated_packages();
        stats.inc_evaluated_packages();
        stats.inc_matched_packages();
        stats.add_errors(3);

        assert_eq!(
            stats.to_string(),
            "Filter evaluated with 1 out of 2 uniquely matched and 3 error(s) across 1 manifest(s)"
        );
    }
}
