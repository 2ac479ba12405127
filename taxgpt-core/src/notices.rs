//! Static "live" CRA advisories shown beside the conversation.

/// Fixed, ordered list of advisory strings. Most recent first by convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeFeed {
    notices: Vec<String>,
}

impl NoticeFeed {
    pub fn new(notices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            notices: notices.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in CRA update list.
    pub fn cra_updates() -> Self {
        Self::new(CRA_UPDATES)
    }

    /// Every notice, in display order.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl Default for NoticeFeed {
    fn default() -> Self {
        Self::cra_updates()
    }
}

const CRA_UPDATES: [&str; 3] = [
    "⚠️ Interest Rate Update: CRA prescribed interest rates for Q1 2025 have risen to 6%.",
    "✅ Confirmed: The 2024 TFSA Contribution Limit is officially $7,000.",
    "📅 Reminder: RRSP Contribution Deadline is February 29, 2024.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cra_updates() {
        let feed = NoticeFeed::default();
        assert_eq!(feed.notices().len(), 3);
        assert!(feed.notices()[0].contains("prescribed interest rates"));
        assert!(feed.notices()[2].starts_with("📅"));
    }

    #[test]
    fn test_notices_are_stable() {
        let feed = NoticeFeed::cra_updates();
        let first = feed.notices().to_vec();
        let second = feed.notices().to_vec();
        assert_eq!(first, second);
        assert_eq!(feed, NoticeFeed::cra_updates());
    }
}
