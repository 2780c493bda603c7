//! Predicate-based view selection with an upper bound.

use viewpress_core::view_selection::{qualifies, SelectionProfile, View, ViewId, ViewSelectionConfig};

/// Most views a single job exports. Qualifying views past this count are
/// dropped without error.
pub const MAX_EXPORTED_VIEWS: usize = 5;

/// Result of filtering a document's views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chosen views, in document order.
    pub views: Vec<View>,
    /// How many views qualified before the bound was applied.
    pub qualifying: usize,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.id).collect()
    }

    /// Qualifying views left out because of the bound.
    pub fn dropped(&self) -> usize {
        self.qualifying - self.views.len()
    }
}

/// Keep the views that qualify under `config` and `profile`, preserving
/// enumeration order, and take at most `limit` of them.
pub fn select_views(
    views: &[View],
    config: &ViewSelectionConfig,
    profile: &SelectionProfile,
    limit: usize,
) -> Selection {
    let qualifying: Vec<&View> = views
        .iter()
        .filter(|v| qualifies(v, config, profile))
        .collect();

    Selection {
        qualifying: qualifying.len(),
        views: qualifying.into_iter().take(limit).cloned().collect(),
    }
}
