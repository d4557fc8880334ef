use std::collections::BTreeMap;

use serde::Deserialize;

/// Title and bullet points shown for a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MilestoneDetail {
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

impl MilestoneDetail {
    /// Bullets as rendered in the details panel.
    pub fn bullet_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.bullets.iter().map(|b| format!("• {b}"))
    }
}

const BUILTIN: &[(&str, &str, &[&str])] = &[
    (
        "foundations",
        "Foundations: Heterogeneity & annotation noise",
        &[
            "Site/scanner/protocol variability",
            "Inter-observer label variability",
        ],
    ),
    (
        "published_securefl",
        "Secure FL: privacy-preserving annotation peer-review",
        &[
            "Secure architecture for collaborative labelling",
            "Enables multi-site evaluation",
        ],
    ),
    (
        "published_cia",
        "CIA: controllable image augmentation",
        &[
            "Stable Diffusion-based synthetic patients",
            "Quality filtering + ControlNet",
        ],
    ),
    (
        "submitted_recon",
        "Recon-based UQ",
        &[
            "Low-cost single-pass failure signal",
            "Good clinical viability",
        ],
    ),
    (
        "submitted_uq_eval",
        "UQ evaluation paradigm",
        &[
            "Safety-constrained threshold calibration",
            "Risk–coverage evaluation",
        ],
    ),
    (
        "emerging",
        "Emerging: Clustering & coverage metrics",
        &[
            "Feature-based patient subgroups",
            "Sampling for coverage maximization",
        ],
    ),
    (
        "future",
        "Future: Test-set protocol & QA dashboard",
        &[
            "Systematic suite design + coverage metrics",
            "Multi-site validation plan",
        ],
    ),
];

/// Read-only detail entries keyed by milestone id.
#[derive(Debug, Clone)]
pub struct DetailTable {
    entries: BTreeMap<String, MilestoneDetail>,
}

impl Default for DetailTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DetailTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(id, title, bullets)| {
                (
                    id.to_string(),
                    MilestoneDetail {
                        title: title.to_string(),
                        bullets: bullets.iter().map(|b| b.to_string()).collect(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Built-in entries with deck-supplied ones layered on top.
    pub fn with_overrides(overrides: &BTreeMap<String, MilestoneDetail>) -> Self {
        let mut table = Self::builtin();
        for (id, detail) in overrides {
            table.entries.insert(id.clone(), detail.clone());
        }
        table
    }

    pub fn get(&self, id: &str) -> Option<&MilestoneDetail> {
        self.entries.get(id)
    }

    /// Detail for `id`; unknown ids get their id as title and no bullets.
    pub fn lookup(&self, id: &str) -> MilestoneDetail {
        self.get(id).cloned().unwrap_or_else(|| MilestoneDetail {
            title: id.to_string(),
            bullets: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_id_falls_back_to_id() {
        let table = DetailTable::builtin();
        assert_eq!(
            table.lookup("nonexistent"),
            MilestoneDetail {
                title: "nonexistent".into(),
                bullets: vec![],
            }
        );
    }

    #[test]
    fn builtin_entries_present() {
        let table = DetailTable::builtin();
        let d = table.lookup("submitted_recon");
        assert_eq!(d.title, "Recon-based UQ");
        assert_eq!(d.bullets.len(), 2);
        assert!(table.get("future").is_some());
    }

    #[test]
    fn overrides_replace_and_extend() {
        let mut extra = BTreeMap::new();
        extra.insert(
            "future".to_string(),
            MilestoneDetail {
                title: "Later".into(),
                bullets: vec!["a".into()],
            },
        );
        extra.insert(
            "bonus".to_string(),
            MilestoneDetail {
                title: "Bonus".into(),
                bullets: vec![],
            },
        );
        let table = DetailTable::with_overrides(&extra);
        assert_eq!(table.lookup("future").title, "Later");
        assert_eq!(table.lookup("bonus").title, "Bonus");
        assert_eq!(table.lookup("emerging").bullets.len(), 2);
    }

    #[test]
    fn bullets_are_prefixed() {
        let d = MilestoneDetail {
            title: "t".into(),
            bullets: vec!["one".into(), "two".into()],
        };
        assert_eq!(d.bullet_lines().collect::<Vec<_>>(), vec!["• one", "• two"]);
    }
}
