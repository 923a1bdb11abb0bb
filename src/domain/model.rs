use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A normalized set of lowercase domains. Iteration order is the output order.
pub type DomainSet = BTreeSet<String>;

/// Trims and case-folds a raw domain string. No further validation is applied.
pub fn normalize_domain(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Disposable,
    Free,
    PaidPersonal,
    /// Not present in any explicit set.
    Business,
}

impl Category {
    /// The three categories that are persisted, in output order.
    pub const EXPLICIT: [Category; 3] = [Category::Disposable, Category::Free, Category::PaidPersonal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Disposable => "disposable",
            Category::Free => "free",
            Category::PaidPersonal => "paid_personal",
            Category::Business => "business",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `{name, url}` entry from `sources.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
}

/// Which pool a source feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Disposable,
    FreePaid,
}

impl SourceKind {
    /// Prefix of the numbered temp file a fetched source is stored under.
    pub fn temp_prefix(&self) -> &'static str {
        match self {
            SourceKind::Disposable => "disposable",
            SourceKind::FreePaid => "free_paid",
        }
    }
}

/// One named origin and the domains it contributed during a run.
#[derive(Debug, Clone)]
pub struct NamedSource {
    pub name: String,
    pub domains: DomainSet,
}

/// Everything the extract phase gathers for one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct SourceSets {
    pub disposable_sources: Vec<NamedSource>,
    pub custom_disposable: DomainSet,
    pub paid_personal: DomainSet,
    pub provider_sources: Vec<NamedSource>,
    pub allowlist: DomainSet,
}

impl SourceSets {
    pub fn disposable_union(&self) -> DomainSet {
        union_of(&self.disposable_sources)
    }

    pub fn provider_union(&self) -> DomainSet {
        union_of(&self.provider_sources)
    }

    /// Sources in registration order, built-in local lists included, for stats.
    pub fn named_sources(&self) -> Vec<NamedSource> {
        let mut named = self.disposable_sources.clone();
        named.push(NamedSource {
            name: CUSTOM_DISPOSABLE_SOURCE.to_string(),
            domains: self.custom_disposable.clone(),
        });
        named.push(NamedSource {
            name: PAID_PERSONAL_SOURCE.to_string(),
            domains: self.paid_personal.clone(),
        });
        named.extend(self.provider_sources.iter().cloned());
        named
    }
}

pub const CUSTOM_DISPOSABLE_SOURCE: &str = "custom-disposable";
pub const PAID_PERSONAL_SOURCE: &str = "paid-personal";

fn union_of(sources: &[NamedSource]) -> DomainSet {
    sources
        .iter()
        .flat_map(|source| source.domains.iter().cloned())
        .collect()
}

/// The three disjoint final categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitioned {
    pub disposable: DomainSet,
    pub free: DomainSet,
    pub paid_personal: DomainSet,
}

impl Partitioned {
    pub fn get(&self, category: Category) -> Option<&DomainSet> {
        match category {
            Category::Disposable => Some(&self.disposable),
            Category::Free => Some(&self.free),
            Category::PaidPersonal => Some(&self.paid_personal),
            Category::Business => None,
        }
    }

    pub fn total(&self) -> usize {
        self.disposable.len() + self.free.len() + self.paid_personal.len()
    }

    pub fn to_domains(&self) -> DomainsByCategory {
        DomainsByCategory {
            disposable: self.disposable.iter().cloned().collect(),
            free: self.free.iter().cloned().collect(),
            paid_personal: self.paid_personal.iter().cloned().collect(),
        }
    }
}

/// Sorted domain arrays keyed by category, as stored in `email_domains.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainsByCategory {
    pub disposable: Vec<String>,
    pub free: Vec<String>,
    pub paid_personal: Vec<String>,
}

impl DomainsByCategory {
    pub fn to_partitioned(&self) -> Partitioned {
        Partitioned {
            disposable: self.disposable.iter().cloned().collect(),
            free: self.free.iter().cloned().collect(),
            paid_personal: self.paid_personal.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub disposable: usize,
    pub free: usize,
    pub paid_personal: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub generated: String,
    pub total_domains: usize,
    pub categories: CategoryCounts,
}

/// The primary JSON artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOutput {
    pub metadata: OutputMetadata,
    pub domains: DomainsByCategory,
}

impl AggregateOutput {
    pub fn new(partitioned: &Partitioned, generated: String) -> Self {
        Self {
            metadata: OutputMetadata {
                generated,
                total_domains: partitioned.total(),
                categories: CategoryCounts {
                    disposable: partitioned.disposable.len(),
                    free: partitioned.free.len(),
                    paid_personal: partitioned.paid_personal.len(),
                },
            },
            domains: partitioned.to_domains(),
        }
    }
}

/// State left behind by the previous run, if any.
#[derive(Debug, Clone, Default)]
pub struct PreviousSnapshot {
    /// Parsed `email_domains.json`; `None` when absent or unreadable.
    pub output: Option<AggregateOutput>,
    /// Contents of the per-category text files; empty sets when absent.
    pub categories: Partitioned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDelta {
    pub added: usize,
    pub removed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaCategories {
    pub disposable: CategoryDelta,
    pub free: CategoryDelta,
    pub paid_personal: CategoryDelta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaReport {
    pub categories: DeltaCategories,
    pub total_added: usize,
    pub total_removed: usize,
    pub total_domains: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStat {
    pub total: usize,
    pub unique_contribution: usize,
    pub overlap: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatsReport {
    pub generated: String,
    pub total_final_domains: usize,
    pub sources: RankedSources,
}

/// Per-source stats in processing order; serialized as a JSON object whose
/// key order is that processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedSources(pub Vec<(String, SourceStat)>);

impl RankedSources {
    pub fn get(&self, name: &str) -> Option<&SourceStat> {
        self.0
            .iter()
            .find(|(source, _)| source == name)
            .map(|(_, stat)| stat)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Serialize for RankedSources {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, stat)| (name, stat)))
    }
}

/// Everything the transform phase hands to the load phase.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub partitioned: Partitioned,
    pub stats: SourceStatsReport,
}
