use crate::domain::model::{
    CategoryDelta, DeltaCategories, DeltaReport, DomainSet, NamedSource, Partitioned,
    RankedSources, SourceStat, SourceStatsReport,
};
use std::cmp::Reverse;

/// Ranks sources by marginal value: largest first, each one credited only
/// with the domains no earlier source already supplied. Ties keep the
/// order the sources were registered in.
pub fn rank_sources(sources: &[NamedSource]) -> RankedSources {
    let mut order: Vec<&NamedSource> = Vec::with_capacity(sources.len());
    for source in sources {
        // a later source with the same name replaces the earlier entry
        match order.iter().position(|seen| seen.name == source.name) {
            Some(index) => order[index] = source,
            None => order.push(source),
        }
    }
    order.sort_by_key(|source| Reverse(source.domains.len()));

    let mut seen = DomainSet::new();
    let ranked = order
        .into_iter()
        .map(|source| {
            let unique = source.domains.difference(&seen).count();
            seen.extend(source.domains.iter().cloned());
            (
                source.name.clone(),
                SourceStat {
                    total: source.domains.len(),
                    unique_contribution: unique,
                    overlap: source.domains.len() - unique,
                },
            )
        })
        .collect();

    RankedSources(ranked)
}

pub fn source_stats(
    sources: &[NamedSource],
    partitioned: &Partitioned,
    generated: String,
) -> SourceStatsReport {
    SourceStatsReport {
        generated,
        total_final_domains: partitioned.total(),
        sources: rank_sources(sources),
    }
}

fn category_delta(new: &DomainSet, old: &DomainSet) -> CategoryDelta {
    CategoryDelta {
        added: new.difference(old).count(),
        removed: old.difference(new).count(),
        total: new.len(),
    }
}

/// Compares the new categories with the previous run's. An empty `old`
/// reports every domain as added.
pub fn compute_delta(new: &Partitioned, old: &Partitioned) -> DeltaReport {
    let categories = DeltaCategories {
        disposable: category_delta(&new.disposable, &old.disposable),
        free: category_delta(&new.free, &old.free),
        paid_personal: category_delta(&new.paid_personal, &old.paid_personal),
    };
    let all = [&categories.disposable, &categories.free, &categories.paid_personal];

    DeltaReport {
        total_added: all.iter().map(|c| c.added).sum(),
        total_removed: all.iter().map(|c| c.removed).sum(),
        total_domains: all.iter().map(|c| c.total).sum(),
        categories,
    }
}
