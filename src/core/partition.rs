use crate::domain::model::{DomainSet, Partitioned, SourceSets};

/// Splits the gathered sources into the three final categories.
///
/// ```text
/// disposable    = (disposable sources ∪ custom) − allowlist
/// free          = provider sources − raw disposable sources − paid personal − allowlist
/// paid_personal = paid personal, unchanged
/// ```
///
/// The free exclusion uses the raw disposable union from remote sources,
/// before the allowlist is applied. An allowlisted domain that came from a
/// disposable source therefore lands in neither `disposable` nor `free`.
/// The custom list does not feed the free exclusion; a custom domain that
/// also appears in `free` is removed from `free` by [`resolve_overlaps`].
pub fn partition(sources: &SourceSets) -> Partitioned {
    let raw_disposable = sources.disposable_union();

    let disposable: DomainSet = raw_disposable
        .union(&sources.custom_disposable)
        .filter(|domain| !sources.allowlist.contains(*domain))
        .cloned()
        .collect();

    let free: DomainSet = sources
        .provider_union()
        .into_iter()
        .filter(|domain| {
            !raw_disposable.contains(domain)
                && !sources.paid_personal.contains(domain)
                && !sources.allowlist.contains(domain)
        })
        .collect();

    let partitioned = Partitioned {
        disposable,
        free,
        paid_personal: sources.paid_personal.clone(),
    };

    resolve_overlaps(partitioned)
}

/// Enforces pairwise disjointness. A domain in more than one category keeps
/// the first of `paid_personal`, `disposable`, `free`.
pub fn resolve_overlaps(mut partitioned: Partitioned) -> Partitioned {
    let paid = &partitioned.paid_personal;

    let demoted: Vec<String> = partitioned
        .disposable
        .iter()
        .filter(|domain| paid.contains(*domain))
        .cloned()
        .collect();
    for domain in demoted {
        tracing::warn!("{} is both paid personal and disposable; keeping paid personal", domain);
        partitioned.disposable.remove(&domain);
    }

    let disposable = &partitioned.disposable;
    let shadowed: Vec<String> = partitioned
        .free
        .iter()
        .filter(|domain| disposable.contains(*domain))
        .cloned()
        .collect();
    for domain in shadowed {
        tracing::debug!("{} is custom disposable; removing it from free", domain);
        partitioned.free.remove(&domain);
    }

    partitioned
}

/// Domains present in more than one category, per pair.
pub fn overlaps(partitioned: &Partitioned) -> Vec<(&'static str, &'static str, DomainSet)> {
    let pairs = [
        ("disposable", &partitioned.disposable, "free", &partitioned.free),
        ("disposable", &partitioned.disposable, "paid_personal", &partitioned.paid_personal),
        ("free", &partitioned.free, "paid_personal", &partitioned.paid_personal),
    ];

    pairs
        .into_iter()
        .filter_map(|(left_name, left, right_name, right)| {
            let shared: DomainSet = left.intersection(right).cloned().collect();
            (!shared.is_empty()).then_some((left_name, right_name, shared))
        })
        .collect()
}
