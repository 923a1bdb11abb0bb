use crate::core::classifier::DomainClassifier;
use crate::core::partition;
use crate::domain::model::{Category, DomainSet};

/// Well-known domains and the category a healthy dataset puts them in.
pub const KNOWN_DOMAINS: &[(&str, Category)] = &[
    ("10minutemail.com", Category::Disposable),
    ("mailinator.com", Category::Disposable),
    ("emailhook.site", Category::Disposable),
    ("guerrillamail.com", Category::Disposable),
    ("temp-mail.org", Category::Disposable),
    ("gmail.com", Category::Free),
    ("yahoo.com", Category::Free),
    ("hotmail.com", Category::Free),
    ("outlook.com", Category::Free),
    ("aol.com", Category::Free),
    ("protonmail.com", Category::PaidPersonal),
    ("fastmail.com", Category::PaidPersonal),
    ("hey.com", Category::PaidPersonal),
    ("tutanota.com", Category::PaidPersonal),
    ("google.com", Category::Business),
    ("microsoft.com", Category::Business),
    ("propulsionhq.com", Category::Business),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub domain: String,
    pub expected: Category,
    pub actual: Category,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub left: &'static str,
    pub right: &'static str,
    pub domains: DomainSet,
}

#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub cases: Vec<CaseResult>,
    pub overlaps: Vec<Overlap>,
}

impl VerificationReport {
    pub fn failed_cases(&self) -> usize {
        self.cases.iter().filter(|case| !case.passed()).count()
    }

    pub fn passed(&self) -> bool {
        self.failed_cases() == 0 && self.overlaps.is_empty()
    }
}

pub fn verify(classifier: &DomainClassifier, cases: &[(&str, Category)]) -> VerificationReport {
    let cases = cases
        .iter()
        .map(|(domain, expected)| CaseResult {
            domain: domain.to_string(),
            expected: *expected,
            actual: classifier.categorize(domain),
        })
        .collect();

    let overlaps = partition::overlaps(classifier.sets())
        .into_iter()
        .map(|(left, right, domains)| Overlap { left, right, domains })
        .collect();

    VerificationReport { cases, overlaps }
}
