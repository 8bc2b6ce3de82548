//! Phrase-table query router.
//!
//! Each category owns a list of trigger phrases. A query is tokenized, every
//! phrase occurrence is counted (occurrences may overlap, so "mechanism of
//! action" also counts "mechanism"), and the category with the strictly highest
//! count wins. Ties go to the earliest category in [`Category::PRIORITY`]; a
//! query that hits nothing is routed to [`Category::Clinical`].

use vetrag_core::Category;

use crate::tokenize::Analyzer;

pub const PHARMA_PHRASES: &[&str] = &[
    "indication",
    "tradename",
    "brand name",
    "active ingredient",
    "dose rate",
    "dosage",
    "administration",
    "contraindication",
    "food timing",
    "meal timing",
    "when shall i give",
    "mechanism",
    "mechanism of action",
    "products",
    "medications",
    "drugs",
];

pub const CLINICAL_PHRASES: &[&str] = &[
    "line of treatment",
    "treatment plan",
    "treatment protocol",
    "synonyms",
    "drug of choice",
    "preferred drug",
    "differential diagnosis",
    "diagnostic differentials",
    "management",
];

pub const DISEASE_PHRASES: &[&str] = &[
    "symptoms",
    "clinical signs",
    "manifestations",
    "presentation",
    "signs and symptoms",
    "symptomatology",
];

/// Category returned when no phrase matches.
pub const DEFAULT_CATEGORY: Category = Category::Clinical;

#[derive(Clone)]
pub struct CategoryClassifier {
    analyzer: Analyzer,
    /// Tokenized phrases per category, in priority order.
    tables: Vec<(Category, Vec<Vec<String>>)>,
}

impl CategoryClassifier {
    pub fn new<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = (Category, &'a [&'a str])>,
    {
        let analyzer = Analyzer::words();
        let mut tables: Vec<(Category, Vec<Vec<String>>)> = tables
            .into_iter()
            .map(|(category, phrases)| {
                let tokenized = phrases
                    .iter()
                    .map(|p| analyzer.tokens(p))
                    .filter(|t| !t.is_empty())
                    .collect();
                (category, tokenized)
            })
            .collect();
        tables.sort_by_key(|(category, _)| priority_rank(*category));
        Self { analyzer, tables }
    }

    /// Phrase hit counts, in priority order.
    pub fn counts(&self, query: &str) -> Vec<(Category, usize)> {
        let tokens = self.analyzer.tokens(query);
        self.tables
            .iter()
            .map(|(category, phrases)| {
                let hits = phrases.iter().map(|p| occurrences(&tokens, p)).sum();
                (*category, hits)
            })
            .collect()
    }

    pub fn classify(&self, query: &str) -> Category {
        let counts = self.counts(query);
        let mut best: Option<(Category, usize)> = None;
        for (category, hits) in counts {
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if hits <= top => {}
                _ => best = Some((category, hits)),
            }
        }
        let category = best.map_or(DEFAULT_CATEGORY, |(c, _)| c);
        tracing::debug!(%category, query, "classified query");
        category
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new([
            (Category::Pharma, PHARMA_PHRASES),
            (Category::Clinical, CLINICAL_PHRASES),
            (Category::Disease, DISEASE_PHRASES),
        ])
    }
}

fn priority_rank(category: Category) -> usize {
    Category::PRIORITY.iter().position(|c| *c == category).unwrap_or(usize::MAX)
}

fn occurrences(tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return 0;
    }
    tokens.windows(phrase.len()).filter(|w| *w == phrase).count()
}
