//! Indexed fact database and composable queries.

use crate::classify;
use crate::model::{Context, Fact, PeriodKey, QName, StatementType, Unit};
use crate::taxonomy::Taxonomy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Immutable, indexed store of a filing's facts, contexts and units.
#[derive(Clone, Debug, Default)]
pub struct FactStore {
    facts: Vec<Fact>,
    contexts: HashMap<String, Context>,
    units: HashMap<String, Unit>,
    by_concept: HashMap<QName, Vec<usize>>,
    by_local: HashMap<String, Vec<usize>>,
    by_period: HashMap<PeriodKey, Vec<usize>>,
    by_fact_id: HashMap<String, usize>,
}

impl FactStore {
    /// Builds the store and its indexes.
    #[must_use]
    pub fn build(
        facts: Vec<Fact>,
        contexts: HashMap<String, Context>,
        units: HashMap<String, Unit>,
    ) -> Self {
        let mut store = Self {
            facts,
            contexts,
            units,
            by_concept: HashMap::new(),
            by_local: HashMap::new(),
            by_period: HashMap::new(),
            by_fact_id: HashMap::new(),
        };
        for (idx, fact) in store.facts.iter().enumerate() {
            store
                .by_concept
                .entry(fact.concept.clone())
                .or_default()
                .push(idx);
            store
                .by_local
                .entry(fact.concept.local_name().to_string())
                .or_default()
                .push(idx);
            store.by_fact_id.insert(fact.id.clone(), idx);
            if let Some(context) = store.contexts.get(&fact.context_ref) {
                store
                    .by_period
                    .entry(context.period.key())
                    .or_default()
                    .push(idx);
            }
        }
        store
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True when the store holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates over all facts.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Fact by instance id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Fact> {
        self.by_fact_id.get(id).map(|&idx| &self.facts[idx])
    }

    /// The context a fact is bound to.
    #[must_use]
    pub fn context_of(&self, fact: &Fact) -> Option<&Context> {
        self.contexts.get(&fact.context_ref)
    }

    /// The unit a fact is measured in.
    #[must_use]
    pub fn unit_of(&self, fact: &Fact) -> Option<&Unit> {
        fact.unit_ref.as_deref().and_then(|id| self.units.get(id))
    }

    /// The period key of a fact's context.
    #[must_use]
    pub fn period_of(&self, fact: &Fact) -> Option<PeriodKey> {
        self.context_of(fact).map(|c| c.period.key())
    }

    /// Dimensional qualifiers of a fact's context (empty when
    /// non-dimensional).
    #[must_use]
    pub fn dimensions_of(&self, fact: &Fact) -> BTreeMap<QName, QName> {
        self.context_of(fact)
            .map(|c| c.dimensions.clone())
            .unwrap_or_default()
    }

    /// All distinct period keys with at least one fact.
    #[must_use]
    pub fn period_keys(&self) -> Vec<PeriodKey> {
        let mut keys: Vec<PeriodKey> = self.by_period.keys().copied().collect();
        crate::model::sort_period_keys_desc(&mut keys);
        keys
    }

    /// Facts for a concept, unfiltered.
    #[must_use]
    pub fn facts_for_concept(&self, concept: &QName) -> Vec<&Fact> {
        self.by_concept
            .get(concept)
            .map(|idxs| idxs.iter().map(|&i| &self.facts[i]).collect())
            .unwrap_or_default()
    }

    /// The non-dimensional fact for `(concept, period)`, if reported.
    #[must_use]
    pub fn fact_at(&self, concept: &QName, period: &PeriodKey) -> Option<&Fact> {
        let idxs = self.by_concept.get(concept)?;
        idxs.iter().map(|&i| &self.facts[i]).find(|f| {
            self.context_of(f)
                .is_some_and(|c| c.period.key() == *period && !c.is_dimensional())
        })
    }

    /// Dimensional facts for `(concept, period)`: one entry per populated
    /// `(axis, member)` combination.
    #[must_use]
    pub fn dimensional_facts_at(&self, concept: &QName, period: &PeriodKey) -> Vec<&Fact> {
        self.by_concept
            .get(concept)
            .map(|idxs| {
                idxs.iter()
                    .map(|&i| &self.facts[i])
                    .filter(|f| {
                        self.context_of(f)
                            .is_some_and(|c| c.period.key() == *period && c.is_dimensional())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Footnote ids linked to a fact.
    #[must_use]
    pub fn footnote_ids_for_fact(&self, fact_id: &str) -> Vec<String> {
        self.by_id(fact_id)
            .map(|f| f.footnote_refs.clone())
            .unwrap_or_default()
    }

    /// Starts a query over this store.
    #[must_use]
    pub fn query(&self) -> FactQuery<'_> {
        FactQuery::new(self)
    }
}

/// One row of a query result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    /// Fact id.
    pub id: String,
    /// Reported concept.
    pub concept: QName,
    /// Standard label when a taxonomy was attached to the query.
    pub label: Option<String>,
    /// Reporting period.
    pub period: PeriodKey,
    /// Numeric value, if any.
    pub value: Option<Decimal>,
    /// Raw text, if any.
    pub text: Option<String>,
    /// Display unit, if any.
    pub unit: Option<String>,
    /// Dimensional qualifiers (empty when non-dimensional).
    pub dimensions: BTreeMap<QName, QName>,
}

type Predicate<'a> = Box<dyn Fn(&FactStore, &Fact) -> bool + 'a>;

/// Composable fact query: every `by_*`/`non_*` call adds a conjunct.
///
/// ```
/// # use hobart_xbrl::facts::FactStore;
/// # let store = FactStore::default();
/// let rows = store
///     .query()
///     .by_local_name("Assets")
///     .non_dimensional()
///     .execute();
/// assert!(rows.is_empty());
/// ```
pub struct FactQuery<'a> {
    store: &'a FactStore,
    taxonomy: Option<&'a Taxonomy>,
    predicates: Vec<Predicate<'a>>,
}

impl std::fmt::Debug for FactQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactQuery")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

impl<'a> FactQuery<'a> {
    fn new(store: &'a FactStore) -> Self {
        Self {
            store,
            taxonomy: None,
            predicates: Vec::new(),
        }
    }

    /// Attaches a taxonomy, enabling label filters, statement-type filters
    /// and labeled result rows.
    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: &'a Taxonomy) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    fn push(mut self, predicate: impl Fn(&FactStore, &Fact) -> bool + 'a) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Keeps facts with exactly this concept qname.
    #[must_use]
    pub fn by_concept(self, concept: impl Into<QName>) -> Self {
        let concept = concept.into();
        self.push(move |_, f| f.concept == concept)
    }

    /// Keeps facts whose concept local name matches (case-insensitive).
    #[must_use]
    pub fn by_local_name(self, local: &'a str) -> Self {
        self.push(move |_, f| f.concept.local_name().eq_ignore_ascii_case(local))
    }

    /// Keeps facts whose concept appears under a presentation role
    /// classified as `statement_type`. Requires an attached taxonomy.
    #[must_use]
    pub fn by_statement_type(self, statement_type: StatementType) -> Self {
        let concepts: std::collections::HashSet<QName> = self
            .taxonomy
            .map(|taxonomy| {
                taxonomy
                    .presentation
                    .iter()
                    .filter(|(role, tree)| {
                        classify::classify_role(
                            role,
                            taxonomy.role_definition(role),
                            &tree.root_concepts(),
                        ) == statement_type
                    })
                    .flat_map(|(_, tree)| tree.nodes.iter().map(|n| n.concept.clone()))
                    .collect()
            })
            .unwrap_or_default();
        self.push(move |_, f| concepts.contains(&f.concept))
    }

    /// Keeps facts reported for exactly this period.
    #[must_use]
    pub fn by_period(self, period: PeriodKey) -> Self {
        self.push(move |s, f| s.period_of(f) == Some(period))
    }

    /// Keeps instant facts at `date`.
    #[must_use]
    pub fn by_instant(self, date: chrono::NaiveDate) -> Self {
        self.by_period(PeriodKey::instant(date))
    }

    /// Keeps duration facts ending on `date`.
    #[must_use]
    pub fn by_duration_ending(self, date: chrono::NaiveDate) -> Self {
        self.push(move |s, f| {
            s.period_of(f)
                .is_some_and(|p| p.duration_days().is_some() && p.end_date() == date)
        })
    }

    /// Keeps facts whose period ends within `[start, end]`.
    #[must_use]
    pub fn ending_between(self, start: chrono::NaiveDate, end: chrono::NaiveDate) -> Self {
        self.push(move |s, f| {
            s.period_of(f)
                .is_some_and(|p| p.end_date() >= start && p.end_date() <= end)
        })
    }

    /// Keeps facts qualified on `axis`; with `member`, only that member.
    #[must_use]
    pub fn by_dimension(self, axis: impl Into<QName>, member: Option<QName>) -> Self {
        let axis = axis.into();
        self.push(move |s, f| {
            s.context_of(f).is_some_and(|c| match c.dimensions.get(&axis) {
                Some(m) => member.as_ref().is_none_or(|wanted| wanted == m),
                None => false,
            })
        })
    }

    /// Keeps only dimensional facts.
    #[must_use]
    pub fn dimensional(self) -> Self {
        self.push(|s, f| s.context_of(f).is_some_and(Context::is_dimensional))
    }

    /// Keeps only non-dimensional facts.
    #[must_use]
    pub fn non_dimensional(self) -> Self {
        self.push(|s, f| s.context_of(f).is_some_and(|c| !c.is_dimensional()))
    }

    /// Keeps facts whose display unit matches (`USD`, `shares`, ...).
    #[must_use]
    pub fn by_unit(self, unit: &'a str) -> Self {
        self.push(move |s, f| s.unit_of(f).is_some_and(|u| u.display() == unit))
    }

    /// Keeps facts whose standard label contains `needle`
    /// (case-insensitive). Requires an attached taxonomy.
    #[must_use]
    pub fn by_label_contains(self, needle: &'a str) -> Self {
        let taxonomy = self.taxonomy;
        self.push(move |_, f| {
            taxonomy.is_some_and(|t| {
                t.labels
                    .get(&f.concept, crate::taxonomy::label::roles::STANDARD, "en-US")
                    .is_some_and(|l| l.to_lowercase().contains(&needle.to_lowercase()))
            })
        })
    }

    /// Keeps numeric facts whose value satisfies `predicate`.
    #[must_use]
    pub fn by_value(self, predicate: impl Fn(Decimal) -> bool + 'a) -> Self {
        self.push(move |_, f| f.value.is_some_and(&predicate))
    }

    /// Runs the query, returning matching rows in document order.
    #[must_use]
    pub fn execute(self) -> Vec<FactRow> {
        let Self {
            store,
            taxonomy,
            predicates,
        } = self;
        store
            .iter()
            .filter(|fact| predicates.iter().all(|p| p(store, fact)))
            .filter_map(|fact| {
                let period = store.period_of(fact)?;
                Some(FactRow {
                    id: fact.id.clone(),
                    concept: fact.concept.clone(),
                    label: taxonomy.and_then(|t| {
                        t.labels
                            .get(&fact.concept, crate::taxonomy::label::roles::STANDARD, "en-US")
                            .map(str::to_string)
                    }),
                    period,
                    value: fact.value,
                    text: fact.text.clone(),
                    unit: store.unit_of(fact).map(Unit::display),
                    dimensions: store.dimensions_of(fact),
                })
            })
            .collect()
    }

    /// Runs the query, returning only the match count.
    #[must_use]
    pub fn count(self) -> usize {
        let Self {
            store, predicates, ..
        } = self;
        store
            .iter()
            .filter(|fact| predicates.iter().all(|p| p(store, fact)))
            .count()
    }
}
