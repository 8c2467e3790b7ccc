//! In-process document store.
//!
//! A live, shared list of documents with the query surface the batcher
//! consumes. Inserts and removals are visible to queries executed later,
//! including later batches of an iteration already in progress.

mod document;
mod value;


use crate::{
    db::{
        collection::Collection,
        query::{Execute, OrderSpec, PRIMARY_KEY_FIELD, Query},
    },
    error::StoreError,
};
use std::{
    cmp::Ordering,
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub use document::Document;
pub use value::{Value, canonical_cmp};

type Filter = Arc<dyn Fn(&Document) -> bool + Send + Sync>;

///
/// RoundTrip
///

#[derive(Clone, Copy, Debug)]
enum RoundTrip {
    Count,
    Execute,
}

///
/// MemoryState
///

#[derive(Debug, Default)]
struct MemoryState {
    documents: Vec<Document>,
    last_id: u64,
    count_calls: u64,
    execute_calls: u64,
    pending_failure: Option<StoreError>,
}

impl MemoryState {
    // Every count or execute is one round trip; an injected failure is consumed by it.
    fn round_trip(&mut self, kind: RoundTrip) -> Result<(), StoreError> {
        match kind {
            RoundTrip::Count => self.count_calls += 1,
            RoundTrip::Execute => self.execute_calls += 1,
        }

        self.pending_failure.take().map_or(Ok(()), Err)
    }
}

///
/// MemoryCollection
///
/// Shared handle; clones see the same documents.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryCollection {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a document, assigning the next sequential `_id` when it has none.
    pub fn insert(&self, mut document: Document) -> Value {
        let mut state = self.write();

        let id = if let Some(id) = document.id() {
            id.clone()
        } else {
            state.last_id += 1;
            let id = Value::Uint(state.last_id);
            document.set(PRIMARY_KEY_FIELD, id.clone());
            id
        };
        state.documents.push(document);

        id
    }

    pub fn insert_many(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Value> {
        documents.into_iter().map(|doc| self.insert(doc)).collect()
    }

    /// Remove matching documents; returns how many were removed.
    pub fn remove_where(&self, pred: impl Fn(&Document) -> bool) -> usize {
        let mut state = self.write();
        let before = state.documents.len();
        state.documents.retain(|doc| !pred(doc));

        before - state.documents.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `count()` round trips served so far.
    #[must_use]
    pub fn count_calls(&self) -> u64 {
        self.read().count_calls
    }

    /// Number of query executions served so far.
    #[must_use]
    pub fn execute_calls(&self) -> u64 {
        self.read().execute_calls
    }

    /// Fail the next round trip (count or execute) with `err`.
    pub fn fail_with(&self, err: StoreError) {
        self.write().pending_failure = Some(err);
    }

    /// Root query over every document, unordered.
    #[must_use]
    pub fn all(&self) -> MemoryQuery {
        MemoryQuery::new(self.clone())
    }
}

impl Collection for MemoryCollection {
    type Query = MemoryQuery;

    fn query(&self) -> MemoryQuery {
        self.all()
    }
}

///
/// MemoryQuery
///
/// Scoped view over a [`MemoryCollection`].
/// Unordered queries return documents in insertion order.
///

#[derive(Clone)]
pub struct MemoryQuery {
    collection: MemoryCollection,
    filters: Vec<Filter>,
    order: OrderSpec,
    limit: Option<u64>,
    skip: u64,
}

impl MemoryQuery {
    fn new(collection: MemoryCollection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order: OrderSpec::new(),
            limit: None,
            skip: 0,
        }
    }

    #[must_use]
    pub fn filter(&self, f: impl Fn(&Document) -> bool + Send + Sync + 'static) -> Self {
        let mut next = self.clone();
        next.filters.push(Arc::new(f));
        next
    }

    #[must_use]
    pub fn where_eq(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();

        self.filter(move |doc| doc.get(&field) == Some(&value))
    }

    #[must_use]
    pub fn where_exists(&self, field: impl Into<String>) -> Self {
        let field = field.into();

        self.filter(move |doc| doc.contains(&field))
    }

    #[must_use]
    pub fn asc(&self, field: impl Into<String>) -> Self {
        self.order_by(&OrderSpec::new().asc(field))
    }

    #[must_use]
    pub fn desc(&self, field: impl Into<String>) -> Self {
        self.order_by(&OrderSpec::new().desc(field))
    }

    #[must_use]
    pub const fn order(&self) -> &OrderSpec {
        &self.order
    }

    #[must_use]
    pub const fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn skip_value(&self) -> u64 {
        self.skip
    }

    fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f(doc))
    }

    fn compare(&self, left: &Document, right: &Document) -> Ordering {
        static MISSING: Value = Value::Null;

        for (field, direction) in &self.order {
            let a = left.get(field).unwrap_or(&MISSING);
            let b = right.get(field).unwrap_or(&MISSING);

            let ord = canonical_cmp(a, b);
            let ord = if direction.is_desc() { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }

        Ordering::Equal
    }
}

impl fmt::Debug for MemoryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQuery")
            .field("filters", &self.filters.len())
            .field("order", &self.order)
            .field("limit", &self.limit)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl Query for MemoryQuery {
    fn count(&self) -> Result<u64, StoreError> {
        let mut state = self.collection.write();
        state.round_trip(RoundTrip::Count)?;

        let matched = state.documents.iter().filter(|doc| self.matches(doc)).count();

        Ok(u64::try_from(matched).unwrap_or(u64::MAX))
    }

    fn order_by(&self, order: &OrderSpec) -> Self {
        let mut next = self.clone();
        next.order.extend_from(order);
        next
    }

    fn limit(&self, limit: u64) -> Self {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    fn skip(&self, skip: u64) -> Self {
        let mut next = self.clone();
        next.skip = skip;
        next
    }

    fn has_explicit_ordering(&self) -> bool {
        !self.order.is_empty()
    }
}

impl Execute for MemoryQuery {
    type Record = Document;

    fn execute(&self) -> Result<Vec<Document>, StoreError> {
        let mut state = self.collection.write();
        state.round_trip(RoundTrip::Execute)?;

        let mut matched: Vec<&Document> = state
            .documents
            .iter()
            .filter(|doc| self.matches(doc))
            .collect();

        // stable: ties keep insertion order
        if !self.order.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }
}
