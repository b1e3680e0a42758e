//! Search filters over record collections.
//!
//! Free-text search is an OR across its fields; every other clause,
//! including the search as a whole, combines with AND.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::entity::{field_value, Record};

type PredicateFn<R> = dyn Fn(&R, DateTime<Utc>) -> bool + Send + Sync;

/// A derived predicate evaluated at query time against the current time.
pub struct NamedPredicate<R> {
    name: String,
    test: Arc<PredicateFn<R>>,
}

impl<R> Clone for NamedPredicate<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<R> NamedPredicate<R> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Case-insensitive substring search across a set of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    needle: String,
    fields: Vec<String>,
}

impl TextSearch {
    pub fn new<I, S>(term: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needle: term.trim().to_lowercase(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// True when any configured field contains the term.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        self.fields.iter().any(|field| {
            field_value(record, field)
                .map(|value| value.to_lowercase().contains(&self.needle))
                .unwrap_or(false)
        })
    }
}

/// Conjunction of search clauses over records of type `R`.
pub struct RecordFilter<R: Record> {
    search: Option<TextSearch>,
    stage: Option<R::Stage>,
    equals: Vec<(String, String)>,
    predicates: Vec<NamedPredicate<R>>,
}

impl<R: Record> Clone for RecordFilter<R> {
    fn clone(&self) -> Self {
        Self {
            search: self.search.clone(),
            stage: self.stage,
            equals: self.equals.clone(),
            predicates: self.predicates.clone(),
        }
    }
}

impl<R: Record> Default for RecordFilter<R> {
    fn default() -> Self {
        Self {
            search: None,
            stage: None,
            equals: Vec::new(),
            predicates: Vec::new(),
        }
    }
}

impl<R: Record> fmt::Debug for RecordFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let predicates: Vec<&str> = self.predicates.iter().map(|p| p.name()).collect();
        f.debug_struct("RecordFilter")
            .field("search", &self.search)
            .field("stage", &self.stage)
            .field("equals", &self.equals)
            .field("predicates", &predicates)
            .finish()
    }
}

impl<R: Record> RecordFilter<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches the domain's default search fields. A blank term matches
    /// everything.
    pub fn search(self, term: &str) -> Self {
        self.search_in(term, R::SEARCH_FIELDS.iter().copied())
    }

    /// Searches the named fields.
    pub fn search_in<I, S>(mut self, term: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search = Some(TextSearch::new(term, fields));
        self
    }

    pub fn stage(mut self, stage: R::Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Requires `field` to equal `value` exactly.
    pub fn field_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.field_equals("id", id)
    }

    /// Adds a derived predicate, evaluated per query against the current time.
    pub fn matching<F>(mut self, name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&R, DateTime<Utc>) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(NamedPredicate {
            name: name.into(),
            test: Arc::new(test),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.stage.is_none()
            && self.equals.is_empty()
            && self.predicates.is_empty()
    }

    pub fn matches(&self, record: &R, now: DateTime<Utc>) -> bool {
        if let Some(search) = &self.search {
            if !search.matches(record) {
                return false;
            }
        }
        if let Some(stage) = self.stage {
            if record.stage() != stage {
                return false;
            }
        }
        let equals_ok = self.equals.iter().all(|(field, expected)| {
            field_value(record, field).as_deref() == Some(expected.as_str())
        });
        if !equals_ok {
            return false;
        }
        self.predicates.iter().all(|p| (p.test)(record, now))
    }

    /// Keeps the records matching every clause, in their original order.
    pub fn apply(&self, records: Vec<R>, now: DateTime<Utc>) -> Vec<R> {
        if self.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|record| self.matches(record, now))
            .collect()
    }
}

/// True when an item that is not completed is past its due date.
///
/// Evaluated against an explicit `now`, never stored.
pub fn is_overdue(completed: bool, due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match due_date {
        Some(due) => !completed && due < now,
        None => false,
    }
}
