//! In-Memory Data Source
//!
//! Table-per-entity source of JSON records. Arguments follow the usual
//! positional shapes: `findOne({where})`, `findAll({where})`,
//! `findAndCountAll({where})`, `count({where})` and `sum|min|max(field, {where})`.
//! Filtering is equality on top-level fields.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::{json, Map, Number, Value};
use tracing::debug;

use crate::cacher::Operation;
use crate::error::SourceError;
use crate::key::Arg;
use crate::source::{DataSource, PlainProjectable, QueryOutput, SourceHandle};

type Record = Map<String, Value>;

// == Model Handle ==
/// Names one table of a [`MemorySource`].
#[derive(Debug, Clone)]
pub struct ModelHandle {
    name: String,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SourceHandle for ModelHandle {
    fn name(&self) -> &str {
        &self.name
    }
}

// == Row ==
/// A record returned by single-row lookups.
#[derive(Debug, Clone)]
pub struct Row {
    data: Record,
}

impl PlainProjectable for Row {
    fn to_plain(&self) -> serde_json::Result<Value> {
        Ok(Value::Object(self.data.clone()))
    }
}

// == Memory Source ==
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    calls: AtomicU64,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from `{ "Entity": [record, ...], ... }`.
    pub fn from_json(fixtures: Value) -> Result<Self, SourceError> {
        let Value::Object(entities) = fixtures else {
            return Err(SourceError::Query(
                "fixtures must be an object of entity tables".to_string(),
            ));
        };

        let source = Self::new();
        for (entity, rows) in entities {
            let Value::Array(rows) = rows else {
                return Err(SourceError::Query(format!(
                    "table '{}' must be an array of records",
                    entity
                )));
            };
            source.define(&entity);
            for row in rows {
                source.insert(&entity, row)?;
            }
        }
        Ok(source)
    }

    /// Registers an empty table for `entity` if it does not exist yet.
    pub fn define(&self, entity: &str) {
        self.write().entry(entity.to_string()).or_default();
    }

    /// Appends a record to `entity`, creating the table if needed.
    pub fn insert(&self, entity: &str, record: Value) -> Result<(), SourceError> {
        let Value::Object(record) = record else {
            return Err(SourceError::Query(format!(
                "records in '{}' must be objects",
                entity
            )));
        };
        self.write()
            .entry(entity.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Handle to the `entity` table, usable as an argument.
    pub fn model(&self, entity: &str) -> ModelHandle {
        ModelHandle::new(entity)
    }

    pub fn entities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of operations executed so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn matching(&self, entity: &str, options: Option<&Arg>) -> Result<Vec<Record>, SourceError> {
        let filter = match options.and_then(|opts| opts.field("where")) {
            None => Record::new(),
            Some(clause) => match clause.to_json() {
                Value::Object(fields) => fields,
                Value::Null => Record::new(),
                other => {
                    return Err(SourceError::InvalidArguments {
                        operation: "where".to_string(),
                        reason: format!("expected an object, got {}", other),
                    })
                }
            },
        };

        let tables = self.read();
        let rows = tables
            .get(entity)
            .ok_or_else(|| SourceError::Query(format!("no table for entity '{}'", entity)))?;

        Ok(rows
            .iter()
            .filter(|row| filter.iter().all(|(k, v)| row.get(k) == Some(v)))
            .cloned()
            .collect())
    }

    // A poisoned lock still holds complete tables.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Record>>> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Record>>> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DataSource for MemorySource {
    fn supports(&self, entity: &str, _operation: Operation) -> bool {
        self.read().contains_key(entity)
    }

    async fn call(
        &self,
        entity: &str,
        operation: Operation,
        args: &[Arg],
    ) -> Result<QueryOutput, SourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        debug!(entity = %entity, operation = %operation, "Executing query");

        match operation {
            Operation::Find | Operation::FindOne => {
                let mut rows = self.matching(entity, args.first())?;
                Ok(if rows.is_empty() {
                    QueryOutput::Empty
                } else {
                    QueryOutput::record(Row {
                        data: rows.swap_remove(0),
                    })
                })
            }
            Operation::FindAll | Operation::All => {
                let rows = self.matching(entity, args.first())?;
                Ok(QueryOutput::Rows(rows.into_iter().map(Value::Object).collect()))
            }
            Operation::FindAndCountAll => {
                let rows = self.matching(entity, args.first())?;
                Ok(QueryOutput::Value(json!({
                    "count": rows.len(),
                    "rows": rows,
                })))
            }
            Operation::Count => {
                let rows = self.matching(entity, args.first())?;
                Ok(QueryOutput::Value(json!(rows.len())))
            }
            Operation::Sum | Operation::Min | Operation::Max => {
                let field = args
                    .first()
                    .and_then(Arg::as_string)
                    .ok_or_else(|| SourceError::InvalidArguments {
                        operation: operation.to_string(),
                        reason: "first argument must be a field name".to_string(),
                    })?;
                let rows = self.matching(entity, args.get(1))?;
                let numbers: Vec<&Number> = rows
                    .iter()
                    .filter_map(|row| match row.get(&field) {
                        Some(Value::Number(n)) => Some(n),
                        _ => None,
                    })
                    .collect();
                Ok(QueryOutput::Value(aggregate(operation, &numbers)))
            }
        }
    }
}

fn aggregate(operation: Operation, numbers: &[&Number]) -> Value {
    match operation {
        Operation::Sum => {
            let ints: Option<Vec<i64>> = numbers.iter().map(|n| n.as_i64()).collect();
            match ints.and_then(|ints| ints.into_iter().try_fold(0i64, i64::checked_add)) {
                Some(total) => json!(total),
                None => json!(numbers.iter().filter_map(|n| n.as_f64()).sum::<f64>()),
            }
        }
        Operation::Min | Operation::Max => {
            let pick = numbers.iter().copied().reduce(|best, n| {
                let (a, b) = (best.as_f64().unwrap_or(f64::NAN), n.as_f64().unwrap_or(f64::NAN));
                let better = if operation == Operation::Min { b < a } else { b > a };
                if better {
                    n
                } else {
                    best
                }
            });
            pick.map_or(Value::Null, |n| Value::Number(n.clone()))
        }
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> MemorySource {
        MemorySource::from_json(json!({
            "User": [
                {"id": 7, "name": "alice", "age": 31, "team": "core"},
                {"id": 8, "name": "bob", "age": 25, "team": "core"},
                {"id": 9, "name": "carol", "age": 40, "team": "ops"},
            ],
            "Post": [],
        }))
        .unwrap()
    }

    fn where_clause(filter: Value) -> Vec<Arg> {
        vec![Arg::from(json!({ "where": filter }))]
    }

    #[tokio::test]
    async fn test_find_one_returns_record() {
        let source = users();
        let output = source
            .call("User", Operation::FindOne, &where_clause(json!({"id": 7})))
            .await
            .unwrap();

        let plain = output.into_plain().unwrap();
        assert_eq!(plain["name"], "alice");
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_find_one_absent() {
        let source = users();
        let output = source
            .call("User", Operation::FindOne, &where_clause(json!({"id": 100})))
            .await
            .unwrap();
        assert!(matches!(output, QueryOutput::Empty));
    }

    #[tokio::test]
    async fn test_find_all_and_count() {
        let source = users();
        let args = where_clause(json!({"team": "core"}));

        let rows = source.call("User", Operation::FindAll, &args).await.unwrap();
        assert_eq!(rows.into_plain().unwrap().as_array().unwrap().len(), 2);

        let count = source.call("User", Operation::Count, &args).await.unwrap();
        assert_eq!(count.into_plain().unwrap(), json!(2));

        let both = source
            .call("User", Operation::FindAndCountAll, &args)
            .await
            .unwrap()
            .into_plain()
            .unwrap();
        assert_eq!(both["count"], 2);
        assert_eq!(both["rows"].as_array().unwrap().len(), 2);

        let everyone = source.call("User", Operation::All, &[]).await.unwrap();
        assert_eq!(everyone.into_plain().unwrap().as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_aggregates() {
        let source = users();
        let field = |f: &str| vec![Arg::from(f)];

        let sum = source.call("User", Operation::Sum, &field("age")).await.unwrap();
        assert_eq!(sum.into_plain().unwrap(), json!(96));

        let min = source.call("User", Operation::Min, &field("age")).await.unwrap();
        assert_eq!(min.into_plain().unwrap(), json!(25));

        let max = source.call("User", Operation::Max, &field("age")).await.unwrap();
        assert_eq!(max.into_plain().unwrap(), json!(40));

        let scoped = vec![Arg::from("age"), Arg::from(json!({"where": {"team": "core"}}))];
        let sum = source.call("User", Operation::Sum, &scoped).await.unwrap();
        assert_eq!(sum.into_plain().unwrap(), json!(56));

        let empty = source.call("Post", Operation::Max, &field("likes")).await.unwrap();
        assert_eq!(empty.into_plain().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_aggregate_requires_field() {
        let source = users();
        let result = source.call("User", Operation::Sum, &[]).await;
        assert!(matches!(result, Err(SourceError::InvalidArguments { .. })));
    }

    #[tokio::test]
    async fn test_invalid_where_clause() {
        let source = users();
        let result = source
            .call("User", Operation::FindAll, &where_clause(json!(5)))
            .await;
        assert!(matches!(result, Err(SourceError::InvalidArguments { .. })));
    }

    #[test]
    fn test_supports_known_entities_only() {
        let source = users();
        assert!(source.supports("User", Operation::Count));
        assert!(source.supports("Post", Operation::FindAll));
        assert!(!source.supports("Comment", Operation::Count));
        assert_eq!(source.entities(), vec!["Post".to_string(), "User".to_string()]);
    }

    #[test]
    fn test_model_handle_is_named_argument() {
        let source = users();
        let include = Arg::map([("include", Arg::handle(source.model("Post")))]);
        assert_eq!(include.to_json(), json!({"include": "Post"}));
    }

    #[test]
    fn test_fixture_validation() {
        assert!(MemorySource::from_json(json!([])).is_err());
        assert!(MemorySource::from_json(json!({"User": {}})).is_err());
        assert!(MemorySource::from_json(json!({"User": [1]})).is_err());
    }
}
