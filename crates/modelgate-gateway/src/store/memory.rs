//! In-memory model backend.
//!
//! Serves a Prisma-style operation set over JSON records so the gateway is
//! usable without an external ORM. Each model is one table guarded by its
//! `DashMap` shard; no operation awaits while holding a table.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use modelgate_core::error::OperationError;

use crate::dispatch::registry::{InputShape, ModelOperation, ModelRegistry};

type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("Record not found")]
    NotFound,
    #[error("Unique constraint failed on the fields: (`id`)")]
    DuplicateId,
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Id space exhausted")]
    IdSpaceExhausted,
}

impl From<StoreError> for OperationError {
    fn from(e: StoreError) -> Self {
        OperationError::new(e.to_string())
    }
}

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Operations every table exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    FindMany,
    FindFirst,
    FindUnique,
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Upsert,
    Delete,
    DeleteMany,
    Count,
}

impl OpKind {
    pub const ALL: [OpKind; 11] = [
        OpKind::FindMany,
        OpKind::FindFirst,
        OpKind::FindUnique,
        OpKind::Create,
        OpKind::CreateMany,
        OpKind::Update,
        OpKind::UpdateMany,
        OpKind::Upsert,
        OpKind::Delete,
        OpKind::DeleteMany,
        OpKind::Count,
    ];

    pub fn method_name(self) -> &'static str {
        match self {
            OpKind::FindMany => "findMany",
            OpKind::FindFirst => "findFirst",
            OpKind::FindUnique => "findUnique",
            OpKind::Create => "create",
            OpKind::CreateMany => "createMany",
            OpKind::Update => "update",
            OpKind::UpdateMany => "updateMany",
            OpKind::Upsert => "upsert",
            OpKind::Delete => "delete",
            OpKind::DeleteMany => "deleteMany",
            OpKind::Count => "count",
        }
    }
}

#[derive(Debug, Default)]
struct Table {
    next_id: u64,
    rows: Vec<Record>,
}

impl Table {
    fn insert(&mut self, mut data: Record) -> StoreResult<Record> {
        match data.get("id") {
            Some(id) => {
                if self.rows.iter().any(|r| r.get("id") == Some(id)) {
                    return Err(StoreError::DuplicateId);
                }
                if let Some(n) = id.as_u64() {
                    self.next_id = self.next_id.max(n);
                }
            }
            None => {
                let id = self.next_id.checked_add(1).ok_or(StoreError::IdSpaceExhausted)?;
                self.next_id = id;
                data.insert("id".into(), json!(id));
            }
        }
        self.rows.push(data.clone());
        Ok(data)
    }

    /// Insert a batch or nothing: on the first failure the table is restored.
    fn insert_many(&mut self, batch: Vec<Record>) -> StoreResult<u64> {
        let (len, next_id) = (self.rows.len(), self.next_id);
        for data in batch {
            if let Err(e) = self.insert(data) {
                self.rows.truncate(len);
                self.next_id = next_id;
                return Err(e);
            }
        }
        Ok((self.rows.len() - len) as u64)
    }

    /// Merge `data` into every row in `targets`. An `id` in `data` must stay
    /// unique: it may land on at most one row and not on any other row's id.
    fn update_rows(&mut self, targets: &[usize], data: &Record) -> StoreResult<()> {
        if let Some(id) = data.get("id") {
            let clash = self
                .rows
                .iter()
                .enumerate()
                .any(|(i, r)| !targets.contains(&i) && r.get("id") == Some(id));
            if targets.len() > 1 || clash {
                return Err(StoreError::DuplicateId);
            }
            if let Some(n) = id.as_u64() {
                self.next_id = self.next_id.max(n);
            }
        }
        for &i in targets {
            merge(&mut self.rows[i], data);
        }
        Ok(())
    }

    fn position(&self, filter: &Record) -> Option<usize> {
        self.rows.iter().position(|r| matches_filter(r, filter))
    }
}

/// Top-level field equality; an empty filter matches every record.
fn matches_filter(record: &Record, filter: &Record) -> bool {
    filter.iter().all(|(k, v)| record.get(k) == Some(v))
}

fn merge(record: &mut Record, data: &Record) {
    for (k, v) in data {
        record.insert(k.clone(), v.clone());
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindArgs {
    #[serde(default, rename = "where")]
    filter: Option<Record>,
    #[serde(default)]
    take: Option<usize>,
    #[serde(default)]
    skip: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct WhereArgs {
    #[serde(rename = "where")]
    filter: Record,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    data: Record,
}

#[derive(Debug, Deserialize)]
struct CreateManyArgs {
    data: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    #[serde(rename = "where")]
    filter: Record,
    data: Record,
}

#[derive(Debug, Deserialize)]
struct UpdateManyArgs {
    #[serde(default, rename = "where")]
    filter: Option<Record>,
    data: Record,
}

#[derive(Debug, Deserialize)]
struct UpsertArgs {
    #[serde(rename = "where")]
    filter: Record,
    create: Record,
    update: Record,
}

fn args<T: for<'de> Deserialize<'de>>(body: Value) -> StoreResult<T> {
    serde_json::from_value(body).map_err(|e| StoreError::InvalidArgs(e.to_string()))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, model: &str) {
        self.tables.entry(model.to_string()).or_default();
    }

    /// Register every operation of every table into `registry`.
    pub fn register_into(self: &Arc<Self>, registry: &mut ModelRegistry) {
        let models: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        for model in models {
            for kind in OpKind::ALL {
                let op = StoreOp {
                    store: Arc::clone(self),
                    model: model.clone(),
                    kind,
                };
                registry.register(&model, kind.method_name(), InputShape::Object, Arc::new(op));
            }
        }
    }

    pub fn execute(&self, model: &str, kind: OpKind, body: Value) -> StoreResult<Value> {
        let mut table = self
            .tables
            .get_mut(model)
            .ok_or_else(|| StoreError::UnknownTable(model.to_string()))?;

        match kind {
            OpKind::FindMany => {
                let a: FindArgs = args(body)?;
                let filter = a.filter.unwrap_or_default();
                let rows: Vec<Value> = table
                    .rows
                    .iter()
                    .filter(|r| matches_filter(r, &filter))
                    .skip(a.skip.unwrap_or(0))
                    .take(a.take.unwrap_or(usize::MAX))
                    .map(|r| Value::Object(r.clone()))
                    .collect();
                Ok(Value::Array(rows))
            }
            OpKind::FindFirst => {
                let a: FindArgs = args(body)?;
                let filter = a.filter.unwrap_or_default();
                Ok(table
                    .position(&filter)
                    .map(|i| Value::Object(table.rows[i].clone()))
                    .unwrap_or(Value::Null))
            }
            OpKind::FindUnique => {
                let a: WhereArgs = args(body)?;
                Ok(table
                    .position(&a.filter)
                    .map(|i| Value::Object(table.rows[i].clone()))
                    .unwrap_or(Value::Null))
            }
            OpKind::Create => {
                let a: CreateArgs = args(body)?;
                Ok(Value::Object(table.insert(a.data)?))
            }
            OpKind::CreateMany => {
                let a: CreateManyArgs = args(body)?;
                let count = table.insert_many(a.data)?;
                Ok(json!({ "count": count }))
            }
            OpKind::Update => {
                let a: UpdateArgs = args(body)?;
                let i = table.position(&a.filter).ok_or(StoreError::NotFound)?;
                table.update_rows(&[i], &a.data)?;
                Ok(Value::Object(table.rows[i].clone()))
            }
            OpKind::UpdateMany => {
                let a: UpdateManyArgs = args(body)?;
                let filter = a.filter.unwrap_or_default();
                let targets: Vec<usize> = table
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| matches_filter(r, &filter))
                    .map(|(i, _)| i)
                    .collect();
                table.update_rows(&targets, &a.data)?;
                Ok(json!({ "count": targets.len() }))
            }
            OpKind::Upsert => {
                let a: UpsertArgs = args(body)?;
                match table.position(&a.filter) {
                    Some(i) => {
                        table.update_rows(&[i], &a.update)?;
                        Ok(Value::Object(table.rows[i].clone()))
                    }
                    None => Ok(Value::Object(table.insert(a.create)?)),
                }
            }
            OpKind::Delete => {
                let a: WhereArgs = args(body)?;
                let i = table.position(&a.filter).ok_or(StoreError::NotFound)?;
                Ok(Value::Object(table.rows.remove(i)))
            }
            OpKind::DeleteMany => {
                let a: FindArgs = args(body)?;
                let filter = a.filter.unwrap_or_default();
                let before = table.rows.len();
                table.rows.retain(|r| !matches_filter(r, &filter));
                Ok(json!({ "count": before - table.rows.len() }))
            }
            OpKind::Count => {
                let a: FindArgs = args(body)?;
                let filter = a.filter.unwrap_or_default();
                Ok(json!(table.rows.iter().filter(|r| matches_filter(r, &filter)).count()))
            }
        }
    }
}

struct StoreOp {
    store: Arc<MemoryStore>,
    model: String,
    kind: OpKind,
}

#[async_trait]
impl ModelOperation for StoreOp {
    async fn call(&self, body: Value) -> std::result::Result<Value, OperationError> {
        Ok(self.store.execute(&self.model, self.kind, body)?)
    }
}
