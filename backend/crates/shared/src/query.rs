//! Typed Query Vocabulary
//!
//! Repositories accept filters built from a per-entity field enum, an
//! operator and a value instead of free-form keyword maps. The same
//! [`Filter`] evaluates against in-memory rows ([`Filter::matches`]) and
//! renders into SQL through `sqlx::QueryBuilder` (feature `sqlx`), and
//! both paths follow SQL three-valued logic: a comparison against NULL
//! never matches unless it is an explicit `IS NULL` / `IS NOT NULL`.
//!
//! ## Examples
//! ```rust
//! use kernel::query::{Field, Filter, Value};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Col { Status, Assignee }
//!
//! impl Field for Col {
//!     fn column(self) -> &'static str {
//!         match self {
//!             Col::Status => "t.status",
//!             Col::Assignee => "t.staff_assignee_id",
//!         }
//!     }
//! }
//!
//! let filter = Filter::new()
//!     .is_in(Col::Status, ["NEW", "IN_PROGRESS"])
//!     .is_null(Col::Assignee);
//!
//! assert!(filter.matches(|col| match col {
//!     Col::Status => Value::from("NEW"),
//!     Col::Assignee => Value::Null,
//! }));
//! ```

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::id::Id;

/// A filterable/sortable attribute of an entity
pub trait Field: Copy + fmt::Debug {
    /// Column the field renders to in SQL (alias-qualified)
    fn column(self) -> &'static str;
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Not,
    Gte,
    Lt,
    In,
}

/// Scalar operand of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Ordering between two values of the same variant
    ///
    /// `None` for NULL operands and for mismatched variants.
    pub fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Sort ordering with NULL treated as the largest value
    fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.partial_cmp_value(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T> From<Id<T>> for Value {
    fn from(v: Id<T>) -> Self {
        Value::Uuid(v.into_uuid())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Single predicate `field <op> value`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition<F> {
    pub field: F,
    pub op: Op,
    pub value: Value,
}

impl<F: Field> Condition<F> {
    pub fn new(field: F, op: Op, value: impl Into<Value>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    /// Evaluate against the field's current value
    pub fn matches(&self, actual: &Value) -> bool {
        match (self.op, &self.value) {
            (Op::Eq, Value::Null) => actual.is_null(),
            (Op::Not, Value::Null) => !actual.is_null(),
            _ if actual.is_null() => false,
            (Op::Eq, expected) => actual == expected,
            (Op::Not, expected) => !expected.is_null() && actual != expected,
            (Op::Gte, bound) => matches!(
                actual.partial_cmp_value(bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (Op::Lt, bound) => matches!(actual.partial_cmp_value(bound), Some(Ordering::Less)),
            (Op::In, Value::List(items)) => items.iter().any(|item| item == actual),
            (Op::In, single) => actual == single,
        }
    }
}

/// Conjunction of conditions; an empty filter matches everything
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    conditions: Vec<Condition<F>>,
}

impl<F> Default for Filter<F> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }
}

impl<F: Field> Filter<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, condition: Condition<F>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn eq(self, field: F, value: impl Into<Value>) -> Self {
        self.push(Condition::new(field, Op::Eq, value))
    }

    pub fn not(self, field: F, value: impl Into<Value>) -> Self {
        self.push(Condition::new(field, Op::Not, value))
    }

    pub fn gte(self, field: F, value: impl Into<Value>) -> Self {
        self.push(Condition::new(field, Op::Gte, value))
    }

    pub fn lt(self, field: F, value: impl Into<Value>) -> Self {
        self.push(Condition::new(field, Op::Lt, value))
    }

    pub fn is_in<V: Into<Value>>(self, field: F, values: impl IntoIterator<Item = V>) -> Self {
        let list = values.into_iter().map(Into::into).collect();
        self.push(Condition::new(field, Op::In, Value::List(list)))
    }

    pub fn is_null(self, field: F) -> Self {
        self.eq(field, Value::Null)
    }

    pub fn is_not_null(self, field: F) -> Self {
        self.not(field, Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition<F>] {
        &self.conditions
    }

    /// Evaluate every condition with `read` supplying field values
    pub fn matches(&self, read: impl Fn(F) -> Value) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(&read(condition.field)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F> Order<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Filter plus ordering and paging
#[derive(Debug, Clone, PartialEq)]
pub struct Query<F> {
    pub filter: Filter<F>,
    pub order: Vec<Order<F>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl<F> Default for Query<F> {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

impl<F: Field> Query<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter<F>) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order: Order<F>) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset.max(0));
        self
    }

    /// Run the query over an in-memory collection
    pub fn apply<T>(
        &self,
        items: impl IntoIterator<Item = T>,
        read: impl Fn(&T, F) -> Value,
    ) -> Vec<T> {
        let mut rows: Vec<T> = items
            .into_iter()
            .filter(|item| self.filter.matches(|field| read(item, field)))
            .collect();

        rows.sort_by(|a, b| {
            self.order
                .iter()
                .map(|order| {
                    let ordering = read(a, order.field).sort_cmp(&read(b, order.field));
                    match order.direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let offset = self.offset.map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
        let limit = self.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        rows.into_iter().skip(offset).take(limit).collect()
    }
}

// ============================================================================
// SQL rendering (feature-gated)
// ============================================================================

#[cfg(feature = "sqlx")]
pub mod sql {
    //! Renders the query vocabulary into a `sqlx::QueryBuilder`.
    //! Every operand is bound, never interpolated.

    use sqlx::{Postgres, QueryBuilder};

    use super::{Condition, Direction, Field, Filter, Op, Order, Query, Value};

    fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &Value) {
        match value {
            Value::Null => {
                qb.push("NULL");
            }
            Value::Bool(v) => {
                qb.push_bind(*v);
            }
            Value::Int(v) => {
                qb.push_bind(*v);
            }
            Value::Text(v) => {
                qb.push_bind(v.clone());
            }
            Value::Uuid(v) => {
                qb.push_bind(*v);
            }
            Value::Timestamp(v) => {
                qb.push_bind(*v);
            }
            Value::List(items) => {
                qb.push("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    push_value(qb, item);
                }
                qb.push(")");
            }
        }
    }

    fn push_condition<F: Field>(qb: &mut QueryBuilder<'_, Postgres>, condition: &Condition<F>) {
        let column = condition.field.column();

        match (condition.op, &condition.value) {
            (Op::Eq, Value::Null) => {
                qb.push(column).push(" IS NULL");
            }
            (Op::Not, Value::Null) => {
                qb.push(column).push(" IS NOT NULL");
            }
            (Op::Gte | Op::Lt, Value::Null) => {
                qb.push("FALSE");
            }
            (Op::In, Value::List(items)) if items.is_empty() => {
                qb.push("FALSE");
            }
            (Op::In, list @ Value::List(_)) => {
                qb.push(column).push(" IN ");
                push_value(qb, list);
            }
            (op, value) => {
                let operator = match op {
                    Op::Eq | Op::In => " = ",
                    Op::Not => " <> ",
                    Op::Gte => " >= ",
                    Op::Lt => " < ",
                };
                qb.push(column).push(operator);
                push_value(qb, value);
            }
        }
    }

    /// Append ` WHERE ...` (nothing for an empty filter)
    pub fn push_filter<F: Field>(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter<F>) {
        for (i, condition) in filter.conditions().iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            push_condition(qb, condition);
        }
    }

    /// Append ` ORDER BY ...` (nothing when unordered)
    pub fn push_order<F: Field>(qb: &mut QueryBuilder<'_, Postgres>, order: &[Order<F>]) {
        for (i, o) in order.iter().enumerate() {
            qb.push(if i == 0 { " ORDER BY " } else { ", " });
            qb.push(o.field.column());
            qb.push(match o.direction {
                Direction::Asc => " ASC",
                Direction::Desc => " DESC",
            });
        }
    }

    /// Append filter, ordering, `LIMIT` and `OFFSET`
    pub fn push_query<F: Field>(qb: &mut QueryBuilder<'_, Postgres>, query: &Query<F>) {
        push_filter(qb, &query.filter);
        push_order(qb, &query.order);
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = query.offset {
            qb.push(" OFFSET ").push_bind(offset);
        }
    }
}
