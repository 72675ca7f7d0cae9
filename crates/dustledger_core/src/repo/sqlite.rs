//! SQLite repository backend.
//!
//! # Responsibility
//! - Implement the searchable repository contract for any `SqliteRecord`.
//! - Translate `SearchParams` into `WHERE` / `ORDER BY` / `LIMIT OFFSET`.
//!
//! # Invariants
//! - Only columns from the entity's `TableMapping` are interpolated into SQL;
//!   every value is bound as a parameter.
//! - Every ordered query ends with `rowid ASC`, so ties come back in storage
//!   order exactly like the in-memory backend's stable sort.
//! - Decoded rows are validated; invalid stored state is an error.
//! - `bulk_insert` is all-or-nothing; the batch runs in one transaction.

use crate::model::entity::SearchableEntity;
use crate::repo::{validate_all, RepoError, RepoResult, Repository, SearchableRepository};
use crate::search::{SearchParams, SearchResult, SortDirection};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::marker::PhantomData;
use std::time::Instant;

/// Logical-field to physical-column mapping of one table.
#[derive(Debug, Clone, Copy)]
pub struct TableMapping {
    pub table: &'static str,
    pub id_column: &'static str,
    /// `(field, column)` pairs; row values are bound in this order.
    pub columns: &'static [(&'static str, &'static str)],
}

impl TableMapping {
    pub fn column_for(&self, field: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
    }

    fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|(_, column)| *column)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert_sql(&self) -> String {
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            self.table,
            self.select_list()
        )
    }

    /// `UPDATE` binding every column in mapping order, then the id.
    fn update_sql(&self) -> String {
        let assignments = self
            .columns
            .iter()
            .map(|(_, column)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {assignments} WHERE {} = ?;",
            self.table, self.id_column
        )
    }
}

/// Entity stored in a SQLite table.
pub trait SqliteRecord: SearchableEntity {
    const MAPPING: TableMapping;

    fn id_value(id: &Self::Id) -> Value;

    /// Column values in `MAPPING.columns` order.
    fn to_values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// SQL predicate and bound values equivalent to `matches_filter`.
    fn filter_predicate(filter: &Self::Filter) -> (String, Vec<Value>);
}

pub struct SqliteRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> E>,
}

impl<'conn, E: SqliteRecord> SqliteRepository<'conn, E> {
    /// Constructs a repository over a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::InvalidData` when the mapped table does not exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [E::MAPPING.table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepoError::InvalidData(format!(
                "table `{}` is missing; open the database through open_db first",
                E::MAPPING.table
            )));
        }

        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    fn order_by(params: &SearchParams<E::Filter>) -> RepoResult<(&'static str, SortDirection)> {
        let (field, direction) = match params.sort().filter(|field| E::is_sortable(field)) {
            Some(field) => (field, params.sort_dir()),
            None => E::DEFAULT_SORT,
        };

        let column = E::MAPPING.column_for(field).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "sort field `{field}` has no column in table `{}`",
                E::MAPPING.table
            ))
        })?;
        Ok((column, direction))
    }

    fn query_records(&self, sql: &str, values: &[Value]) -> RepoResult<Vec<E>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(values.iter()))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(E::from_row(row)?);
        }

        Ok(records)
    }
}

impl<E: SqliteRecord> Repository<E> for SqliteRepository<'_, E> {
    fn insert(&mut self, entity: &E) -> RepoResult<()> {
        entity.validate()?;
        self.conn.execute(
            &E::MAPPING.insert_sql(),
            params_from_iter(entity.to_values()),
        )?;
        Ok(())
    }

    fn bulk_insert(&mut self, entities: &[E]) -> RepoResult<()> {
        validate_all(entities)?;

        // Dropping `tx` before `commit` rolls back every row of the batch.
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&E::MAPPING.insert_sql())?;
            for entity in entities {
                stmt.execute(params_from_iter(entity.to_values()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update(&mut self, entity: &E) -> RepoResult<()> {
        entity.validate()?;
        let mut values = entity.to_values();
        values.push(E::id_value(entity.entity_id()));

        let changed = self
            .conn
            .execute(&E::MAPPING.update_sql(), params_from_iter(values))?;
        if changed == 0 {
            return Err(RepoError::not_found::<E>(entity.entity_id()));
        }
        Ok(())
    }

    fn delete(&mut self, id: &E::Id) -> RepoResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1;",
            E::MAPPING.table,
            E::MAPPING.id_column
        );
        let changed = self.conn.execute(&sql, [E::id_value(id)])?;
        if changed == 0 {
            return Err(RepoError::not_found::<E>(id));
        }
        Ok(())
    }

    fn find_by_id(&self, id: &E::Id) -> RepoResult<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1;",
            E::MAPPING.select_list(),
            E::MAPPING.table,
            E::MAPPING.id_column
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([E::id_value(id)])?;
        let record = match rows.next()? {
            Some(row) => Some(E::from_row(row)?),
            None => None,
        };
        Ok(record)
    }

    fn find_all(&self) -> RepoResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {};",
            E::MAPPING.select_list(),
            E::MAPPING.table
        );
        self.query_records(&sql, &[])
    }
}

impl<E: SqliteRecord> SearchableRepository<E> for SqliteRepository<'_, E> {
    fn search(&self, params: &SearchParams<E::Filter>) -> RepoResult<SearchResult<E>> {
        let started_at = Instant::now();
        let mapping = E::MAPPING;

        let (where_sql, mut values) = match params.filter() {
            Some(filter) => {
                let (predicate, values) = E::filter_predicate(filter);
                (format!(" WHERE {predicate}"), values)
            }
            None => (String::new(), Vec::new()),
        };

        let count_sql = format!("SELECT COUNT(*) FROM {}{where_sql};", mapping.table);
        let total: i64 = self
            .conn
            .query_row(&count_sql, params_from_iter(values.iter()), |row| row.get(0))?;
        let total = u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))?;

        let (order_column, direction) = Self::order_by(params)?;
        let select_sql = format!(
            "SELECT {} FROM {}{where_sql} ORDER BY {order_column} {}, rowid ASC LIMIT ? OFFSET ?;",
            mapping.select_list(),
            mapping.table,
            direction.as_sql()
        );
        values.push(Value::Integer(i64::from(params.per_page())));
        values.push(Value::Integer(
            i64::try_from(params.offset()).unwrap_or(i64::MAX),
        ));

        let items = match self.query_records(&select_sql, &values) {
            Ok(items) => items,
            Err(err) => {
                error!(
                    "event=repo_search module=repo backend=sqlite entity={} status=error duration_ms={} error={}",
                    E::ENTITY_NAME,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        debug!(
            "event=repo_search module=repo backend=sqlite entity={} status=ok page={} per_page={} total={} returned={} duration_ms={}",
            E::ENTITY_NAME,
            params.page(),
            params.per_page(),
            total,
            items.len(),
            started_at.elapsed().as_millis()
        );

        Ok(SearchResult::new(
            items,
            total,
            params.page(),
            params.per_page(),
        ))
    }
}
