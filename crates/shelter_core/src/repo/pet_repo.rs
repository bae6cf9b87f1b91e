//! Pet repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide validated CRUD APIs over the `pets` table.
//! - Translate typed filters, projections and sort orders into bound SQL.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths validate `PetFields` before any SQL mutation.
//! - No caller-provided SQL text reaches the database; every value is bound.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Filters that match nothing yield empty results or zero counts, never errors.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::pet::{Gender, Pet, PetFields, PetId, PetValidationError};
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PETS_TABLE: &str = "pets";
const DEFAULT_WEIGHT: i64 = 0;
/// SQL function lowering text with Unicode case rules; `NULL` stays `NULL`.
const FOLD_FUNCTION: &str = "pet_fold";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pet persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PetValidationError),
    Db(DbError),
    NotFound(PetId),
    /// Operation is not defined for the addressed target (e.g. insert on an item).
    UnsupportedOperation {
        operation: &'static str,
        target: String,
    },
    /// Target path did not match any known target shape.
    UnsupportedTarget(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "pet not found: {id}"),
            Self::UnsupportedOperation { operation, target } => {
                write!(f, "{operation} is not supported for {target}")
            }
            Self::UnsupportedTarget(target) => write!(f, "unknown pet target `{target}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PetValidationError> for RepoError {
    fn from(value: PetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Column of the `pets` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetColumn {
    Id,
    Name,
    Breed,
    Gender,
    Weight,
}

impl PetColumn {
    pub const ALL: [PetColumn; 5] = [
        PetColumn::Id,
        PetColumn::Name,
        PetColumn::Breed,
        PetColumn::Gender,
        PetColumn::Weight,
    ];

    /// Physical SQL column name.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Name => "name",
            Self::Breed => "breed",
            Self::Gender => "gender",
            Self::Weight => "weight",
        }
    }

    /// Parses a column name; `id` is accepted as an alias of `_id`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "_id" | "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "breed" => Some(Self::Breed),
            "gender" => Some(Self::Gender),
            "weight" => Some(Self::Weight),
            _ => None,
        }
    }
}

/// Ordered, de-duplicated set of columns returned by a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<PetColumn>,
}

impl Projection {
    /// Every column in schema order.
    pub fn all() -> Self {
        Self {
            columns: PetColumn::ALL.to_vec(),
        }
    }

    /// Projects the given columns; an empty slice means all columns.
    pub fn of(columns: &[PetColumn]) -> Self {
        if columns.is_empty() {
            return Self::all();
        }
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(column) {
                unique.push(*column);
            }
        }
        Self { columns: unique }
    }

    pub fn columns(&self) -> &[PetColumn] {
        &self.columns
    }

    pub fn contains(&self, column: PetColumn) -> bool {
        self.columns.contains(&column)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort keys applied in order. Defaults to `_id ASC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    keys: Vec<(PetColumn, Direction)>,
}

impl SortOrder {
    pub fn by(column: PetColumn, direction: Direction) -> Self {
        Self {
            keys: vec![(column, direction)],
        }
    }

    pub fn then(mut self, column: PetColumn, direction: Direction) -> Self {
        self.keys.push((column, direction));
        self
    }

    pub fn keys(&self) -> &[(PetColumn, Direction)] {
        &self.keys
    }

    /// Parses `name desc, _id` style input.
    ///
    /// Returns `None` on unknown columns or directions.
    pub fn parse(value: &str) -> Option<Self> {
        let mut keys = Vec::new();
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mut tokens = part.split_whitespace();
            let column = PetColumn::parse(tokens.next()?)?;
            let direction = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => Direction::Asc,
                Some("desc") => Direction::Desc,
                Some(_) => return None,
            };
            if tokens.next().is_some() {
                return None;
            }
            keys.push((column, direction));
        }
        if keys.is_empty() {
            return None;
        }
        Some(Self { keys })
    }

    fn to_sql(&self) -> String {
        let keys = self
            .keys
            .iter()
            .map(|(column, direction)| format!("{} {}", column.column_name(), direction.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        // Id tiebreak keeps ordering deterministic for equal keys.
        if self.keys.iter().any(|(column, _)| *column == PetColumn::Id) {
            keys
        } else {
            format!("{keys}, _id ASC")
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::by(PetColumn::Id, Direction::Asc)
    }
}

/// Conjunction of optional row predicates. The default matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    pub id: Option<PetId>,
    /// Exact name match.
    pub name: Option<String>,
    /// Substring match on name, case-insensitive under Unicode lowercasing.
    pub name_contains: Option<String>,
    /// Exact breed match; `Some(None)` matches rows with NULL breed.
    pub breed: Option<Option<String>>,
    pub gender: Option<Gender>,
    pub min_weight: Option<i64>,
    pub max_weight: Option<i64>,
}

impl PetFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: PetId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    fn where_sql(&self, bind_values: &mut Vec<Value>) -> String {
        let mut clauses: Vec<&'static str> = Vec::new();

        if let Some(id) = self.id {
            clauses.push("_id = ?");
            bind_values.push(Value::Integer(id));
        }
        if let Some(name) = self.name.as_ref() {
            clauses.push("name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(fragment) = self.name_contains.as_ref() {
            clauses.push("instr(pet_fold(name), ?) > 0");
            bind_values.push(Value::Text(fragment.to_lowercase()));
        }
        match self.breed.as_ref() {
            Some(Some(breed)) => {
                clauses.push("breed = ?");
                bind_values.push(Value::Text(breed.clone()));
            }
            Some(None) => clauses.push("breed IS NULL"),
            None => {}
        }
        if let Some(gender) = self.gender {
            clauses.push("gender = ?");
            bind_values.push(Value::Integer(gender.code()));
        }
        if let Some(min) = self.min_weight {
            clauses.push("weight >= ?");
            bind_values.push(Value::Integer(min));
        }
        if let Some(max) = self.max_weight {
            clauses.push("weight <= ?");
            bind_values.push(Value::Integer(max));
        }

        if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        }
    }
}

/// One projected row. Columns outside the projection are `None`.
///
/// `breed` is also `None` for a projected NULL breed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PetRow {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<PetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl PetRow {
    /// Converts to a full `Pet` when id, name, gender and weight were projected.
    pub fn into_pet(self) -> Option<Pet> {
        Some(Pet {
            id: self.id?,
            name: self.name?,
            breed: self.breed,
            gender: self.gender?,
            weight: self.weight?,
        })
    }
}

/// Lazy, restartable read plan.
///
/// Nothing is executed until the cursor is iterated. Every iteration
/// re-runs the statement, so it observes writes made after the cursor
/// was created.
pub struct PetCursor<'conn> {
    conn: &'conn Connection,
    sql: String,
    bind_values: Vec<Value>,
    columns: Vec<PetColumn>,
}

impl PetCursor<'_> {
    /// Streams each row through `visit` without buffering the result set.
    pub fn try_for_each<F>(&self, mut visit: F) -> RepoResult<()>
    where
        F: FnMut(PetRow) -> RepoResult<()>,
    {
        let mut stmt = self.conn.prepare_cached(&self.sql)?;
        let mut rows = stmt.query(params_from_iter(self.bind_values.iter()))?;
        while let Some(row) = rows.next()? {
            visit(parse_pet_row(row, &self.columns)?)?;
        }
        Ok(())
    }

    /// Runs the plan and collects every row.
    pub fn rows(&self) -> RepoResult<Vec<PetRow>> {
        let mut out = Vec::new();
        self.try_for_each(|row| {
            out.push(row);
            Ok(())
        })?;
        Ok(out)
    }

    /// Runs the plan and returns the first row, if any.
    pub fn first(&self) -> RepoResult<Option<PetRow>> {
        let mut stmt = self.conn.prepare_cached(&self.sql)?;
        let mut rows = stmt.query(params_from_iter(self.bind_values.iter()))?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_pet_row(row, &self.columns)?)),
            None => Ok(None),
        }
    }

}

/// Repository interface for pet CRUD operations.
pub trait PetRepository {
    /// Validates and inserts one pet, returning its assigned id.
    fn insert_pet(&self, fields: &PetFields) -> RepoResult<PetId>;

    /// Builds a lazy read over rows matching `filter`.
    fn query_pets(
        &self,
        filter: &PetFilter,
        projection: &Projection,
        order: &SortOrder,
    ) -> RepoResult<PetCursor<'_>>;

    /// Validates present fields and applies them to every matching row.
    ///
    /// Returns the number of rows changed; an empty field set writes nothing
    /// and returns 0.
    fn update_pets(&self, filter: &PetFilter, fields: &PetFields) -> RepoResult<usize>;

    /// Removes every matching row and returns how many were removed.
    fn delete_pets(&self, filter: &PetFilter) -> RepoResult<usize>;

    /// Counts rows matching `filter`.
    fn count_pets(&self, filter: &PetFilter) -> RepoResult<usize>;

    fn lookup_by_id(&self, id: PetId) -> RepoResult<Option<Pet>> {
        let cursor = self.query_pets(
            &PetFilter::by_id(id),
            &Projection::all(),
            &SortOrder::default(),
        )?;
        match cursor.first()? {
            Some(row) => row
                .into_pet()
                .map(Some)
                .ok_or_else(|| RepoError::InvalidData(format!("incomplete row for pet {id}"))),
            None => Ok(None),
        }
    }

    /// Like `lookup_by_id` but surfaces absence as `RepoError::NotFound`.
    fn require_by_id(&self, id: PetId) -> RepoResult<Pet> {
        self.lookup_by_id(id)?.ok_or(RepoError::NotFound(id))
    }

    fn update_by_id(&self, id: PetId, fields: &PetFields) -> RepoResult<usize> {
        self.update_pets(&PetFilter::by_id(id), fields)
    }

    fn delete_by_id(&self, id: PetId) -> RepoResult<usize> {
        self.delete_pets(&PetFilter::by_id(id))
    }
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePetRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` is not current.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        ensure_pets_table(conn)?;
        register_fold_function(conn)?;
        Ok(Self { conn })
    }
}

impl PetRepository for SqlitePetRepository<'_> {
    fn insert_pet(&self, fields: &PetFields) -> RepoResult<PetId> {
        fields.validate_for_insert()?;

        self.conn.execute(
            "INSERT INTO pets (name, breed, gender, weight) VALUES (?1, ?2, ?3, ?4);",
            params![
                fields.name.as_deref(),
                fields.breed.clone().flatten(),
                fields.gender,
                fields.weight.unwrap_or(DEFAULT_WEIGHT),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        info!("event=pet_insert module=repo status=ok pet_id={id}");
        Ok(id)
    }

    fn query_pets(
        &self,
        filter: &PetFilter,
        projection: &Projection,
        order: &SortOrder,
    ) -> RepoResult<PetCursor<'_>> {
        let columns = projection.columns().to_vec();
        let select_list = columns
            .iter()
            .map(|column| column.column_name())
            .collect::<Vec<_>>()
            .join(", ");

        let mut bind_values = Vec::new();
        let where_sql = filter.where_sql(&mut bind_values);
        let sql = format!(
            "SELECT {select_list} FROM {PETS_TABLE}{where_sql} ORDER BY {};",
            order.to_sql()
        );

        Ok(PetCursor {
            conn: self.conn,
            sql,
            bind_values,
            columns,
        })
    }

    fn update_pets(&self, filter: &PetFilter, fields: &PetFields) -> RepoResult<usize> {
        fields.validate_for_update()?;

        if fields.is_empty() {
            return Ok(0);
        }

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = fields.name.as_ref() {
            assignments.push("name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(breed) = fields.breed.as_ref() {
            assignments.push("breed = ?");
            bind_values.push(match breed {
                Some(text) => Value::Text(text.clone()),
                None => Value::Null,
            });
        }
        if let Some(gender) = fields.gender {
            assignments.push("gender = ?");
            bind_values.push(Value::Integer(gender));
        }
        if let Some(weight) = fields.weight {
            assignments.push("weight = ?");
            bind_values.push(Value::Integer(weight));
        }

        let where_sql = filter.where_sql(&mut bind_values);
        let sql = format!(
            "UPDATE {PETS_TABLE} SET {}{where_sql};",
            assignments.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;

        debug!(
            "event=pet_update module=repo status=ok fields={} changed={changed}",
            fields.len()
        );
        Ok(changed)
    }

    fn delete_pets(&self, filter: &PetFilter) -> RepoResult<usize> {
        let mut bind_values = Vec::new();
        let where_sql = filter.where_sql(&mut bind_values);
        let sql = format!("DELETE FROM {PETS_TABLE}{where_sql};");
        let removed = self.conn.execute(&sql, params_from_iter(bind_values))?;

        info!(
            "event=pet_delete module=repo status=ok scope={} removed={removed}",
            if filter.is_unrestricted() { "all" } else { "filtered" }
        );
        Ok(removed)
    }

    fn count_pets(&self, filter: &PetFilter) -> RepoResult<usize> {
        let mut bind_values = Vec::new();
        let where_sql = filter.where_sql(&mut bind_values);
        let sql = format!("SELECT COUNT(*) FROM {PETS_TABLE}{where_sql};");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

fn ensure_pets_table(conn: &Connection) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [PETS_TABLE],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::MissingRequiredTable(PETS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([PETS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for column in PetColumn::ALL {
        let name = column.column_name();
        if !present.iter().any(|value| value == name) {
            return Err(RepoError::MissingRequiredColumn {
                table: PETS_TABLE,
                column: name,
            });
        }
    }
    Ok(())
}

fn parse_pet_row(row: &Row<'_>, columns: &[PetColumn]) -> RepoResult<PetRow> {
    let mut out = PetRow::default();
    for (index, column) in columns.iter().enumerate() {
        match column {
            PetColumn::Id => out.id = Some(row.get(index)?),
            PetColumn::Name => {
                let name: String = row.get(index)?;
                if name.trim().is_empty() {
                    return Err(RepoError::InvalidData(
                        "empty name in pets.name".to_string(),
                    ));
                }
                out.name = Some(name);
            }
            PetColumn::Breed => out.breed = row.get(index)?,
            PetColumn::Gender => {
                let code: i64 = row.get(index)?;
                let gender = Gender::from_code(code).ok_or_else(|| {
                    RepoError::InvalidData(format!("invalid gender code `{code}` in pets.gender"))
                })?;
                out.gender = Some(gender);
            }
            PetColumn::Weight => {
                let weight: i64 = row.get(index)?;
                if weight < 0 {
                    return Err(RepoError::InvalidData(format!(
                        "negative weight `{weight}` in pets.weight"
                    )));
                }
                out.weight = Some(weight);
            }
        }
    }
    Ok(out)
}

fn register_fold_function(conn: &Connection) -> RepoResult<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )?;
    Ok(())
}
