use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use bit_set::BitSet;

use crate::error::{Result, SchemaError};
use crate::hitting_set::HittingSetSolver;
use crate::vertical::Vertical;

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a schema. Two schemas with the same name and
/// columns still get different ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u64);

impl SchemaId {
    fn next() -> SchemaId {
        SchemaId(NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema#{}", self.0)
    }
}

/// A column of a relation. Identity is (schema, index); the name is only for lookup.
#[derive(Clone, Debug)]
pub struct Column {
    schema: SchemaId,
    name: String,
    index: usize,
}

impl Column {
    pub fn schema_id(&self) -> SchemaId {
        self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.index == other.index
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.hash(state);
        self.index.hash(state);
    }
}

/// Collects columns in append order and freezes them into a [`RelationSchema`].
pub struct SchemaBuilder {
    name: String,
    null_equals_null: bool,
    columns: Vec<String>,
    seen: HashSet<String>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder { name: name.into(), null_equals_null: true, columns: Vec::new(), seen: HashSet::new() }
    }

    pub fn null_equals_null(mut self, value: bool) -> SchemaBuilder {
        self.null_equals_null = value;
        self
    }

    /// Appends a column; its index is the number of columns appended before it.
    pub fn append_column(mut self, name: impl Into<String>) -> Result<SchemaBuilder> {
        let name = name.into();
        if !self.seen.insert(name.clone()) {
            return Err(SchemaError::DuplicateColumn(name));
        }
        self.columns.push(name);
        Ok(self)
    }

    pub fn build(self) -> RelationSchema {
        let id = SchemaId::next();
        let n = self.columns.len();
        let columns = self.columns.into_iter().enumerate()
            .map(|(index, name)| Column { schema: id, name, index })
            .collect::<Vec<_>>();
        let singletons = (0..n).map(|_| OnceLock::new()).collect();
        RelationSchema {
            id,
            name: self.name,
            columns,
            null_equals_null: self.null_equals_null,
            empty: Vertical::from_bits(id, n, BitSet::new()),
            singletons,
        }
    }
}

/// The schema of a relational table: an immutable, ordered list of columns.
///
/// The schema owns the canonical empty vertical and caches one canonical vertical per
/// column, built on first use; every other vertical is a fresh value bound to this
/// schema's id.
#[derive(Debug)]
pub struct RelationSchema {
    id: SchemaId,
    name: String,
    columns: Vec<Column>,
    null_equals_null: bool,
    empty: Vertical,
    singletons: Vec<OnceLock<Vertical>>,
}

impl RelationSchema {
    /// Shorthand for building a schema from a list of column names.
    pub fn with_columns<I, S>(name: impl Into<String>, columns: I) -> Result<RelationSchema>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = SchemaBuilder::new(name);
        for column in columns {
            builder = builder.append_column(column)?;
        }
        Ok(builder.build())
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_null_equal_null(&self) -> bool {
        self.null_equals_null
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn empty_vertical(&self) -> &Vertical {
        &self.empty
    }

    /// The canonical single-column vertical. Panics if `index` is out of range.
    pub fn column_vertical(&self, index: usize) -> &Vertical {
        match self.singletons.get(index) {
            Some(cell) => cell.get_or_init(|| {
                let mut bits = BitSet::new();
                bits.insert(index);
                Vertical::from_bits(self.id, self.num_columns(), bits)
            }),
            None => panic!("{}", self.out_of_range(index)),
        }
    }

    pub fn full_vertical(&self) -> Vertical {
        self.empty.invert()
    }

    /// Builds the vertical over the given column indices (duplicates are fine).
    pub fn try_vertical(&self, indices: impl IntoIterator<Item = usize>) -> Result<Vertical> {
        let n = self.num_columns();
        let mut bits = BitSet::with_capacity(n);
        for i in indices {
            if i >= n {
                return Err(self.out_of_range(i));
            }
            bits.insert(i);
        }
        let first = bits.iter().next();
        Ok(match (bits.len(), first) {
            (0, _) => self.empty.clone(),
            (1, Some(i)) => self.singletons[i].get_or_init(|| Vertical::from_bits(self.id, n, bits)).clone(),
            _ => Vertical::from_bits(self.id, n, bits),
        })
    }

    /// Like [`RelationSchema::try_vertical`], but an out-of-range index is a bug and panics.
    pub fn vertical(&self, indices: impl IntoIterator<Item = usize>) -> Vertical {
        match self.try_vertical(indices) {
            Ok(v) => v,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn vertical_by_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Vertical> {
        let mut indices = Vec::new();
        for name in names {
            match self.column_by_name(name) {
                Some(c) => indices.push(c.index),
                None => return Err(SchemaError::UnknownColumn(name.to_string())),
            }
        }
        self.try_vertical(indices)
    }

    /// Names of the columns in `vertical`, in index order.
    pub fn column_names(&self, vertical: &Vertical) -> Vec<&str> {
        self.check_owns(vertical);
        vertical.column_indices().map(|i| self.columns[i].name.as_str()).collect()
    }

    /// Minimal hitting sets of `targets`, see [`HittingSetSolver::solve`].
    pub fn calculate_hitting_set(
        &self,
        targets: impl IntoIterator<Item = Vertical>,
        reject: Option<&mut dyn FnMut(&Vertical) -> bool>,
    ) -> Vec<Vertical> {
        HittingSetSolver::new(self).solve(targets, reject)
    }

    pub(crate) fn check_owns(&self, vertical: &Vertical) {
        if vertical.schema_id() != self.id {
            panic!("{}", SchemaError::SchemaMismatch { left: self.id, right: vertical.schema_id() });
        }
    }

    fn out_of_range(&self, index: usize) -> SchemaError {
        SchemaError::ColumnOutOfRange { index, num_columns: self.num_columns() }
    }
}
