use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bit_set::BitSet;
use itertools::Itertools;

use crate::error::{Result, SchemaError};
use crate::schema::SchemaId;

/// An immutable subset of a schema's columns, stored as a bit vector.
///
/// Equality and hashing look at the owning schema's id and the bit pattern only, so a
/// freshly derived vertical (a union, a complement) compares equal to a stored one with
/// the same columns. Subset/superset tests between verticals of different schemas are a
/// contract violation and panic; use the `try_*` forms to get a [`SchemaError`] instead.
///
/// Verticals are obtained from a [`RelationSchema`](crate::RelationSchema).
#[derive(Clone)]
pub struct Vertical {
    schema: SchemaId,
    num_columns: usize,
    bits: BitSet,
}

impl Vertical {
    pub(crate) fn from_bits(schema: SchemaId, num_columns: usize, bits: BitSet) -> Vertical {
        debug_assert!(bits.iter().all(|i| i < num_columns));
        Vertical { schema, num_columns, bits }
    }

    fn derive(&self, bits: BitSet) -> Vertical {
        Vertical { schema: self.schema, num_columns: self.num_columns, bits }
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema
    }

    /// Column count of the owning schema (not of this vertical, see [`Vertical::arity`]).
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Number of member columns.
    pub fn arity(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn contains(&self, column: usize) -> bool {
        self.bits.contains(column)
    }

    /// Member column indices in ascending order.
    pub fn column_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter()
    }

    /// Highest member column, `None` for the empty vertical.
    pub fn last_column(&self) -> Option<usize> {
        self.bits.iter().last()
    }

    /// This vertical with `column` added. Panics if `column` is out of range.
    pub fn union(&self, column: usize) -> Vertical {
        if column >= self.num_columns {
            panic!("{}", SchemaError::ColumnOutOfRange { index: column, num_columns: self.num_columns });
        }
        let mut bits = self.bits.clone();
        bits.insert(column);
        self.derive(bits)
    }

    /// This vertical with `column` removed.
    pub fn without(&self, column: usize) -> Vertical {
        let mut bits = self.bits.clone();
        bits.remove(column);
        self.derive(bits)
    }

    pub fn union_with(&self, other: &Vertical) -> Vertical {
        self.check_schema(other);
        let mut bits = self.bits.clone();
        bits.union_with(&other.bits);
        self.derive(bits)
    }

    pub fn intersect(&self, other: &Vertical) -> Vertical {
        self.check_schema(other);
        let mut bits = self.bits.clone();
        bits.intersect_with(&other.bits);
        self.derive(bits)
    }

    /// The complement within the owning schema's columns.
    pub fn invert(&self) -> Vertical {
        let mut bits = BitSet::with_capacity(self.num_columns);
        (0..self.num_columns).filter(|i| !self.bits.contains(*i)).for_each(|i| { bits.insert(i); });
        self.derive(bits)
    }

    /// Whether the two verticals share at least one column.
    pub fn intersects(&self, other: &Vertical) -> bool {
        self.check_schema(other);
        !self.bits.is_disjoint(&other.bits)
    }

    pub fn try_is_subset_of(&self, other: &Vertical) -> Result<bool> {
        self.same_schema(other)?;
        Ok(self.bits.is_subset(&other.bits))
    }

    pub fn try_is_superset_of(&self, other: &Vertical) -> Result<bool> {
        self.same_schema(other)?;
        Ok(self.bits.is_superset(&other.bits))
    }

    pub fn is_subset_of(&self, other: &Vertical) -> bool {
        self.check_schema(other);
        self.bits.is_subset(&other.bits)
    }

    pub fn is_superset_of(&self, other: &Vertical) -> bool {
        self.check_schema(other);
        self.bits.is_superset(&other.bits)
    }

    fn same_schema(&self, other: &Vertical) -> Result<()> {
        if self.schema != other.schema {
            return Err(SchemaError::SchemaMismatch { left: self.schema, right: other.schema });
        }
        Ok(())
    }

    pub(crate) fn check_schema(&self, other: &Vertical) {
        if let Err(e) = self.same_schema(other) {
            panic!("{}", e);
        }
    }
}

// Compare and hash the set bits, never the block layout.
impl PartialEq for Vertical {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.bits.iter().eq(other.bits.iter())
    }
}

impl Eq for Vertical {}

impl Hash for Vertical {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.hash(state);
        for i in self.bits.iter() {
            i.hash(state);
        }
    }
}

/// Orders by schema, then arity, then the ascending column index lists.
impl Ord for Vertical {
    fn cmp(&self, other: &Self) -> Ordering {
        self.schema.cmp(&other.schema)
            .then_with(|| self.arity().cmp(&other.arity()))
            .then_with(|| self.bits.iter().cmp(other.bits.iter()))
    }
}

impl PartialOrd for Vertical {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.bits.iter().join(", "))
    }
}

impl fmt::Debug for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vertical({}, {})", self.schema, self)
    }
}

#[cfg(test)]
mod tests {
    use crate::RelationSchema;
    use crate::error::SchemaError;
    use std::collections::HashSet;

    fn schema(n: usize) -> RelationSchema {
        RelationSchema::with_columns("R", (0..n).map(|i| format!("c{}", i))).unwrap()
    }

    #[test]
    fn union_sets_one_more_bit() {
        let s = schema(4);
        let v = s.vertical([1]);
        let u = v.union(3);
        assert_eq!(u, s.vertical([1, 3]));
        assert_eq!(u.arity(), 2);
        assert_eq!(u.union(3), u);
        // the original value is untouched
        assert_eq!(v.arity(), 1);
    }

    #[test]
    fn invert_stays_within_schema() {
        let s = schema(5);
        assert_eq!(s.vertical([0, 2]).invert(), s.vertical([1, 3, 4]));
        assert_eq!(s.empty_vertical().invert(), s.full_vertical());
        assert!(s.full_vertical().invert().is_empty());
        assert_eq!(s.full_vertical().arity(), 5);
    }

    #[test]
    fn column_indices_ascend() {
        let s = schema(70);
        let v = s.vertical([65, 3, 40, 0]);
        assert_eq!(v.column_indices().collect::<Vec<_>>(), vec![0, 3, 40, 65]);
        assert_eq!(v.last_column(), Some(65));
        assert_eq!(s.empty_vertical().last_column(), None);
        assert_eq!(v.to_string(), "[0, 3, 40, 65]");
    }

    #[test]
    fn subset_and_superset() {
        let s = schema(4);
        let ab = s.vertical([0, 1]);
        let abc = s.vertical([0, 1, 2]);
        assert!(ab.is_subset_of(&abc));
        assert!(!abc.is_subset_of(&ab));
        assert!(abc.is_superset_of(&ab));
        assert!(ab.is_subset_of(&ab));
        assert!(s.empty_vertical().is_subset_of(&ab));
        assert!(ab.intersects(&abc));
        assert!(!ab.intersects(&s.vertical([3])));
        assert_eq!(abc.without(1), s.vertical([0, 2]));
        assert_eq!(ab.union_with(&s.vertical([3])), s.vertical([0, 1, 3]));
        assert_eq!(ab.intersect(&s.vertical([1, 2])), s.vertical([1]));
    }

    #[test]
    fn equality_ignores_how_a_vertical_was_built() {
        let s = schema(100);
        let built = s.vertical([7, 99]);
        let derived = s.column_vertical(7).union(99);
        let complement = s.vertical((0..100).filter(|i| *i != 7 && *i != 99)).invert();
        assert_eq!(built, derived);
        assert_eq!(built, complement);
        let set: HashSet<_> = [built, derived, complement].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordering_is_by_arity_then_columns() {
        let s = schema(4);
        let mut vs = vec![s.vertical([0, 2]), s.vertical([3]), s.vertical([0, 1]), s.vertical([1])];
        vs.sort();
        assert_eq!(vs, vec![s.vertical([1]), s.vertical([3]), s.vertical([0, 1]), s.vertical([0, 2])]);
    }

    #[test]
    fn mismatched_schemas_are_reported() {
        let r = schema(3);
        let s = schema(3);
        let err = r.vertical([0]).try_is_subset_of(&s.vertical([0, 1])).unwrap_err();
        assert_eq!(err, SchemaError::SchemaMismatch { left: r.id(), right: s.id() });
        assert!(r.vertical([0]).try_is_superset_of(&s.vertical([0])).is_err());
        assert_ne!(r.vertical([0]), s.vertical([0]));
    }

    #[test]
    #[should_panic(expected = "different schemas")]
    fn subset_test_across_schemas_panics() {
        schema(3).vertical([0]).is_subset_of(&schema(3).vertical([0]));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn union_out_of_range_panics() {
        schema(3).vertical([0]).union(3);
    }
}
