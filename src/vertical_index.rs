use crate::schema::{RelationSchema, SchemaId};
use crate::vertical::Vertical;

/// A map from [`Vertical`]s to values that answers subset and superset queries.
///
/// The entries live in a binary trie over column positions: the node at depth `d`
/// has decided membership for columns `0..d`, its `present` child takes column `d`
/// and its `absent` child skips it. A key is stored at the node where its last set
/// bit has been decided (the empty key sits at the root), so a node only carries a
/// value if some key ends there.
///
/// A subset query for `q` always follows `absent` but follows `present` only where
/// `q` has the bit. A superset query does the opposite and collects only nodes that
/// lie past `q`'s last column. Whole branches that disagree with the query are never
/// visited.
///
/// Every keyed operation panics if the key belongs to a different schema than the
/// index.
#[derive(Debug)]
pub struct VerticalIndex<V> {
    schema: SchemaId,
    root: Node<V>,
    len: usize,
}

#[derive(Debug)]
struct Node<V> {
    entry: Option<(Vertical, V)>,
    absent: Option<Box<Node<V>>>,
    present: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    fn new() -> Node<V> {
        Node { entry: None, absent: None, present: None }
    }

    fn is_vacant(&self) -> bool {
        self.entry.is_none() && self.absent.is_none() && self.present.is_none()
    }

    fn child(&self, key: &Vertical, depth: usize) -> Option<&Node<V>> {
        match key.contains(depth) {
            true => self.present.as_deref(),
            false => self.absent.as_deref(),
        }
    }

    fn other_child(&self, key: &Vertical, depth: usize) -> Option<&Node<V>> {
        match key.contains(depth) {
            true => self.absent.as_deref(),
            false => self.present.as_deref(),
        }
    }
}

// Tear the trie down with a heap stack; a chain of boxes per column would
// otherwise be dropped recursively.
impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        stack.extend(self.absent.take());
        stack.extend(self.present.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.absent.take());
            stack.extend(node.present.take());
        }
    }
}

// depth of the node that stores `key`
fn end_of(key: &Vertical) -> usize {
    key.last_column().map_or(0, |c| c + 1)
}

impl<V> VerticalIndex<V> {
    pub fn new(schema: &RelationSchema) -> VerticalIndex<V> {
        VerticalIndex { schema: schema.id(), root: Node::new(), len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts or overwrites the entry for `key`, returning the previous value.
    pub fn put(&mut self, key: Vertical, value: V) -> Option<V> {
        self.check(&key);
        let mut node = &mut self.root;
        for depth in 0..end_of(&key) {
            let slot = match key.contains(depth) {
                true => &mut node.present,
                false => &mut node.absent,
            };
            node = &mut **slot.get_or_insert_with(|| Box::new(Node::new()));
        }
        let old = node.entry.replace((key, value)).map(|(_, v)| v);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Removes the entry for `key` if there is one; nodes left empty are dropped.
    pub fn remove(&mut self, key: &Vertical) -> Option<V> {
        self.check(key);
        let removed = remove_at(&mut self.root, key, end_of(key));
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn get(&self, key: &Vertical) -> Option<&V> {
        self.check(key);
        let mut node = &self.root;
        for depth in 0..end_of(key) {
            node = node.child(key, depth)?;
        }
        node.entry.as_ref().map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Vertical) -> bool {
        self.get(key).is_some()
    }

    /// All entries whose key is a subset of `query` (including an equal key).
    pub fn subset_entries(&self, query: &Vertical) -> Vec<(&Vertical, &V)> {
        self.check(query);
        let mut out = Vec::new();
        collect_subsets(&self.root, query, &mut out);
        out
    }

    pub fn subset_keys(&self, query: &Vertical) -> Vec<Vertical> {
        self.subset_entries(query).into_iter().map(|(k, _)| k.clone()).collect()
    }

    /// Whether some key is a subset of `query`; stops at the first one found.
    pub fn contains_subset_of(&self, query: &Vertical) -> bool {
        self.check(query);
        any_subset(&self.root, query)
    }

    /// All entries whose key is a superset of `query` (including an equal key).
    pub fn superset_entries(&self, query: &Vertical) -> Vec<(&Vertical, &V)> {
        self.check(query);
        let mut out = Vec::new();
        collect_supersets(&self.root, query, end_of(query), &mut out);
        out
    }

    pub fn superset_keys(&self, query: &Vertical) -> Vec<Vertical> {
        self.superset_entries(query).into_iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn contains_superset_of(&self, query: &Vertical) -> bool {
        self.check(query);
        any_superset(&self.root, query, end_of(query))
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter { stack: vec![&self.root] }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Vertical> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn into_keys(self) -> impl Iterator<Item = Vertical> {
        self.into_iter().map(|(k, _)| k)
    }

    fn check(&self, key: &Vertical) {
        if key.schema_id() != self.schema {
            panic!(
                "{}",
                crate::error::SchemaError::SchemaMismatch { left: self.schema, right: key.schema_id() }
            );
        }
    }
}

// Takes the entry stored for `key`, then cuts off the branch that held only it.
fn remove_at<V>(root: &mut Node<V>, key: &Vertical, end: usize) -> Option<V> {
    let mut node = &mut *root;
    for depth in 0..end {
        node = match key.contains(depth) {
            true => node.present.as_deref_mut()?,
            false => node.absent.as_deref_mut()?,
        };
    }
    let removed = node.entry.take().map(|(_, v)| v);
    if removed.is_none() || !node.is_vacant() {
        return removed;
    }

    // Deepest node on the path that must stay: the root, or one with an entry or
    // a child off the path.
    let mut keep = 0;
    let mut node = &*root;
    for depth in 0..end {
        if depth > 0 && (node.entry.is_some() || node.other_child(key, depth).is_some()) {
            keep = depth;
        }
        node = match node.child(key, depth) {
            Some(child) => child,
            None => break,
        };
    }
    let mut node = &mut *root;
    for depth in 0..keep {
        node = match key.contains(depth) {
            true => node.present.as_deref_mut()?,
            false => node.absent.as_deref_mut()?,
        };
    }
    match key.contains(keep) {
        true => node.present = None,
        false => node.absent = None,
    }
    removed
}

fn collect_subsets<'a, V>(root: &'a Node<V>, query: &Vertical, out: &mut Vec<(&'a Vertical, &'a V)>) {
    let mut stack = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if let Some((k, v)) = &node.entry {
            out.push((k, v));
        }
        if let Some(child) = node.absent.as_deref() {
            stack.push((child, depth + 1));
        }
        if query.contains(depth) {
            if let Some(child) = node.present.as_deref() {
                stack.push((child, depth + 1));
            }
        }
    }
}

fn any_subset<V>(root: &Node<V>, query: &Vertical) -> bool {
    let mut stack = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if node.entry.is_some() {
            return true;
        }
        stack.extend(node.absent.as_deref().map(|c| (c, depth + 1)));
        if query.contains(depth) {
            stack.extend(node.present.as_deref().map(|c| (c, depth + 1)));
        }
    }
    false
}

// Entries above `end` still lack some of the query's columns.
fn collect_supersets<'a, V>(root: &'a Node<V>, query: &Vertical, end: usize, out: &mut Vec<(&'a Vertical, &'a V)>) {
    let mut stack = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth >= end {
            if let Some((k, v)) = &node.entry {
                out.push((k, v));
            }
        }
        if let Some(child) = node.present.as_deref() {
            stack.push((child, depth + 1));
        }
        if !query.contains(depth) {
            if let Some(child) = node.absent.as_deref() {
                stack.push((child, depth + 1));
            }
        }
    }
}

fn any_superset<V>(root: &Node<V>, query: &Vertical, end: usize) -> bool {
    let mut stack = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth >= end && node.entry.is_some() {
            return true;
        }
        stack.extend(node.present.as_deref().map(|c| (c, depth + 1)));
        if !query.contains(depth) {
            stack.extend(node.absent.as_deref().map(|c| (c, depth + 1)));
        }
    }
    false
}

/// Borrowing iterator over the entries of a [`VerticalIndex`], in trie order.
pub struct Iter<'a, V> {
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a Vertical, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.stack.pop()?;
            self.stack.extend(node.present.as_deref());
            self.stack.extend(node.absent.as_deref());
            if let Some((k, v)) = &node.entry {
                return Some((k, v));
            }
        }
    }
}

/// Owning iterator over the entries of a [`VerticalIndex`], in trie order.
pub struct IntoIter<V> {
    stack: Vec<Node<V>>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (Vertical, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut node = self.stack.pop()?;
            self.stack.extend(node.present.take().map(|b| *b));
            self.stack.extend(node.absent.take().map(|b| *b));
            if let Some(entry) = node.entry.take() {
                return Some(entry);
            }
        }
    }
}

impl<V> IntoIterator for VerticalIndex<V> {
    type Item = (Vertical, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        IntoIter { stack: vec![self.root] }
    }
}

impl<'a, V> IntoIterator for &'a VerticalIndex<V> {
    type Item = (&'a Vertical, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}
