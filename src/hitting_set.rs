use std::convert::Infallible;

use itertools::Itertools;
use log::{debug, trace};

use crate::schema::RelationSchema;
use crate::vertical::Vertical;
use crate::vertical_index::VerticalIndex;

/// Knobs of the [`HittingSetSolver`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Reject every candidate with more columns than this, on top of the caller's predicate.
    pub max_arity: Option<usize>,
}

impl SolverConfig {
    pub fn max_arity(mut self, max_arity: usize) -> SolverConfig {
        self.max_arity = Some(max_arity);
        self
    }
}

/// Counters collected during one solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Targets handed in.
    pub targets: usize,
    /// Targets kept after consolidation.
    pub consolidated: usize,
    /// Targets skipped because a kept target is a subset of them.
    pub skipped: usize,
    /// Family members removed because they missed a target.
    pub invalidated: usize,
    /// Corrected members admitted to the family.
    pub admitted: usize,
    /// Corrected members dropped by the rejection rule.
    pub rejected: usize,
    /// Corrected members dropped because a subset is already in the family.
    pub dominated: usize,
}

/// Computes the family of minimal hitting sets (transversals) of a collection of
/// verticals of one schema.
///
/// The solver is incremental in the style of [Berge's algorithm]: it starts from the
/// family `{∅}` and, for each target, replaces every member that misses the target by
/// its one-column extensions into the target, keeping only extensions that no current
/// member is a subset of. Two [`VerticalIndex`]es carry the work, one de-duplicating the
/// targets and one holding the growing family.
///
/// # Rejection
/// An optional predicate can reject candidate extensions. A member whose extensions are
/// all rejected is dropped without replacement, so under pruning the result may miss
/// some targets. That is the point of pruning (bounding the search); callers that need
/// every target hit must not reject too much.
///
/// [Berge's algorithm]: https://doi.org/10.1016/S0167-5060(08)70325-3
pub struct HittingSetSolver<'s> {
    schema: &'s RelationSchema,
    config: SolverConfig,
}

impl<'s> HittingSetSolver<'s> {
    pub fn new(schema: &'s RelationSchema) -> HittingSetSolver<'s> {
        HittingSetSolver { schema, config: SolverConfig::default() }
    }

    pub fn with_config(mut self, config: SolverConfig) -> HittingSetSolver<'s> {
        self.config = config;
        self
    }

    /// Returns the minimal hitting sets of `targets` that survive `reject`, sorted by
    /// arity and then by column indices.
    ///
    /// Without targets the result is the empty vertical alone. An empty target can not
    /// be hit, so it empties the family. Panics if a target belongs to another schema.
    pub fn solve(
        &self,
        targets: impl IntoIterator<Item = Vertical>,
        reject: Option<&mut dyn FnMut(&Vertical) -> bool>,
    ) -> Vec<Vertical> {
        self.solve_with_stats(targets, reject).0
    }

    pub fn solve_with_stats(
        &self,
        targets: impl IntoIterator<Item = Vertical>,
        reject: Option<&mut dyn FnMut(&Vertical) -> bool>,
    ) -> (Vec<Vertical>, SolverStats) {
        let result = match reject {
            Some(reject) => self.run(targets, &mut |v: &Vertical| Ok::<_, Infallible>(reject(v))),
            None => self.run(targets, &mut |_: &Vertical| Ok::<_, Infallible>(false)),
        };
        match result {
            Ok(solution) => solution,
            Err(never) => match never {},
        }
    }

    /// Like [`HittingSetSolver::solve`], with a predicate that may fail. The first error
    /// aborts the solve and is returned; the partial family is discarded.
    pub fn try_solve<E>(
        &self,
        targets: impl IntoIterator<Item = Vertical>,
        mut reject: impl FnMut(&Vertical) -> Result<bool, E>,
    ) -> Result<Vec<Vertical>, E> {
        self.run(targets, &mut reject).map(|(family, _)| family)
    }

    fn run<E>(
        &self,
        targets: impl IntoIterator<Item = Vertical>,
        reject: &mut dyn FnMut(&Vertical) -> Result<bool, E>,
    ) -> Result<(Vec<Vertical>, SolverStats), E> {
        let mut stats = SolverStats::default();

        // Larger targets first; the sort is stable, so equal arities keep the caller's order.
        let targets = targets.into_iter()
            .inspect(|t| self.schema.check_owns(t))
            .sorted_by(|a, b| b.arity().cmp(&a.arity()))
            .collect_vec();
        stats.targets = targets.len();
        debug!("hitting set over {} targets, {} columns", targets.len(), self.schema.num_columns());

        let mut consolidated: VerticalIndex<()> = VerticalIndex::new(self.schema);
        let mut family: VerticalIndex<()> = VerticalIndex::new(self.schema);
        family.put(self.schema.empty_vertical().clone(), ());

        for target in targets {
            // Hitting a kept subset of the target already hits the target.
            if consolidated.contains_subset_of(&target) {
                stats.skipped += 1;
                continue;
            }
            consolidated.put(target.clone(), ());

            // Members disjoint from the target miss it.
            let mut invalid = family.subset_keys(&target.invert());
            invalid.sort();
            trace!("target {} invalidates {} of {} members", target, invalid.len(), family.len());
            stats.invalidated += invalid.len();
            for member in &invalid {
                family.remove(member);
            }

            // Smaller members go first, so their extensions block non-minimal larger ones.
            for member in &invalid {
                for column in target.column_indices() {
                    let candidate = member.union(column);
                    if family.contains_subset_of(&candidate) {
                        stats.dominated += 1;
                        continue;
                    }
                    if self.exceeds_arity(&candidate) || reject(&candidate)? {
                        stats.rejected += 1;
                        continue;
                    }
                    family.put(candidate, ());
                    stats.admitted += 1;
                }
            }
        }
        stats.consolidated = consolidated.len();

        let mut result = family.into_keys().collect_vec();
        result.sort();
        debug!("hitting set done: {} members, {:?}", result.len(), stats);
        Ok((result, stats))
    }

    fn exceeds_arity(&self, candidate: &Vertical) -> bool {
        self.config.max_arity.is_some_and(|max| candidate.arity() > max)
    }
}

/// Computes the minimal hitting sets of `targets`, see [`HittingSetSolver::solve`].
pub fn hitting_set(
    schema: &RelationSchema,
    targets: impl IntoIterator<Item = Vertical>,
    reject: Option<&mut dyn FnMut(&Vertical) -> bool>,
) -> Vec<Vertical> {
    HittingSetSolver::new(schema).solve(targets, reject)
}
