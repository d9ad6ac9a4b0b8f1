use anyhow::{bail, Context, Result};
use clap::Parser;
use itertools::Itertools;
use transversal::{HittingSetSolver, RelationSchema, SetSystem, SolverConfig, Vertical};

/// Reads a set system from stdin and prints its minimal transversals, one per line.
#[derive(Parser)]
#[command(about = "Enumerate the minimal hitting sets of a set system given in `p hs` format on stdin.")]
struct Args {
    /// Drop every candidate with more columns than this.
    #[arg(long)]
    max_arity: Option<usize>,

    /// Drop every candidate containing this (1-based) column. Repeatable.
    #[arg(long = "exclude", value_name = "COLUMN")]
    exclude: Vec<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let system = SetSystem::from_stdin().context("c Failed to read the set system!")?;
    for line in transversals(&args, &system)? {
        println!("{}", line);
    }
    Ok(())
}

/// The minimal transversals of `system` under the limits in `args`, as lines of column names.
fn transversals(args: &Args, system: &SetSystem) -> Result<Vec<String>> {
    let schema = system.schema();
    let excluded = excluded_columns(schema, &args.exclude)?;

    let mut config = SolverConfig::default();
    if let Some(max) = args.max_arity {
        config = config.max_arity(max);
    }
    let solver = HittingSetSolver::new(schema).with_config(config);
    let mut touches_excluded = |v: &Vertical| v.intersects(&excluded);
    let reject: Option<&mut dyn FnMut(&Vertical) -> bool> = match excluded.is_empty() {
        true => None,
        false => Some(&mut touches_excluded),
    };

    let family = solver.solve(system.targets().iter().cloned(), reject);
    Ok(family.iter().map(|h| schema.column_names(h).iter().join(" ")).collect())
}

/// Converts 1-based `--exclude` columns to a vertical of `schema`.
fn excluded_columns(schema: &RelationSchema, columns: &[usize]) -> Result<Vertical> {
    let mut indices = Vec::with_capacity(columns.len());
    for &column in columns {
        match column.checked_sub(1) {
            Some(index) => indices.push(index),
            None => bail!("c Columns are 1-based, got --exclude 0"),
        }
    }
    schema.try_vertical(indices).context("c Invalid --exclude column")
}
