mod cli;
mod json;

use crate::cli::{Args, Bindings, Command, LogFormat, Mode};
use anyhow::{Context, ensure};
use clap::Parser;
use oxrdf::{NamedNode, Term};
use oxshape::{Accept, Shape, guard};
use serde_json::Value as Json;
use shapeopt::{Inferencer, Optimizer, Outliner, Pruner, Redactor};
use std::fs::File;
use std::io::{self, BufReader, Write, stdin, stdout};
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);
    match args.command {
        Command::Validate {
            shape,
            data,
            bindings,
        } => {
            let shape = redact(&read_shape(&shape)?, &bindings);
            let data = match data {
                Some(path) => read_json(&path)?,
                None => serde_json::from_reader(stdin().lock())
                    .context("Failed to parse the data from stdin")?,
            };
            let data = json::parse_value(&data, &shape)?;
            let report = shapeval::validate(&shape, &data)?;
            let mut stdout = stdout().lock();
            write!(stdout, "{report}")?;
            stdout.flush()?;
            ensure!(
                report.conforms(),
                "The data does not conform to the shape: {} violation(s)",
                report.violation_count()
            );
        }
        Command::Compile { shape, query } => {
            let query = shapeq::compile(&query, &read_shape(&shape)?)?;
            writeln!(stdout().lock(), "{query}")?;
        }
        Command::Redact { shape, bindings } => {
            write_shape(&redact(&read_shape(&shape)?, &bindings))?;
        }
        Command::Prune { shape, mode } => {
            let pruner = match mode {
                Mode::Convey => Pruner::convey(),
                Mode::Filter => Pruner::filter(),
            };
            write_shape(&Optimizer::optimize(pruner.prune(&read_shape(&shape)?)))?;
        }
        Command::Outline { shape, focus } => {
            let focus = focus
                .iter()
                .map(|iri| {
                    NamedNode::new(iri.as_str())
                        .map(Term::from)
                        .with_context(|| format!("Invalid focus IRI <{iri}>"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let graph = Outliner::new(focus).outline(&read_shape(&shape)?);
            let mut stdout = stdout().lock();
            for triple in &graph {
                writeln!(stdout, "{triple} .")?;
            }
            stdout.flush()?;
        }
        Command::Optimize { shape } => {
            write_shape(&Optimizer::optimize(read_shape(&shape)?))?;
        }
        Command::Expand { shape } => {
            write_shape(&Optimizer::optimize(Inferencer::expand(&read_shape(&shape)?)))?;
        }
    }
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Json> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_shape(path: &Path) -> anyhow::Result<Shape> {
    let shape = json::parse_shape(&read_json(path)?)
        .with_context(|| format!("Invalid shape in {}", path.display()))?;
    debug!(path = %path.display(), %shape, "loaded shape");
    Ok(shape)
}

fn write_shape(shape: &Shape) -> anyhow::Result<()> {
    let mut stdout = stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &json::shape_to_json(shape))?;
    writeln!(stdout)?;
    Ok(())
}

/// Redacts the guards on the bound axes, in the role, task, area, mode, view order.
fn redact(shape: &Shape, bindings: &Bindings) -> Shape {
    let axes = [
        (guard::ROLE, &bindings.role),
        (guard::TASK, &bindings.task),
        (guard::AREA, &bindings.area),
        (guard::MODE, &bindings.mode),
        (guard::VIEW, &bindings.view),
    ];
    Redactor::throttle(
        shape,
        axes.into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(axis, values)| (axis, accept(values))),
    )
}

fn accept(values: &[String]) -> Accept {
    if values.iter().any(|value| value == "*") {
        Accept::Any
    } else {
        Accept::values(values)
    }
}
