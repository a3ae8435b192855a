use std::{fs, path::PathBuf};

use clap::Parser;
use source_map::{Bias as BiasInner, Position, SourceMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Bias {
    GreatestLowerBound,
    LeastUpperBound,
}

impl From<Bias> for BiasInner {
    fn from(value: Bias) -> Self {
        match value {
            Bias::GreatestLowerBound => BiasInner::GreatestLowerBound,
            Bias::LeastUpperBound => BiasInner::LeastUpperBound,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "resolve")]
#[command(about = "Resolve a generated position through a source map", long_about = None)]
struct Args {
    /// Path to the source map (flat or indexed)
    map: PathBuf,

    /// Generated line, 0-based
    line: u32,

    /// Generated column, 0-based
    column: u32,

    /// Which neighboring mapping to prefer when the position has no exact entry
    #[arg(long, short, value_enum, default_value_t = Bias::GreatestLowerBound)]
    bias: Bias,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let bytes = fs::read(&args.map)?;
    let map = SourceMap::from_slice(&bytes)?;

    let position = Position::new(args.line, args.column);
    match map.original_position_for(position, args.bias.into()) {
        None => println!("({}, {}) has no mapping", args.line, args.column),
        Some(loc) => {
            let source = loc.source.as_deref().unwrap_or("<generated>");
            match (loc.line, loc.column) {
                (Some(line), Some(column)) => {
                    print!("{source}:{line}:{column}");
                }
                _ => print!("{source}"),
            }
            match loc.name {
                Some(name) => println!(" ({name})"),
                None => println!(),
            }
        }
    }

    Ok(())
}
