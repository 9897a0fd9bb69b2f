//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;
use wheel_core::engine::MAX_POOL_SIZE;
use wheel_core::Element;

/// Numbers a quick pick may select, at most.
pub const QUICK_PICK_LIMIT: usize = 10;

/// Highest number on the board quick picks draw from.
pub const BOARD_MAX: Element = 90;

/// wheel: generate lotto wheels that guarantee every m-number combination
#[derive(Parser, Debug)]
#[command(name = "wheel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (optional; defaults apply when missing)
    #[arg(long, env = "WHEEL_CONFIG", default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Database file for the saved selection (overrides [database] path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a wheel for a pool of numbers
    Solve(SolveArgs),

    /// Show the saved selection and its last tickets
    Show,

    /// Show (and optionally change) stakes and the cost of the saved tickets
    Cost(CostArgs),

    /// Re-check the coverage of the saved tickets
    Audit,

    /// Delete the saved selection
    Clear,
}

/// Arguments for `wheel solve`
#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Pool numbers, comma separated (e.g. 3,17,22,41)
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "range")]
    pub numbers: Option<Vec<Element>>,

    /// Pool as an inclusive range (e.g. 1-10)
    #[arg(long, value_parser = parse_range, conflicts_with = "pick")]
    pub range: Option<(Element, Element)>,

    /// Quick pick from the 1-90 board, applied in order, up to 10 numbers
    #[arg(long, value_enum, value_delimiter = ',', conflicts_with = "numbers")]
    pub pick: Vec<QuickPick>,

    /// Numbers per ticket (default: saved value, else 4)
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Guaranteed numbers (default: saved value, else 2)
    #[arg(short, long)]
    pub m: Option<usize>,

    /// Do not save the selection and tickets
    #[arg(long)]
    pub no_save: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `wheel cost`
#[derive(Args, Debug)]
pub struct CostArgs {
    /// Stake per single number
    #[arg(long)]
    pub single: Option<f64>,

    /// Stake per pair
    #[arg(long)]
    pub pair: Option<f64>,

    /// Stake per triple
    #[arg(long)]
    pub triple: Option<f64>,

    /// Stake per quad
    #[arg(long)]
    pub quad: Option<f64>,
}

/// Board filters for a quick pick.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickPick {
    /// Even numbers
    Even,
    /// Odd numbers
    Odd,
    /// 1-45
    Low,
    /// 46-90
    High,
}

impl QuickPick {
    fn matches(self, number: Element) -> bool {
        match self {
            QuickPick::Even => number % 2 == 0,
            QuickPick::Odd => number % 2 == 1,
            QuickPick::Low => number <= BOARD_MAX / 2,
            QuickPick::High => number > BOARD_MAX / 2,
        }
    }
}

/// Fill a pool from the board, filter by filter, in ascending order until
/// [`QUICK_PICK_LIMIT`] numbers are chosen.
pub fn quick_pick(picks: &[QuickPick]) -> Vec<Element> {
    let mut chosen = BTreeSet::new();
    for pick in picks {
        for number in (1..=BOARD_MAX).filter(|&n| pick.matches(n)) {
            if chosen.len() >= QUICK_PICK_LIMIT {
                break;
            }
            chosen.insert(number);
        }
    }
    chosen.into_iter().collect()
}

impl CostArgs {
    pub fn has_changes(&self) -> bool {
        self.single.is_some() || self.pair.is_some() || self.triple.is_some() || self.quad.is_some()
    }
}

impl SolveArgs {
    /// Pool given on the command line, if any.
    pub fn pool(&self) -> Option<Vec<Element>> {
        if let Some(numbers) = &self.numbers {
            return Some(numbers.clone());
        }
        if let Some((start, end)) = self.range {
            return Some((start..=end).collect());
        }
        if !self.pick.is_empty() {
            return Some(quick_pick(&self.pick));
        }
        None
    }
}

/// Parse `start-end` into an inclusive range.
pub fn parse_range(s: &str) -> Result<(Element, Element), String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{}'", s))?;
    let start: Element = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid range start '{}'", start))?;
    let end: Element = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid range end '{}'", end))?;
    if start > end {
        return Err(format!("range start {} is after end {}", start, end));
    }
    if i128::from(end) - i128::from(start) >= MAX_POOL_SIZE as i128 {
        return Err(format!("range {start}-{end} holds more than {MAX_POOL_SIZE} numbers"));
    }
    Ok((start, end))
}
