mod reports;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use candyplan_core::constants::{
    LV_MAX, LV_MIN, MAX_BOOST_COUNT, MAX_CANDY_OWNED, MAX_PROGRESS_EXP, QUICK_TARGETS,
};
use candyplan_core::{
    AsyncTableCache, BoostInput, CalcConfig, CalcError, EmbeddedTables, LevelPlan, Nature,
    PassiveInput, PlanInput, TableSource, TableStore, TextTables, Track, plan_with_tables,
};

/// Exit status for rejected inputs.
const INPUT_ERROR_EXIT: i32 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TrackArg {
    /// Ordinary growth
    Normal,
    /// Pseudo-legendary growth (x1.5)
    #[value(name = "600")]
    PseudoLegendary,
    /// Semi-legendary growth (x1.8)
    Semi,
    /// Legendary growth (x2.2)
    Legend,
}

impl From<TrackArg> for Track {
    fn from(arg: TrackArg) -> Self {
        match arg {
            TrackArg::Normal => Self::Normal,
            TrackArg::PseudoLegendary => Self::PseudoLegendary,
            TrackArg::Semi => Self::SemiLegendary,
            TrackArg::Legend => Self::Legendary,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NatureArg {
    /// No experience modifier
    #[value(name = "none")]
    Neutral,
    /// Experience-up nature
    Up,
    /// Experience-down nature
    Down,
}

impl From<NatureArg> for Nature {
    fn from(arg: NatureArg) -> Self {
        match arg {
            NatureArg::Neutral => Self::Neutral,
            NatureArg::Up => Self::Up,
            NatureArg::Down => Self::Down,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "candyplan", version)]
#[command(about = "Plan the candies and shards needed to level a creature to a target level")]
struct Args {
    /// Current level
    #[arg(long, value_parser = clap::value_parser!(u32).range(i64::from(LV_MIN)..i64::from(LV_MAX)))]
    now: u32,

    /// Target level
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(i64::from(LV_MIN + 1)..=i64::from(LV_MAX)),
        required_unless_present = "quick"
    )]
    target: Option<u32>,

    /// Quick-pick target level (25, 30, 50 or 60)
    #[arg(long, value_parser = parse_quick_target, conflicts_with = "target")]
    quick: Option<u32>,

    /// Growth track
    #[arg(long, value_enum, default_value_t = TrackArg::Normal)]
    track: TrackArg,

    /// Nature modifier
    #[arg(long, value_enum, default_value_t = NatureArg::Neutral)]
    nature: NatureArg,

    /// Experience already earned toward the next level
    #[arg(long, default_value_t = 0)]
    #[arg(value_parser = clap::value_parser!(u64).range(0..=u64::from(MAX_PROGRESS_EXP)))]
    progress: u64,

    /// Candies already owned
    #[arg(long, default_value_t = 0)]
    #[arg(value_parser = clap::value_parser!(u64).range(0..=u64::from(MAX_CANDY_OWNED)))]
    owned: u64,

    /// Candies to spend under a full boost
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_BOOST_COUNT)))]
    boost: Option<u32>,

    /// Candies to spend under a mini boost
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_BOOST_COUNT)))]
    mini_boost: Option<u32>,

    /// Days of passive experience to credit
    #[arg(long, default_value_t = 0)]
    days: u32,

    /// Daily bonus tier for passive experience
    #[arg(long, default_value_t = 0)]
    bonus_tier: u32,

    /// Growth boosters stacked on top of passive days
    #[arg(long, default_value_t = 0)]
    growth_boosters: u32,

    /// Include the per-level breakdown
    #[arg(long)]
    breakdown: bool,

    /// JSON file overriding the calculation tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replacement level-requirement table
    #[arg(long)]
    exp_table: Option<PathBuf>,

    /// Replacement shard-cost table
    #[arg(long)]
    shard_table: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn target_level(&self) -> u32 {
        self.target.or(self.quick).unwrap_or(LV_MAX)
    }

    fn plan_input(&self) -> PlanInput {
        PlanInput {
            lv_now: self.now,
            lv_target: self.target_level(),
            track: self.track.into(),
            nature: self.nature.into(),
            progress_exp: self.progress,
            candy_owned: self.owned,
            boost: BoostInput {
                full: self.boost,
                mini: self.mini_boost,
            },
            passive: PassiveInput {
                days: self.days,
                daily_bonus_tier: self.bonus_tier,
                booster_count: self.growth_boosters,
            },
            breakdown: self.breakdown,
        }
    }
}

fn parse_quick_target(raw: &str) -> Result<u32, String> {
    let level: u32 = raw.parse().map_err(|_| format!("not a level: {raw}"))?;
    if QUICK_TARGETS.contains(&level) {
        Ok(level)
    } else {
        Err(format!("quick targets are {QUICK_TARGETS:?}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref()).await?;
    let input = args.plan_input();

    let cache = AsyncTableCache::new();
    let tables = cache
        .get_or_load(|| load_tables(args.exp_table.as_deref(), args.shard_table.as_deref(), config))
        .await
        .context("failed to load level tables")?;
    log::debug!(
        "planning Lv{}->Lv{} on {} track",
        input.lv_now,
        input.lv_target,
        input.track
    );

    let plan = match plan_with_tables(&tables, &input) {
        Ok(plan) => plan,
        Err(err @ CalcError::DataIntegrity { .. }) => {
            return Err(err).context("level tables do not cover the requested span");
        }
        Err(err) => reject_input(&err),
    };

    if args.report == "console" {
        announce_banner();
    }
    write_reports(&args, &input, &plan)
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn reject_input(err: &CalcError) -> ! {
    eprintln!("{} {err}", "❌ Input error:".red().bold());
    std::process::exit(INPUT_ERROR_EXIT);
}

fn announce_banner() {
    println!("{}", "🍬 Candy Level Planner".bright_cyan().bold());
    println!("{}", "======================".cyan());
}

async fn load_config(path: Option<&Path>) -> Result<CalcConfig> {
    let Some(path) = path else {
        return Ok(CalcConfig::default());
    };
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    CalcConfig::from_json(&json).with_context(|| format!("invalid config in {}", path.display()))
}

async fn load_tables(
    exp_path: Option<&Path>,
    shard_path: Option<&Path>,
    config: CalcConfig,
) -> Result<TableStore, CalcError> {
    if exp_path.is_none() && shard_path.is_none() {
        return TableStore::load(&EmbeddedTables, config);
    }
    let embedded = EmbeddedTables;
    let exp = match exp_path {
        Some(path) => read_table(path).await?,
        None => embedded_text(embedded.exp_table()),
    };
    let shard = match shard_path {
        Some(path) => read_table(path).await?,
        None => embedded_text(embedded.shard_table()),
    };
    TableStore::load(&TextTables::new(exp, shard), config)
}

async fn read_table(path: &Path) -> Result<String, CalcError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| CalcError::Source(format!("{}: {err}", path.display())))
}

fn embedded_text(text: Result<std::borrow::Cow<'_, str>, std::convert::Infallible>) -> String {
    match text {
        Ok(text) => text.into_owned(),
        Err(never) => match never {},
    }
}

fn write_reports(args: &Args, input: &PlanInput, plan: &LevelPlan) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, input, plan)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, input, plan)?,
        _ => reports::generate_console_report(&mut output_target, input, plan)?,
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("candyplan").chain(args.iter().copied()))
    }

    #[test]
    fn quick_target_fills_in_target_level() {
        let args = parse(&["--now", "10", "--quick", "30"]).unwrap();
        assert_eq!(args.plan_input().lv_target, 30);
        assert!(parse(&["--now", "10", "--quick", "40"]).is_err());
        assert!(parse(&["--now", "10", "--quick", "30", "--target", "31"]).is_err());
    }

    #[test]
    fn level_and_count_limits_are_enforced_by_the_parser() {
        assert!(parse(&["--now", "0", "--target", "5"]).is_err());
        assert!(parse(&["--now", "65", "--target", "65"]).is_err());
        assert!(parse(&["--now", "1", "--target", "66"]).is_err());
        assert!(parse(&["--now", "1", "--target", "5", "--progress", "10000"]).is_err());
        assert!(parse(&["--now", "1", "--target", "5", "--boost", "1000"]).is_err());
        assert!(parse(&["--now", "1"]).is_err());
    }

    #[test]
    fn flags_map_onto_plan_input() {
        let args = parse(&[
            "--now",
            "12",
            "--target",
            "40",
            "--track",
            "600",
            "--nature",
            "up",
            "--progress",
            "55",
            "--owned",
            "9",
            "--mini-boost",
            "7",
            "--days",
            "3",
            "--bonus-tier",
            "2",
            "--growth-boosters",
            "1",
        ])
        .unwrap();
        let input = args.plan_input();
        assert_eq!(input.track, Track::PseudoLegendary);
        assert_eq!(input.nature, Nature::Up);
        assert_eq!(input.progress_exp, 55);
        assert_eq!(input.candy_owned, 9);
        assert_eq!(input.boost, BoostInput { full: None, mini: Some(7) });
        assert_eq!(input.passive.daily_bonus_tier, 2);
        assert_eq!(input.passive.booster_count, 1);
    }

    #[tokio::test]
    async fn partial_table_override_keeps_embedded_shards() {
        let path = std::env::temp_dir().join(format!("candyplan-exp-{}", std::process::id()));
        std::fs::write(&path, "2 54\n3 71\n").unwrap();
        let store = load_tables(Some(&path), None, CalcConfig::default())
            .await
            .unwrap();
        assert_eq!(store.requirements().requirement(3, Track::Normal), Ok(71));
        assert_eq!(store.shards().shard_cost(65), 1_520);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn missing_table_file_is_a_source_error() {
        let err = load_tables(
            Some(Path::new("/nonexistent/candyplan/exp.txt")),
            None,
            CalcConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CalcError::Source(_)));
    }
}
