use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kinegraph", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an event table into a schedule JSON.
    Compile(CompileArgs),
    /// Compile and print run statistics plus the schedule fingerprint.
    Stats(StatsArgs),
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Input event table, sorted ascending by time_in_ms.
    #[arg(long)]
    events: PathBuf,

    /// Stage configuration JSON.
    #[arg(long)]
    stage: PathBuf,

    /// Output schedule JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Override the stage's placement seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Include the expanded keyframe writes in the output.
    #[arg(long, default_value_t = true)]
    keyframes: bool,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Input event table, sorted ascending by time_in_ms.
    #[arg(long)]
    events: PathBuf,

    /// Stage configuration JSON.
    #[arg(long)]
    stage: PathBuf,

    /// Override the stage's placement seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(serde::Serialize)]
struct ScheduleDump<'a> {
    schedule: &'a kinegraph::Schedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyframes: Option<Vec<kinegraph::KeyframeWrite>>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn compile_inputs(
    events: &Path,
    stage: &Path,
    seed: Option<u64>,
) -> anyhow::Result<kinegraph::Schedule> {
    let events = kinegraph::parse_events_path(events)
        .with_context(|| format!("parse event table '{}'", events.display()))?;
    let stage = kinegraph::Stage::from_path(stage)
        .with_context(|| format!("load stage '{}'", stage.display()))?;
    let schedule = kinegraph::compile(events, &stage, kinegraph::CompileOpts { seed })?;
    Ok(schedule)
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let schedule = compile_inputs(&args.events, &args.stage, args.seed)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let dump = ScheduleDump {
        keyframes: args.keyframes.then(|| schedule.keyframes()),
        schedule: &schedule,
    };
    let f = std::fs::File::create(&args.out)
        .with_context(|| format!("create schedule JSON '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(f), &dump)
        .with_context(|| format!("write schedule JSON '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let schedule = compile_inputs(&args.events, &args.stage, args.seed)?;
    let stats = schedule.stats;

    println!("events:      {}", stats.events);
    println!("points:      {}", stats.points_created);
    println!("paths:       {}", stats.paths_created);
    println!("commands:    {}", schedule.commands.len());
    println!("last frame:  {}", stats.last_frame.0);
    println!("fingerprint: {}", schedule.fingerprint());
    Ok(())
}
