mod config;
mod data;
mod error;
mod render;
mod server;
mod solver;
mod verify;

use clap::{Parser, Subcommand, ValueEnum};
use data::SolveOutcome;
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Weekly school timetable solver")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a timetable once and print it
    Solve(SolveArgs),
    /// Serve POST /v1/timetable/solve
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

#[derive(clap::Args, Debug, Default)]
struct SolveArgs {
    /// JSON input file; the built-in demo is used when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// Solver time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,
    #[arg(long)]
    seed: Option<i32>,
    #[arg(long)]
    threads: Option<i32>,
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
    /// Also print one table per teacher
    #[arg(long)]
    teachers: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Format {
    #[default]
    Table,
    Json,
}

fn run_solve(args: SolveArgs) -> ExitCode {
    let input = match &args.input {
        Some(path) => config::load_input(path),
        None => Ok(config::demo_input()),
    };
    let mut input = match input {
        Ok(input) => input,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(1);
        }
    };
    if let Some(limit) = args.time_limit {
        input.solver.time_limit_secs = Some(limit);
    }
    if let Some(seed) = args.seed {
        input.solver.random_seed = seed;
    }
    if let Some(threads) = args.threads {
        input.solver.threads = threads;
    }

    let outcome = match solver::solve(&input) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(1);
        }
    };

    match args.format {
        Format::Json => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("cannot serialize outcome: {}", e);
                return ExitCode::from(1);
            }
        },
        Format::Table => match &outcome {
            SolveOutcome::Feasible(timetable) => {
                print!("{}", render::render_group_timetables(&input, timetable));
                if args.teachers {
                    print!("{}", render::render_teacher_timetables(&input, timetable));
                }
            }
            SolveOutcome::Infeasible => println!("No feasible solution found."),
            SolveOutcome::Unknown { reason } => {
                println!("No solution found within the solver budget: {}", reason)
            }
        },
    }

    if outcome.is_feasible() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Serve { addr }) => match server::run_server(&addr).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Server failed: {}", e);
                ExitCode::from(1)
            }
        },
        Some(Command::Solve(args)) => run_solve(args),
        None => run_solve(SolveArgs::default()),
    }
}
