mod encode;
mod reduce;
mod refine;
mod report;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "curvetrim",
    about = "Fit sensor calibration curves into device breakpoint limits"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reduce a curve's breakpoints to a device-acceptable count
    Reduce(reduce::Opts),
    /// Insert breakpoints at a curve's sharpest bends
    Refine(refine::Opts),
    /// Summarize a curve file
    Report(report::Opts),
    /// Transcode curve files between formats
    Encode(encode::Opts),
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Reduce(opts) => reduce::reduce(&opts),
        Command::Refine(opts) => refine::refine(&opts),
        Command::Report(opts) => report::report(&opts),
        Command::Encode(opts) => encode::encode(&opts),
    }
}
