use clap::Args;
use eyre::Result;

use crate::reduce::{decode_curve, encode_curve, Input, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Breakpoints the refined curve should have
    #[clap(long, value_parser = clap::value_parser!(u16).range(3..))]
    pub target: u16,

    /// Input format (340, json, csv)
    #[clap(long, default_value = "340")]
    pub format: String,

    /// Output format (340, json, csv)
    #[clap(long, default_value = "340")]
    pub to: String,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input curve file [default: stdin]
    #[clap(default_value = "stdin")]
    pub file: String,
}

pub fn refine(opts: &Opts) -> Result<()> {
    let mut input = Input::from_filename(&opts.file)?;
    let curve = decode_curve(&opts.format, &mut input)?;

    let refined = curvetrim::refine(&curve.table, opts.target as usize)?;
    eprintln!(
        "inserted {} breakpoints ({} total)",
        refined.len() - curve.table.len(),
        refined.len()
    );

    let refined = curve.with_table(refined);
    let mut output = Output::from_filename(&opts.output)?;
    encode_curve(&opts.to, &mut output, &refined)
}
