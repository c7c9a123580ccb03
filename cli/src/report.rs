use clap::Args;
use curvetrim::{report_json, report_text, CurveSummary};
use eyre::Result;

use crate::reduce::{decode_curve, Input, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Report type (text, json)
    #[clap(long, name = "type", default_value = "text")]
    pub report_type: String,

    /// Input format (340, json, csv)
    #[clap(long, default_value = "340")]
    pub format: String,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input curve file [default: stdin]
    #[clap(default_value = "stdin")]
    pub file: String,
}

pub fn report(opts: &Opts) -> Result<()> {
    let mut input = Input::from_filename(&opts.file)?;
    let curve = decode_curve(&opts.format, &mut input)?;
    let summary = CurveSummary::of(&curve)?;

    let mut output = Output::from_filename(&opts.output)?;
    match opts.report_type.as_str() {
        "text" => report_text(&summary, &mut output)?,
        "json" => report_json(&summary, &mut output)?,
        other => eyre::bail!("unknown report type: {}", other),
    }
    Ok(())
}
