use std::io::BufRead;

use clap::Args;
use eyre::Result;

use crate::reduce::{decode_curve, encode_curve, Input, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Output format (340, json, csv)
    #[clap(long, default_value = "340")]
    pub to: String,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

pub fn encode(opts: &Opts) -> Result<()> {
    let sources: Vec<String> = if opts.files.is_empty() {
        vec!["stdin".to_string()]
    } else {
        opts.files.clone()
    };

    let mut output = Output::from_filename(&opts.output)?;

    for source in &sources {
        let mut input = Input::from_filename(source)?;
        let format = sniff_format(&mut input)?;
        let curve = decode_curve(format, &mut input)?;
        encode_curve(&opts.to, &mut output, &curve)?;
    }

    Ok(())
}

/// Peek at the buffered input to tell JSON (leading brace), CSV (comma in
/// the first line) and the device text layout apart.
fn sniff_format(input: &mut Input) -> Result<&'static str> {
    let buf = input.fill_buf()?;
    if buf.is_empty() {
        eyre::bail!("empty input");
    }
    if buf.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
        return Ok("json");
    }
    let line_end = buf.iter().position(|&b| b == b'\n').unwrap_or(buf.len());
    if buf[..line_end].contains(&b',') {
        return Ok("csv");
    }
    Ok("340")
}
