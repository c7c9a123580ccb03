use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use clap::Args;
use curvetrim::{Codec, Curve, CsvCodec, JsonCodec, Reducer, TextCodec, DEFAULT_INCREMENT};
use eyre::Result;

#[derive(Args, Debug)]
pub struct Opts {
    /// Breakpoints the device can hold (LakeShore 240 limit: 200)
    #[clap(long, value_parser = clap::value_parser!(u16).range(2..=200))]
    pub target: Option<u16>,

    /// Tolerance increment between passes
    #[clap(long, default_value_t = DEFAULT_INCREMENT)]
    pub increment: f64,

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

pub fn reduce(opts: &Opts) -> Result<()> {
    let mut input = Input::from_filename(&opts.file)?;
    let curve = decode_curve(&opts.format, &mut input)?;

    let target = match opts.target {
        Some(target) => target as usize,
        None if opts.file == "stdin" => {
            eyre::bail!("--target is required when the curve is read from stdin")
        }
        None => prompt_target(curve.table.len())?,
    };

    let reducer = Reducer::with_increment(target, opts.increment);
    let reduction = reducer.reduce(&curve.table)?;
    eprintln!(
        "reduced {} breakpoints to {} in {} pass(es), tolerance {:.6}",
        curve.table.len(),
        reduction.table.len(),
        reduction.passes,
        reduction.tolerance
    );

    let reduced = curve.with_table(reduction.table);
    let mut output = Output::from_filename(&opts.output)?;
    encode_curve(&opts.to, &mut output, &reduced)
}

/// Ask on the terminal, the way the device upload tools do, until the
/// answer is a count the device can take.
fn prompt_target(len: usize) -> Result<usize> {
    let mut line = String::new();
    loop {
        eprintln!("The curve contains {} breakpoints.", len);
        eprint!("How many breakpoints to keep (2-200)? ");
        io::stderr().flush()?;
        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            eyre::bail!("no target supplied");
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (2..=200).contains(&n) => return Ok(n),
            Ok(n) => eprintln!("{} is outside the device range 2-200, try again", n),
            Err(_) => eprintln!("not a number, try again"),
        }
    }
}

pub fn decode_curve(format: &str, input: &mut Input) -> Result<Curve> {
    let curve = match format {
        "340" | "text" => TextCodec.decode(input)?,
        "json" => JsonCodec.decode(input)?,
        "csv" => CsvCodec.decode(input)?,
        other => eyre::bail!("unknown curve format: {}", other),
    };
    Ok(curve)
}

pub fn encode_curve(format: &str, output: &mut Output, curve: &Curve) -> Result<()> {
    match format {
        "340" | "text" => TextCodec.encode(output, curve)?,
        "json" => JsonCodec.encode(output, curve)?,
        "csv" => CsvCodec.encode(output, curve)?,
        other => eyre::bail!("unknown curve format: {}", other),
    }
    Ok(())
}

pub enum Input {
    Stdin(BufReader<io::Stdin>),
    File(BufReader<File>),
}

impl Input {
    pub fn from_filename(name: &str) -> Result<Self> {
        Ok(match name {
            "stdin" => Input::Stdin(BufReader::new(io::stdin())),
            name => Input::File(BufReader::new(File::open(name)?)),
        })
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Input::Stdin(r) => r.read(buf),
            Input::File(r) => r.read(buf),
        }
    }
}

impl BufRead for Input {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Input::Stdin(r) => r.fill_buf(),
            Input::File(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Input::Stdin(r) => r.consume(amt),
            Input::File(r) => r.consume(amt),
        }
    }
}

pub enum Output {
    Stdout(io::Stdout),
    File(BufWriter<File>),
}

impl Output {
    pub fn from_filename(name: &str) -> Result<Self> {
        Ok(match name {
            "stdout" => Output::Stdout(io::stdout()),
            name => Output::File(BufWriter::new(File::create(name)?)),
        })
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(w) => w.write(buf),
            Output::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(w) => w.flush(),
            Output::File(w) => w.flush(),
        }
    }
}
