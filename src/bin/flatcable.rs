//! Flatcable command line
//!
//! ```bash
//! # Round-trip the built-in sample table in memory
//! flatcable selftest
//!
//! # Same, through a file, and decode it again afterwards
//! flatcable selftest --file sample.bin
//! flatcable dump sample.bin sstr/utf-8 i vec:b
//! ```

use clap::{Parser, Subcommand};
use flatcable::{BinaryIo, FlatcableError, OpenMode, Scalar, Value};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Encode and decode flat values with type descriptors
#[derive(Parser, Debug)]
#[command(name = "flatcable")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the sample table, read it back and compare
    Selftest {
        /// Go through this file instead of memory
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Decode values from a file, one per descriptor, in order
    Dump {
        file: PathBuf,
        #[arg(required = true)]
        descriptors: Vec<String>,
    },
}

fn sample_table() -> Vec<(Value, &'static str)> {
    vec![
        (
            Value::from("a quick brown fox jümps over the läzy d0g"),
            "sstr/utf-8",
        ),
        (Value::from(4711i32), "i"),
        (
            Value::vec([1i8, 2, 3, 4, 5, 6, 7, 8, 9, 10, -19]),
            "vec:b",
        ),
        (
            Value::vec(["egg", "spam", "bacon", "ham", "räksmörgås"]),
            "vec:sstr/latin-1",
        ),
        (
            Value::set([
                9223372036854775807u64,
                4611686018427387903,
                2305843009213693951,
            ]),
            "set:L",
        ),
        (
            Value::map([("xyzzy", 42u64), ("bar", 4711), ("swag", 31412359)]),
            "map:str/ascii:L",
        ),
        (
            Value::map([(42967295i32, 1u32), (-1, 2), (314212359, 65535)]),
            "map:i:I",
        ),
        (Value::from(Scalar::from(&b"flatcable"[..])), "sbyt"),
    ]
}

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            format!("{:08x}  {}", row * 16, hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn check_round_trip<F>(table: &[(Value, &str)], mut read: F) -> CliResult<()>
where
    F: FnMut(&str) -> Result<Value, FlatcableError>,
{
    for (expected, descriptor) in table {
        let actual = read(*descriptor)?;
        if &actual != expected {
            return Err(format!(
                "{} did not round-trip: wrote {:?}, read {:?}",
                descriptor, expected, actual
            )
            .into());
        }
        info!("{:<18} ok", descriptor);
    }
    Ok(())
}

fn check_tally(written: usize, on_disk: usize) -> CliResult<()> {
    if written != on_disk {
        return Err(format!("reported {} bytes written, found {}", written, on_disk).into());
    }
    Ok(())
}

fn selftest(file: Option<PathBuf>) -> CliResult<()> {
    let table = sample_table();

    let bytes = match &file {
        Some(path) => {
            let written = BinaryIo::scoped(path, OpenMode::Write, |bio| {
                table
                    .iter()
                    .try_fold(0, |n, (value, descriptor)| Ok(n + bio.write(value, descriptor)?))
            })?;
            let bytes = std::fs::read(path)?;
            info!("wrote {} bytes to {}", written, path.display());
            check_tally(written, bytes.len())?;
            bytes
        }
        None => {
            let mut bio = BinaryIo::in_memory();
            let mut written = 0;
            for (value, descriptor) in &table {
                written += bio.write(value, descriptor)?;
            }
            let bytes = bio.into_bytes();
            info!("wrote {} bytes to memory", written);
            check_tally(written, bytes.len())?;
            bytes.to_vec()
        }
    };

    println!("{}", hex_dump(&bytes));

    match &file {
        Some(path) => {
            let mut bio = BinaryIo::open(path, OpenMode::Read)?;
            check_round_trip(&table, |descriptor| bio.read(descriptor))?;
        }
        None => {
            let mut bio = BinaryIo::from_bytes(bytes);
            check_round_trip(&table, |descriptor| bio.read(descriptor))?;
        }
    }

    info!("self test passed");
    Ok(())
}

fn dump(file: PathBuf, descriptors: Vec<String>) -> CliResult<()> {
    let result = BinaryIo::scoped(&file, OpenMode::Read, |bio| {
        for descriptor in &descriptors {
            let value = bio.read(descriptor)?;
            println!("{}\t{:?}", descriptor, value);
        }
        info!("decoded {} bytes", bio.bytes_read());
        Ok(())
    });
    Ok(result?)
}

fn main() -> CliResult<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Selftest { file } => selftest(file)?,
        Command::Dump { file, descriptors } => dump(file, descriptors)?,
    }
    Ok(())
}
