//! LRU cache demo driver
//!
//! Runs a scripted sequence of puts and gets (or commands read from stdin)
//! and prints the cache state after every mutation.

mod command;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use lrucache::{CacheConfig, LruCache, DEFAULT_CAPACITY};
use tracing::{info, warn};

use crate::command::{Command, CommandHandler};

/// Operations of the reference demo
const SCRIPT: &[Command] = &[
    Command::Put(1, 1),
    Command::Put(2, 2),
    Command::Get(1),
    Command::Put(3, 3),
    Command::Get(2),
    Command::Put(4, 4),
    Command::Get(1),
    Command::Get(3),
    Command::Get(4),
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache capacity (number of entries)
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY, allow_negative_numbers = true)]
    capacity: i64,

    /// Read commands (PUT k v, GET k, DUMP, STATS) from stdin instead of the built-in script
    #[arg(long)]
    stdin: bool,

    /// Pretty-print JSON snapshots
    #[arg(long)]
    pretty: bool,

    /// Print cache counters when done
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only demo output
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let cache = LruCache::with_config(CacheConfig::with_capacity(args.capacity))?;
    info!("Cache capacity: {}", cache.capacity());

    let mut handler = CommandHandler::new(cache, args.pretty);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "=== LRU Cache Demo (Capacity: {}) ===\n", args.capacity)?;

    if args.stdin {
        run_lines(&mut handler, io::stdin().lock(), &mut out)?;
    } else {
        run_script(&mut handler, SCRIPT, &mut out)?;
    }

    if args.stats {
        writeln!(out, "{}", handler.handle(Command::Stats)?)?;
    }

    info!(
        "Final cache size: {}/{}",
        handler.cache().len(),
        handler.cache().capacity()
    );

    writeln!(out, "\n=== Demo Complete ===")?;
    Ok(())
}

fn run_script<W: Write>(handler: &mut CommandHandler, script: &[Command], out: &mut W) -> Result<()> {
    for &cmd in script {
        writeln!(out, "{}", handler.handle(cmd)?)?;
    }
    Ok(())
}

fn run_lines<R: BufRead, W: Write>(handler: &mut CommandHandler, input: R, out: &mut W) -> Result<()> {
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        match Command::parse(&line) {
            Ok(Some(cmd)) => writeln!(out, "{}", handler.handle(cmd)?)?,
            Ok(None) => {}
            Err(e) => {
                warn!("Parse error on line {}: {}", lineno + 1, e);
                writeln!(out, "ERR {}", e)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> CommandHandler {
        CommandHandler::new(LruCache::new(2).unwrap(), false)
    }

    #[test]
    fn test_reference_script_output() {
        let mut handler = handler();
        let mut out = Vec::new();

        run_script(&mut handler, SCRIPT, &mut out).unwrap();
        assert_eq!(handler.cache().len(), 2);

        let expected = "\
Put(1, 1) - Cache: {\"capacity\":2,\"size\":1,\"items\":{\"1\":1},\"order\":[1]}
Put(2, 2) - Cache: {\"capacity\":2,\"size\":2,\"items\":{\"1\":1,\"2\":2},\"order\":[2,1]}
Get(1): 1
Put(3, 3) - Cache: {\"capacity\":2,\"size\":2,\"items\":{\"1\":1,\"3\":3},\"order\":[3,1]}
Get(2): -1
Put(4, 4) - Cache: {\"capacity\":2,\"size\":2,\"items\":{\"3\":3,\"4\":4},\"order\":[4,3]}
Get(1): -1
Get(3): 3
Get(4): 4
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_run_lines() {
        let mut handler = handler();
        let mut out = Vec::new();
        let input = "# warm up\nPUT 1 10\n\nget 1\nbogus\nGET 2\n";

        run_lines(&mut handler, input.as_bytes(), &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Put(1, 10) - Cache: "));
        assert_eq!(lines[1], "Get(1): 10");
        assert_eq!(lines[2], "ERR unknown command 'BOGUS'");
        assert_eq!(lines[3], "Get(2): -1");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["lru-demo", "--capacity", "3", "--stats"]);
        assert_eq!(args.capacity, 3);
        assert!(args.stats);
        assert!(!args.stdin);

        let args = Args::parse_from(["lru-demo"]);
        assert_eq!(args.capacity, DEFAULT_CAPACITY);
    }
}
