//! Text commands for driving the demo cache

use std::fmt;

use anyhow::Result;
use lrucache::LruCache;

/// One demo operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// PUT key value
    Put(i64, i64),
    /// GET key
    Get(i64),
    /// DUMP: print the cache snapshot
    Dump,
    /// STATS: print hit/miss/eviction counters
    Stats,
}

impl Command {
    /// Parse one line
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default().to_uppercase();
        let args: Vec<&str> = parts.collect();

        let cmd = match name.as_str() {
            "PUT" => {
                if args.len() != 2 {
                    return Err("wrong number of arguments for 'put' command".to_string());
                }
                Command::Put(parse_int(args[0])?, parse_int(args[1])?)
            }
            "GET" => {
                if args.len() != 1 {
                    return Err("wrong number of arguments for 'get' command".to_string());
                }
                Command::Get(parse_int(args[0])?)
            }
            "DUMP" => Command::Dump,
            "STATS" => Command::Stats,
            _ => return Err(format!("unknown command '{}'", name)),
        };
        Ok(Some(cmd))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Put(key, value) => write!(f, "Put({}, {})", key, value),
            Command::Get(key) => write!(f, "Get({})", key),
            Command::Dump => write!(f, "Dump"),
            Command::Stats => write!(f, "Stats"),
        }
    }
}

fn parse_int(arg: &str) -> Result<i64, String> {
    arg.parse()
        .map_err(|_| format!("value is not an integer: '{}'", arg))
}

/// Executes commands against a cache and renders the output line
pub struct CommandHandler {
    cache: LruCache,
    pretty: bool,
}

impl CommandHandler {
    /// Wrap a cache; `pretty` switches JSON output to multi-line
    pub fn new(cache: LruCache, pretty: bool) -> Self {
        Self { cache, pretty }
    }

    /// Borrow the underlying cache
    pub fn cache(&self) -> &LruCache {
        &self.cache
    }

    /// Run one command and return the line to print
    pub fn handle(&mut self, cmd: Command) -> Result<String> {
        let line = match cmd {
            Command::Put(key, value) => {
                self.cache.put(key, value);
                format!("{} - Cache: {}", cmd, self.render_snapshot()?)
            }
            Command::Get(key) => format!("{}: {}", cmd, self.cache.get(key)),
            Command::Dump => format!("Cache: {}", self.render_snapshot()?),
            Command::Stats => {
                let stats = self.cache.stats().snapshot();
                format!("Stats: {}", self.to_json(&stats)?)
            }
        };
        Ok(line)
    }

    fn render_snapshot(&self) -> Result<String> {
        self.to_json(&self.cache.snapshot())
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(capacity: i64) -> CommandHandler {
        CommandHandler::new(LruCache::new(capacity).unwrap(), false)
    }

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("PUT 1 2"), Ok(Some(Command::Put(1, 2))));
        assert_eq!(Command::parse("  get -3 "), Ok(Some(Command::Get(-3))));
        assert_eq!(Command::parse("dump"), Ok(Some(Command::Dump)));
        assert_eq!(Command::parse("Stats"), Ok(Some(Command::Stats)));
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("# comment"), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("PUT 1").is_err());
        assert!(Command::parse("GET").is_err());
        assert!(Command::parse("GET x").unwrap_err().contains("not an integer"));
        assert!(Command::parse("DEL 1").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn test_put_renders_snapshot() {
        let mut handler = handler(2);

        let line = handler.handle(Command::Put(1, 1)).unwrap();
        assert_eq!(
            line,
            r#"Put(1, 1) - Cache: {"capacity":2,"size":1,"items":{"1":1},"order":[1]}"#
        );
    }

    #[test]
    fn test_get_renders_value() {
        let mut handler = handler(2);
        handler.handle(Command::Put(1, 5)).unwrap();

        assert_eq!(handler.handle(Command::Get(1)).unwrap(), "Get(1): 5");
        assert_eq!(handler.handle(Command::Get(9)).unwrap(), "Get(9): -1");
    }

    #[test]
    fn test_stats_and_dump() {
        let mut handler = handler(1);
        handler.handle(Command::Put(1, 1)).unwrap();
        handler.handle(Command::Put(2, 2)).unwrap();

        let stats = handler.handle(Command::Stats).unwrap();
        assert!(stats.starts_with("Stats: "));
        assert!(stats.contains(r#""evictions":1"#));

        let dump = handler.handle(Command::Dump).unwrap();
        assert_eq!(
            dump,
            r#"Cache: {"capacity":1,"size":1,"items":{"2":2},"order":[2]}"#
        );
        assert_eq!(handler.cache().len(), 1);
    }
}
