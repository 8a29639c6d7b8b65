//! Line classification
//!
//! A line is offered to an ordered chain of [`FormatMatcher`]s; the first one
//! that recognizes it produces the field bag. The chain ends in a fallback
//! that always matches, so every non-blank line yields a bag.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::timestamp::syslog_prefix;
use crate::models::{FieldBag, FieldValue};

static DOTTED_QUAD_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("valid regex"));

static DOTTED_QUAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}(?:\.\d{1,3}){3})").expect("valid regex"));

static COMMON_LOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\S+) \S+ \S+ \[(.*?)\] "(.*?)" (\d{3}) (\d+|-)$"#).expect("valid regex")
});

static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+)=(\S+)").expect("valid regex"));

static SSH_FROM_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"from (\d{1,3}(?:\.\d{1,3}){3}) port (\d+)").expect("valid regex")
});

static KERNEL_SRC_DPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SRC=(\d{1,3}(?:\.\d{1,3}){3}).*DPT=(\d+)").expect("valid regex")
});

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]").expect("valid regex"));

/// One log format the line parser knows how to recognize
pub trait FormatMatcher: Send + Sync {
    /// Short name used in trace logging
    fn name(&self) -> &'static str;

    /// Parse a trimmed, non-empty line, or `None` if the format does not apply
    fn try_parse(&self, line: &str) -> Option<FieldBag>;
}

/// A single JSON object per line
pub struct JsonMatcher;

impl FormatMatcher for JsonMatcher {
    fn name(&self) -> &'static str {
        "json"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        if !(line.starts_with('{') && line.ends_with('}')) {
            return None;
        }
        // Malformed JSON falls through to the next matcher
        let object: serde_json::Map<String, Value> = serde_json::from_str(line).ok()?;

        let mut bag = FieldBag::new();
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => bag.insert(key, s),
                Value::Number(n) => bag.insert(key, FieldValue::Number(n)),
                Value::Bool(b) => bag.insert(key, b.to_string()),
                nested => bag.insert(key, nested.to_string()),
            }
        }
        Some(bag)
    }
}

/// `ip,time,request,status,port`
pub struct DelimitedMatcher;

impl DelimitedMatcher {
    const COLUMNS: [&'static str; 5] = ["srcIP", "time", "request", "status", "port"];
}

impl FormatMatcher for DelimitedMatcher {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 3 || !DOTTED_QUAD_FIELD.is_match(parts[0]) {
            return None;
        }

        let mut bag = FieldBag::new();
        for (key, value) in Self::COLUMNS.iter().zip(parts.iter().map(|p| p.trim())) {
            if !value.is_empty() {
                bag.insert(*key, value);
            }
        }
        Some(bag)
    }
}

/// `127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET / HTTP/1.0" 200 2326`
pub struct CommonLogMatcher;

impl FormatMatcher for CommonLogMatcher {
    fn name(&self) -> &'static str {
        "common_log"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        let caps = COMMON_LOG.captures(line)?;
        let mut bag = FieldBag::new();
        bag.insert("srcIP", &caps[1]);
        bag.insert("time", &caps[2]);
        bag.insert("request", &caps[3]);
        bag.insert("status", &caps[4]);
        Some(bag)
    }
}

/// `src=1.2.3.4 dst=5.6.7.8 port=22 status=Failed`
///
/// Any `word=value` token qualifies, so this also swallows lines that merely
/// contain a stray `=` (kernel `SRC=`/`DPT=` lines included). Keys are kept
/// verbatim and a value ends at its next `=`.
pub struct KeyValueMatcher;

impl FormatMatcher for KeyValueMatcher {
    fn name(&self) -> &'static str {
        "key_value"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        let mut bag = FieldBag::new();
        for caps in KEY_VALUE.captures_iter(line) {
            let value = caps[2].split('=').next().unwrap_or_default();
            bag.insert(&caps[1], value);
        }
        if bag.is_empty() {
            None
        } else {
            Some(bag)
        }
    }
}

/// sshd-style `... from <ip> port <n> ...` lines
pub struct SshIntrusionMatcher;

impl FormatMatcher for SshIntrusionMatcher {
    fn name(&self) -> &'static str {
        "ssh_intrusion"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        let caps = SSH_FROM_PORT.captures(line)?;
        let lowered = line.to_lowercase();
        let status = if lowered.contains("failed") || lowered.contains("brute") {
            "Failed"
        } else {
            "OK"
        };

        let mut bag = FieldBag::new();
        bag.insert("srcIP", &caps[1]);
        bag.insert("port", &caps[2]);
        bag.insert_opt("time", syslog_prefix(line));
        bag.insert("status", status);
        bag.insert("request", line);
        Some(bag)
    }
}

/// iptables/IDS lines carrying `SRC=<ip>` and `DPT=<port>`
pub struct KernelFirewallMatcher;

impl FormatMatcher for KernelFirewallMatcher {
    fn name(&self) -> &'static str {
        "kernel_firewall"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        let caps = KERNEL_SRC_DPT.captures(line)?;
        let mut bag = FieldBag::new();
        bag.insert("srcIP", &caps[1]);
        bag.insert("port", &caps[2]);
        bag.insert_opt("time", syslog_prefix(line));
        bag.insert("request", line);
        Some(bag)
    }
}

/// Syslog lines with a timestamp but no recognizable address
pub struct SyslogStampMatcher;

impl FormatMatcher for SyslogStampMatcher {
    fn name(&self) -> &'static str {
        "syslog_stamp"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        let stamp = syslog_prefix(line)?;
        let mut bag = FieldBag::raw_only(line);
        bag.insert("time", stamp);
        Some(bag)
    }
}

/// Last resort: keep the raw line plus any address or bracketed time in it
pub struct FallbackMatcher;

impl FallbackMatcher {
    fn parse(line: &str) -> FieldBag {
        let mut bag = FieldBag::raw_only(line);
        bag.insert_opt("srcIP", DOTTED_QUAD.find(line).map(|m| m.as_str()));
        bag.insert_opt(
            "time",
            BRACKETED
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty()),
        );
        bag
    }
}

impl FormatMatcher for FallbackMatcher {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn try_parse(&self, line: &str) -> Option<FieldBag> {
        Some(Self::parse(line))
    }
}

/// Ordered chain of format matchers
pub struct LineParser {
    matchers: Vec<Box<dyn FormatMatcher>>,
}

impl LineParser {
    /// Parser with the standard matcher chain
    pub fn new() -> Self {
        LineParser {
            matchers: vec![
                Box::new(JsonMatcher),
                Box::new(DelimitedMatcher),
                Box::new(CommonLogMatcher),
                Box::new(KeyValueMatcher),
                Box::new(SshIntrusionMatcher),
                Box::new(KernelFirewallMatcher),
                Box::new(SyslogStampMatcher),
                Box::new(FallbackMatcher),
            ],
        }
    }

    /// Parser with a custom chain, tried in the given order
    pub fn with_matchers(matchers: Vec<Box<dyn FormatMatcher>>) -> Self {
        LineParser { matchers }
    }

    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Parse one line; `None` only for blank lines
    pub fn parse_line(&self, line: &str) -> Option<FieldBag> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        for matcher in &self.matchers {
            if let Some(bag) = matcher.try_parse(line) {
                log::trace!("Line matched by {}: {}", matcher.name(), line);
                return Some(bag);
            }
        }

        // A custom chain may lack a catch-all; never drop a non-blank line
        Some(FallbackMatcher::parse(line))
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}
