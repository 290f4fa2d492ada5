// src/models.rs

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Timestamp layout shared by every day file. The first 10 characters are the day.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S GMT";

/// One logged command or activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub date: String,
    pub text: String,
    pub ip_addrs: Vec<String>,
    pub operator: Option<String>,
}

impl LogEntry {
    pub fn new(
        at: DateTime<Utc>,
        text: impl Into<String>,
        ip_addrs: Vec<String>,
        operator: Option<String>,
    ) -> Self {
        LogEntry {
            date: at.format(DATE_FORMAT).to_string(),
            text: text.into(),
            ip_addrs,
            operator: operator.filter(|o| !o.is_empty()),
        }
    }

    /// The `YYYY-MM-DD` prefix of `date`, if the date is long enough to carry one.
    pub fn day(&self) -> Option<&str> {
        self.date.get(..10)
    }
}

/// On-disk shape of a log entry. Each store is bound to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Schema {
    /// Free-text activities with a list of IPs.
    Activity,
    /// Shell commands with a single IP.
    Command,
}

impl Schema {
    pub fn name(self) -> &'static str {
        match self {
            Schema::Activity => "activity",
            Schema::Command => "command",
        }
    }

    pub fn decode(self, raw: &[u8]) -> serde_json::Result<Vec<LogEntry>> {
        Ok(match self {
            Schema::Activity => serde_json::from_slice::<Vec<ActivityRecord>>(raw)?
                .into_iter()
                .map(LogEntry::from)
                .collect(),
            Schema::Command => serde_json::from_slice::<Vec<CommandRecord>>(raw)?
                .into_iter()
                .map(LogEntry::from)
                .collect(),
        })
    }

    /// Decodes a whole day file as whichever schema it was written in.
    pub fn detect(raw: &[u8]) -> serde_json::Result<(Schema, Vec<LogEntry>)> {
        match Schema::Activity.decode(raw) {
            Ok(entries) => Ok((Schema::Activity, entries)),
            Err(_) => Schema::Command
                .decode(raw)
                .map(|entries| (Schema::Command, entries)),
        }
    }

    /// Indented JSON array with a trailing newline.
    pub fn encode(self, entries: &[LogEntry]) -> serde_json::Result<String> {
        let mut out = match self {
            Schema::Activity => serde_json::to_string_pretty(
                &entries.iter().map(ActivityRecord::from).collect::<Vec<_>>(),
            )?,
            Schema::Command => serde_json::to_string_pretty(
                &entries.iter().map(CommandRecord::from).collect::<Vec<_>>(),
            )?,
        };
        out.push('\n');
        Ok(out)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CommandRecord {
    date: String,
    command: String,
    #[serde(rename = "ipaddr", default)]
    ip_addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ActivityRecord {
    date: String,
    activity: String,
    #[serde(rename = "ipaddr", default)]
    ip_addrs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<String>,
}

impl From<&LogEntry> for CommandRecord {
    fn from(entry: &LogEntry) -> Self {
        CommandRecord {
            date: entry.date.clone(),
            command: entry.text.clone(),
            ip_addr: entry.ip_addrs.join(", "),
            operator: entry.operator.clone(),
        }
    }
}

impl From<CommandRecord> for LogEntry {
    fn from(record: CommandRecord) -> Self {
        let ip_addrs = if record.ip_addr.is_empty() {
            Vec::new()
        } else {
            vec![record.ip_addr]
        };
        LogEntry {
            date: record.date,
            text: record.command,
            ip_addrs,
            operator: record.operator.filter(|o| !o.is_empty()),
        }
    }
}

impl From<&LogEntry> for ActivityRecord {
    fn from(entry: &LogEntry) -> Self {
        ActivityRecord {
            date: entry.date.clone(),
            activity: entry.text.clone(),
            ip_addrs: entry.ip_addrs.clone(),
            operator: entry.operator.clone(),
        }
    }
}

impl From<ActivityRecord> for LogEntry {
    fn from(record: ActivityRecord) -> Self {
        LogEntry {
            date: record.date,
            text: record.activity,
            ip_addrs: record.ip_addrs,
            operator: record.operator.filter(|o| !o.is_empty()),
        }
    }
}
