// src/commands.rs

use crate::cli::HookAction;
use crate::config::{self, Config};
use crate::error::{OplError, Result};
use crate::hook::{self, HookChange};
use crate::ip;
use crate::models::{LogEntry, Schema};
use crate::render::{self, Format};
use crate::store::{self, AppendOutcome, EntryStore};
use chrono::Utc;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};

pub type IpLookup = fn() -> Result<Ipv4Addr>;

/// Where the IPs of a new entry come from.
#[derive(Debug, Clone)]
pub enum IpSource {
    Disabled,
    Explicit(Vec<String>),
    Lookup(IpLookup),
}

fn resolve_ips(source: IpSource) -> Vec<String> {
    match source {
        IpSource::Disabled => Vec::new(),
        IpSource::Explicit(ips) => ips,
        IpSource::Lookup(lookup) => match lookup() {
            Ok(addr) => vec![addr.to_string()],
            Err(e) => {
                tracing::warn!(error = %e, "could not get the public IP, logging without it");
                Vec::new()
            }
        },
    }
}

/// Builds and appends the entry on its own thread. The handle must be joined before exit.
fn spawn_record(
    store: EntryStore,
    text: String,
    operator: Option<String>,
    ips: IpSource,
) -> JoinHandle<Result<AppendOutcome>> {
    thread::spawn(move || {
        let entry = LogEntry::new(Utc::now(), text, resolve_ips(ips), operator);
        store.append(&entry)
    })
}

fn join_record(handle: JoinHandle<Result<AppendOutcome>>) -> Result<()> {
    match handle.join().map_err(|_| OplError::TaskPanicked)?? {
        AppendOutcome::Recorded(path) => println!("✓ Logged to {}", path.display()),
        AppendOutcome::Filtered => tracing::debug!("entry filtered, nothing written"),
    }
    Ok(())
}

/// 处理 'cmd' 命令
pub fn handle_cmd(config: &Config, command: Vec<String>, no_ip: bool, run: bool) -> Result<()> {
    let ips = if no_ip {
        IpSource::Disabled
    } else {
        IpSource::Lookup(ip::public_ipv4)
    };
    record_command(config, command, ips, run)
}

fn record_command(config: &Config, command: Vec<String>, ips: IpSource, run: bool) -> Result<()> {
    let text = command.join(" ");
    let store = EntryStore::open(config.schema_folder(Schema::Command), Schema::Command)?;

    // Skip the IP lookup for commands the store would drop anyway.
    let logging = if store::is_noise(&text) {
        tracing::debug!(command = %text, "command matched noise filter, not logged");
        None
    } else {
        Some(spawn_record(store, text, config.operator.clone(), ips))
    };

    let executed = if run { run_command(&command) } else { Ok(()) };

    if let Some(handle) = logging {
        join_record(handle)?;
    }
    executed
}

fn run_command(command: &[String]) -> Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| OplError::InvalidInput("No command given.".to_string()))?;
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        return Err(OplError::CommandFailed(status));
    }
    Ok(())
}

/// 处理 'act' 命令
pub fn handle_act(
    config: &Config,
    activity: String,
    ips: Option<String>,
    no_ip: bool,
) -> Result<()> {
    let source = match (no_ip, ips) {
        (true, _) => IpSource::Disabled,
        (false, Some(list)) => IpSource::Explicit(ip::parse_ip_list(&list)),
        (false, None) => IpSource::Lookup(ip::public_ipv4),
    };
    record_activity(config, activity, source)
}

fn record_activity(config: &Config, activity: String, source: IpSource) -> Result<()> {
    let store = EntryStore::open(config.schema_folder(Schema::Activity), Schema::Activity)?;
    join_record(spawn_record(store, activity, config.operator.clone(), source))
}

/// 处理 'show' 命令
pub fn handle_show(
    config: &Config,
    location: Option<PathBuf>,
    format: Format,
    schema: Option<Schema>,
    sorted: bool,
) -> Result<()> {
    let path = match location {
        Some(p) => p,
        None => {
            let folder = schema.map_or_else(|| config.log_root.clone(), |s| config.schema_folder(s));
            if !folder.exists() {
                println!("No logs found.");
                return Ok(());
            }
            folder
        }
    };

    let mut logs = store::read_all(&path, schema)?;
    if logs.is_empty() {
        println!("No logs found.");
        return Ok(());
    }
    if sorted {
        store::sort_chronologically(&mut logs);
    }

    match format {
        Format::Terminal => print!("{}", render::render_terminal(&logs)),
        Format::Md => print!("{}", render::render_markdown(&logs)),
        Format::Xlsx => {
            let out = Path::new(render::SPREADSHEET_FILE);
            render::write_spreadsheet(&logs, out)?;
            println!("✓ Logs written to {}", out.display());
        }
    }
    Ok(())
}

/// 处理 'hook' 命令
pub fn handle_hook(action: HookAction) -> Result<()> {
    let home_dir = dirs::home_dir().ok_or(OplError::HomeDirNotFound)?;
    match action {
        HookAction::Enable { shell } => {
            let rc = config::shell_rc_path(&home_dir, shell);
            match hook::enable(&rc, shell)? {
                HookChange::AlreadyPresent => {
                    println!("The {} hook is already enabled in {}", shell.name(), rc.display())
                }
                _ => println!("✓ {} hook added to {}", shell.name(), rc.display()),
            }
        }
        HookAction::Disable { shell } => {
            let rc = config::shell_rc_path(&home_dir, shell);
            match hook::disable(&rc, shell)? {
                HookChange::Removed => {
                    println!("✓ {} hook removed from {}", shell.name(), rc.display())
                }
                _ => println!("No opl hook found in {}", rc.display()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn act_records_explicit_ips_and_operator() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), Some("zk".to_string()));
        handle_act(&config, "phished helpdesk".into(), Some("10.0.0.1, 10.0.0.2".into()), false)
            .unwrap();

        let logs = store::read_all(&config.schema_folder(Schema::Activity), None).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].text, "phished helpdesk");
        assert_eq!(logs[0].ip_addrs, ["10.0.0.1", "10.0.0.2"]);
        assert_eq!(logs[0].operator.as_deref(), Some("zk"));
    }

    #[test]
    fn cmd_without_ip_goes_to_command_folder() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None);
        handle_cmd(&config, vec!["nmap".into(), "-sV".into(), "target".into()], true, false).unwrap();
        handle_cmd(&config, vec!["ls".into(), "-la".into()], true, false).unwrap();

        let logs = store::read_all(&config.schema_folder(Schema::Command), None).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].text, "nmap -sV target");
        assert!(logs[0].ip_addrs.is_empty());
        assert!(!config.schema_folder(Schema::Activity).exists());
    }

    #[test]
    fn cmd_reports_failed_run_after_logging() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None);
        let err = handle_cmd(&config, vec!["false".into()], true, true).unwrap_err();
        assert!(matches!(err, OplError::CommandFailed(_)));

        let logs = store::read_all(&config.schema_folder(Schema::Command), None).unwrap();
        assert_eq!(logs[0].text, "false");
    }

    #[test]
    fn show_without_logs_is_not_an_error() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None);
        handle_show(&config, None, Format::Terminal, None, false).unwrap();
    }

    #[test]
    fn show_missing_location_fails() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None);
        let err = handle_show(
            &config,
            Some(dir.path().join("nope")),
            Format::Md,
            Some(Schema::Command),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, OplError::LocationNotFound(_)));
    }

    #[test]
    fn failed_ip_lookup_still_records_entry() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None);
        let offline = IpSource::Lookup(|| Err(OplError::NoPublicIp));

        record_activity(&config, "dumped lsass".into(), offline.clone()).unwrap();
        record_command(&config, vec!["crackmapexec smb 10.0.0.0/24".into()], offline, false).unwrap();

        let logs = store::read_all(dir.path(), None).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|e| e.ip_addrs.is_empty()));
    }

    #[test]
    fn looked_up_ip_is_recorded() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None);
        let lookup = IpSource::Lookup(|| Ok(Ipv4Addr::new(192, 0, 2, 10)));
        record_activity(&config, "recon".into(), lookup).unwrap();

        let logs = store::read_all(dir.path(), Some(Schema::Activity)).unwrap();
        assert_eq!(logs[0].ip_addrs, ["192.0.2.10"]);
    }

    #[test]
    fn show_reads_command_logs_by_default() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None);
        handle_cmd(&config, vec!["nmap".into(), "-sV".into(), "target".into()], true, false).unwrap();
        handle_show(&config, None, Format::Md, None, false).unwrap();

        assert_eq!(store::read_all(&config.log_root, None).unwrap().len(), 1);
    }
}
