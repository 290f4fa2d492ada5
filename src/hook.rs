// src/hook.rs

use crate::error::Result;
use clap::ValueEnum;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const ZSH_HOOK: &str = r#"
# >>> opl hook >>>
_opl_log_command() {
  opl cmd -- "$1" >/dev/null 2>&1 &!
}
autoload -Uz add-zsh-hook
add-zsh-hook preexec _opl_log_command
# <<< opl hook <<<
"#;

const FISH_HOOK: &str = r#"
# >>> opl hook >>>
function _opl_log_command --on-event fish_preexec
    opl cmd -- $argv >/dev/null 2>&1 &
    disown
end
# <<< opl hook <<<
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Fish,
    Zsh,
}

impl Shell {
    pub fn name(self) -> &'static str {
        match self {
            Shell::Fish => "fish",
            Shell::Zsh => "zsh",
        }
    }

    /// Exact text inserted on enable and removed on disable.
    pub fn snippet(self) -> &'static str {
        match self {
            Shell::Fish => FISH_HOOK,
            Shell::Zsh => ZSH_HOOK,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum HookChange {
    Added,
    AlreadyPresent,
    Removed,
    NotFound,
}

fn read_rc(rc: &Path) -> Result<Option<String>> {
    match fs::read_to_string(rc) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Appends the hook to `rc`, creating the file if needed.
pub fn enable(rc: &Path, shell: Shell) -> Result<HookChange> {
    let mut content = read_rc(rc)?.unwrap_or_default();
    if content.contains(shell.snippet()) {
        return Ok(HookChange::AlreadyPresent);
    }
    if let Some(parent) = rc.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    content.push_str(shell.snippet());
    fs::write(rc, content)?;
    tracing::debug!(rc = %rc.display(), shell = shell.name(), "hook installed");
    Ok(HookChange::Added)
}

/// Removes every exact copy of the hook. Leaves `rc` untouched when there is none,
/// and deletes it when the hook was all it held.
pub fn disable(rc: &Path, shell: Shell) -> Result<HookChange> {
    let Some(content) = read_rc(rc)? else {
        return Ok(HookChange::NotFound);
    };
    if !content.contains(shell.snippet()) {
        return Ok(HookChange::NotFound);
    }
    let rest = content.replace(shell.snippet(), "");
    if rest.is_empty() {
        fs::remove_file(rc)?;
    } else {
        fs::write(rc, rest)?;
    }
    tracing::debug!(rc = %rc.display(), shell = shell.name(), "hook removed");
    Ok(HookChange::Removed)
}
