// src/cli.rs

use crate::hook::Shell;
use crate::models::Schema;
use crate::render::Format;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "opl - Yet another operator logging tool for Red Teamers",
    long_about = "opl keeps a timestamped trail of the commands and activities an operator performs, tagged with the operator's name and public IP. Entries are stored as one JSON file per UTC day and can be printed as a table, Markdown or a spreadsheet."
)]
pub struct Cli {
    /// Print debug error messages.
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Root folder for day files. Defaults to ~/.oplogs.
    #[arg(long, global = true, env = "OPL_LOG_FOLDER", value_name = "DIR")]
    pub folder: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Logs a shell command. Common low-value commands (cd, ls, ...) are ignored.
    Cmd {
        #[arg(long, help = "Do not look up and record the public IP")]
        no_ip: bool,

        #[arg(short, long, help = "Also execute the command after logging it")]
        run: bool,

        /// The command line to log.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Logs a free-text activity.
    Act {
        /// Description of the activity.
        activity: String,

        #[arg(
            short,
            long,
            conflicts_with = "no_ip",
            help = "Comma-separated IPs the activity was performed from. If not set, the public IP is logged"
        )]
        ip: Option<String>,

        #[arg(long, help = "Do not record any IP")]
        no_ip: bool,
    },

    /// Prints logs from the default folder or any file or folder given with -l.
    Show {
        #[arg(short, long, help = "Individual file or folder to print logs from")]
        location: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Terminal)]
        format: Format,

        #[arg(short, long, value_enum, help = "Only show logs of this kind. Shows both by default")]
        schema: Option<Schema>,

        #[arg(long, help = "Sort entries by timestamp across files")]
        sorted: bool,
    },

    /// Installs or removes the shell hook that logs every interactive command.
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum HookAction {
    /// Appends the hook to the shell's startup file.
    Enable {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Removes the hook from the shell's startup file.
    Disable {
        #[arg(value_enum)]
        shell: Shell,
    },
}
