use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::LaunchOptions;

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(author, version, about)]
#[command(long_about = "A markdown presentation host with a synchronized presenter view.\n\n\
    Decks may embed an interactive roadmap and a tabbed paper viewer.\n\n\
    Examples:\n  \
    deckhand talk.md                   Present (fullscreen)\n  \
    deckhand talk.md --windowed        Present in a window\n  \
    deckhand talk.md --fragment papers=cia\n  \
    deckhand state talk.md --index 2   Print the presenter payload")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown deck to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Initial location fragment, e.g. papers=<id> or #<milestone-id>
    #[arg(long, global = false)]
    pub fragment: Option<String>,

    /// Skip animations
    #[arg(long, global = false)]
    pub reduced_motion: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the presenter sync payload for a deck as JSON
    State {
        /// Markdown deck
        file: PathBuf,

        /// Emit an update payload for this slide (0-indexed) instead of the full state
        #[arg(long)]
        index: Option<usize>,
    },

    /// Print slide titles and speaker notes
    Notes {
        /// Markdown deck
        file: PathBuf,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, presenter.width, motion.reduced)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    /// Log filter directive implied by the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::State { file, index }) => {
                ensure_exists(&file)?;
                crate::commands::state::run(&file, index)
            }
            Some(Commands::Notes { file }) => {
                ensure_exists(&file)?;
                crate::commands::notes::run(&file)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::version::run();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    ensure_exists(&file)?;
                    crate::app::run(LaunchOptions {
                        file,
                        windowed: self.windowed,
                        start_slide: self.slide,
                        fragment: self.fragment,
                        reduced_motion: self.reduced_motion,
                    })
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

fn ensure_exists(file: &std::path::Path) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_presentation_flags() {
        let cli = Cli::try_parse_from([
            "deckhand",
            "talk.md",
            "--slide",
            "3",
            "--fragment",
            "papers=cia",
            "--reduced-motion",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("talk.md")));
        assert_eq!(cli.slide, Some(3));
        assert_eq!(cli.fragment.as_deref(), Some("papers=cia"));
        assert!(cli.reduced_motion);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_state_subcommand() {
        let cli = Cli::try_parse_from(["deckhand", "state", "talk.md", "--index", "2"]).unwrap();
        match cli.command {
            Some(Commands::State { file, index }) => {
                assert_eq!(file, PathBuf::from("talk.md"));
                assert_eq!(index, Some(2));
            }
            _ => panic!("expected state subcommand"),
        }
    }

    #[test]
    fn verbosity_maps_to_level() {
        let level = |args: &[&str]| Cli::try_parse_from(args).unwrap().log_level();
        assert_eq!(level(&["deckhand"]), "warn");
        assert_eq!(level(&["deckhand", "-v"]), "debug");
        assert_eq!(level(&["deckhand", "-vv"]), "trace");
        assert_eq!(level(&["deckhand", "--quiet"]), "error");
    }

    #[test]
    fn command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
