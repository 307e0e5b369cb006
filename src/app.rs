//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the appropriate
//! command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal microphone scope with scrolling waveform, WAV recording and playback
#[derive(Parser)]
#[command(name = "wavetap")]
#[command(version)]
#[command(about = "Terminal microphone scope: live waveform, WAV recording, playback")]
#[command(
    long_about = "wavetap renders a scrolling waveform of your microphone in the terminal.\n\
Space starts and stops a capture; every capture is saved as a WAV file that\n\
can be played back with 'wavetap replay'.\n\n\
DEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\n\
EXAMPLES:\n    # Open the scope and start capturing with Space\n    $ wavetap\n\n    \
# Play the most recent recording\n    $ wavetap replay\n\n    \
# Play the third most recent recording\n    $ wavetap replay 3\n\n    \
# See which input devices are available\n    $ wavetap list-devices"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavetap/wavetap.toml\n    Recordings:         ~/.local/share/wavetap/recordings\n    Logs:               ~/.local/state/wavetap/wavetap.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the live waveform scope (default)
    ///
    /// Space starts/stops a capture, 'q' or Escape quits. Captures are
    /// saved as WAV files for later playback.
    #[command(visible_alias = "r")]
    Record,

    /// Play back a saved recording using the system audio player
    #[command(visible_alias = "rp")]
    Replay {
        /// Recording index (1 = most recent, 2 = second most recent, etc.)
        #[arg(value_name = "N")]
        index: Option<usize>,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit the capture device, downsampling stride, history window, and
    /// canvas dimensions. Uses $EDITOR or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure the
    /// correct input device in wavetap.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   wavetap completions bash > wavetap.bash
    ///   wavetap completions zsh > _wavetap
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavetap", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Record) => {
            commands::handle_record()?;
        }
        Some(Commands::Replay { index }) => {
            commands::handle_replay(index)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
