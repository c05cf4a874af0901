use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pairlink_cli::commands;
use pairlink_core::DEFAULT_SESSION_FILE;
use pairlink_pairing::DEFAULT_PORT;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pairlink")]
#[command(author, version)]
#[command(
    about = "Pair a WhatsApp Web session and send yourself its session ID",
    long_about = "pairlink keeps a stable session ID on disk, drives WhatsApp Web in Chrome, \
                  shows the pairing QR code on a local web page, and once connected sends \
                  the session ID to your own chat."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to WhatsApp Web and send the session ID to your chat (default)
    Connect(ConnectArgs),

    /// Print the session ID, creating it if needed
    Session {
        /// File holding the session ID
        #[arg(long, value_name = "FILE", default_value = DEFAULT_SESSION_FILE)]
        session_file: PathBuf,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts.\n\n\
        SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: pairlink completion --shell bash >> ~/.bashrc\n  \
        zsh:  pairlink completion --shell zsh > \"${fpath[1]}/_pairlink\"\n  \
        fish: pairlink completion --shell fish > ~/.config/fish/completions/pairlink.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct ConnectArgs {
    /// File holding the session ID
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SESSION_FILE)]
    session_file: PathBuf,

    /// Port for the local QR code page
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Do not open the QR code page in the default browser
    #[arg(long)]
    no_open: bool,

    /// Run Chrome without a window (headless/no-launch mode)
    #[arg(long, conflicts_with = "attach")]
    headless: bool,

    /// Attach to a Chrome already listening on this debugging port instead of launching one
    #[arg(long, value_name = "PORT")]
    attach: Option<u16>,

    /// Path to the Chrome binary
    #[arg(long, value_name = "PATH", conflicts_with = "attach")]
    chrome_path: Option<PathBuf>,
}

impl Default for ConnectArgs {
    fn default() -> Self {
        Self {
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            port: DEFAULT_PORT,
            no_open: false,
            headless: false,
            attach: None,
            chrome_path: None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        None => connect(ConnectArgs::default()),
        Some(Commands::Connect(args)) => connect(args),
        Some(Commands::Session { session_file }) => commands::session::execute(&session_file),
        Some(Commands::Completion { shell }) => {
            commands::completion::execute(shell, &mut Cli::command(), &mut std::io::stdout())
        }
    }
}

fn connect(args: ConnectArgs) -> Result<()> {
    commands::connect::execute(commands::connect::ConnectOptions {
        session_file: args.session_file,
        port: args.port,
        open_browser: !args.no_open,
        headless: args.headless,
        attach: args.attach,
        chrome_path: args.chrome_path,
    })
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    // Directive targets match by prefix, so this covers every pairlink_* crate
    let filter = if verbose {
        EnvFilter::new("pairlink=debug")
    } else {
        EnvFilter::new("pairlink=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
