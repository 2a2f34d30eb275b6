//! Slate CLI — command-line interface for script breakdown analysis.
//!
//! Reuses the same core domain logic (slate-core) and server bootstrap
//! (slate-server) that power the web frontend.

mod commands;

use clap::{Parser, Subcommand};

/// Slate CLI — Script breakdown for film production
#[derive(Parser)]
#[command(name = "slate", version, about = "Slate CLI — Script breakdown for film production")]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "SLATE_DB_PATH", default_value = "slate.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Slate HTTP backend server
    Server {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Path to static frontend directory
        #[arg(long)]
        static_dir: Option<String>,
    },

    /// Analyze a script from a file or inline text
    Analyze {
        /// Path to a .pdf, .txt, or .fountain script file
        #[arg(long, conflicts_with = "text")]
        file: Option<String>,
        /// Script text supplied directly
        #[arg(long)]
        text: Option<String>,
        /// Thread ID to checkpoint under (generated when omitted)
        #[arg(long)]
        thread_id: Option<String>,
    },

    /// Submit reviewer feedback for a thread
    Feedback {
        /// Thread ID of the analysis run
        #[arg(long)]
        thread_id: String,
        /// Section to revise: cost, props, location, character, scene, timeline
        #[arg(long)]
        section: Option<String>,
        /// Revision note for the section
        #[arg(long)]
        note: Option<String>,
        /// Approve all analyses as-is
        #[arg(long, default_value_t = false)]
        approve: bool,
    },

    /// Show the status of an analysis thread
    Status {
        /// Thread ID of the analysis run
        #[arg(long)]
        thread_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slate_core=warn,slate_server=warn,slate_cli=info".into()),
        )
        .init();

    let result = match cli.command {
        Commands::Server {
            host,
            port,
            static_dir,
        } => commands::server::run(host, port, cli.db, static_dir).await,

        Commands::Analyze {
            file,
            text,
            thread_id,
        } => {
            let state = commands::init_state(&cli.db);
            commands::analyze::run(&state, file.as_deref(), text.as_deref(), thread_id.as_deref())
                .await
        }

        Commands::Feedback {
            thread_id,
            section,
            note,
            approve,
        } => {
            let state = commands::init_state(&cli.db);
            commands::feedback::run(
                &state,
                &thread_id,
                section.as_deref(),
                note.as_deref(),
                approve,
            )
            .await
        }

        Commands::Status { thread_id } => {
            let state = commands::init_state(&cli.db);
            commands::status::run(&state, &thread_id).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
