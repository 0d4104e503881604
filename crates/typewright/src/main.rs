//! Typewright CLI
//!
//! Plans definitions and derives capabilities without a host, printing the
//! settings that would be registered.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use typewright::cli;
use typewright::{Config, PermissionSpec};

#[derive(Parser)]
#[command(name = "typewright", about = "Content type, taxonomy, and role definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the settings a definition would register with.
    Plan {
        #[command(subcommand)]
        target: PlanTarget,
    },
    /// Derive the capabilities for a capability type.
    Capabilities {
        /// Singular capability type noun (e.g. "book").
        noun: String,
        /// Explicit plural (default: noun + "s").
        #[arg(long)]
        plural: Option<String>,
        /// "all" or action=scope pairs, e.g. "read=all,edit=others".
        #[arg(long, default_value = "all")]
        permissions: PermissionSpec,
    },
    /// Describe a role and the capabilities it would carry.
    Role {
        /// Display name, then optional machine name.
        #[arg(required = true, num_args = 1..=2)]
        names: Vec<String>,
        #[arg(long, default_value = "post")]
        capability_type: String,
        #[arg(long)]
        plural: Option<String>,
        #[arg(long, default_value = "all")]
        permissions: PermissionSpec,
    },
}

#[derive(Subcommand)]
enum PlanTarget {
    /// Plan a content type.
    ContentType {
        /// Singular, then optional plural, slug, and db name.
        #[arg(required = true, num_args = 1..=4)]
        names: Vec<String>,
        /// Capability type noun (default: post).
        #[arg(long)]
        capability_type: Option<String>,
        /// Explicit capability type plural.
        #[arg(long, requires = "capability_type")]
        plural: Option<String>,
        /// Option override as key=json; dotted keys nest.
        #[arg(long = "option")]
        options: Vec<String>,
    },
    /// Plan a taxonomy.
    Taxonomy {
        #[arg(required = true, num_args = 1..=4)]
        names: Vec<String>,
        /// Content type the taxonomy attaches to (repeatable).
        #[arg(long = "post-type", required = true)]
        post_types: Vec<String>,
        #[arg(long = "option")]
        options: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config);

    let cli = Cli::parse();
    let output = match cli.command {
        Command::Plan { target } => match target {
            PlanTarget::ContentType {
                names,
                capability_type,
                plural,
                options,
            } => {
                let capability_type = capability_type
                    .map(|noun| cli::capability_type(&noun, plural.as_deref()))
                    .transpose()?;
                cli::cmd_plan_content_type(&names, capability_type, &options, &config)?
            }
            PlanTarget::Taxonomy {
                names,
                post_types,
                options,
            } => cli::cmd_plan_taxonomy(&names, &post_types, &options, &config)?,
        },
        Command::Capabilities {
            noun,
            plural,
            permissions,
        } => {
            let capability_type = cli::capability_type(&noun, plural.as_deref())?;
            cli::cmd_capabilities(&capability_type, &permissions, &config)?
        }
        Command::Role {
            names,
            capability_type,
            plural,
            permissions,
        } => {
            let capability_type = cli::capability_type(&capability_type, plural.as_deref())?;
            cli::cmd_role(&names, capability_type, permissions, &config)?
        }
    };

    debug!(bytes = output.len(), "command complete");
    println!("{output}");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
