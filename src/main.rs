use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use wedding_budget::cli::{
    handle_actual, handle_add, handle_apply_patches, handle_contract, handle_export,
    handle_history, handle_merge, handle_plan, handle_prefs, handle_remove, handle_show,
    handle_total, AddArgs, CliContext, ContractArgs, ExportFormat, PlanArgs, PreferenceArgs,
};
use wedding_budget::config::{PlannerPaths, Settings};

#[derive(Parser)]
#[command(
    name = "wedbudget",
    author = "Kaylee Beyene",
    version,
    about = "Wedding budget allocation engine",
    long_about = "Plans a wedding budget from a total, guest count, location and date, \
                  then keeps the category breakdown summing to 100% as categories are \
                  removed, merged, added or re-weighted."
)]
struct Cli {
    /// Session to work on (defaults to the configured session)
    #[arg(short, long, global = true, env = "WEDDING_BUDGET_SESSION")]
    session: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a new budget
    Plan(PlanArgs),

    /// Show the category breakdown
    Show {
        /// Show one category in detail
        #[arg(short, long)]
        category: Option<String>,
        /// Also print the rationale notes
        #[arg(long)]
        notes: bool,
    },

    /// Remove a category and spread its share over the rest
    #[command(alias = "rm")]
    Remove {
        /// Category id
        category: String,
    },

    /// Merge one category into another
    Merge {
        /// Category to fold away
        source: String,
        /// Category that absorbs it
        into: String,
    },

    /// Add a category
    Add(AddArgs),

    /// Update preferences and re-weight costs
    Prefs {
        #[command(flatten)]
        preferences: PreferenceArgs,
        /// Replace all saved preferences instead of overlaying them
        #[arg(long)]
        replace: bool,
    },

    /// Record actual spending on a category
    Actual {
        /// Category id
        category: String,
        /// Amount spent so far
        amount: String,
    },

    /// Attach a vendor contract to a category
    Contract(ContractArgs),

    /// Apply assistant patches saved as JSON
    #[command(name = "apply-patches")]
    ApplyPatches {
        /// Reply or patch array file
        file: PathBuf,
        /// Message the patches answer
        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Change the total budget; shares stay, estimates scale
    Total {
        /// New total budget
        amount: String,
    },

    /// Export the session
    Export {
        /// Output file (stdout if omitted)
        output: Option<PathBuf>,
        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
    },

    /// Show recent audit entries
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },

    /// Show current configuration and paths
    Config {
        /// Write the current settings to disk
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let paths = PlannerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let ctx = CliContext::new(paths, settings, cli.session);

    match cli.command {
        Some(Commands::Plan(args)) => handle_plan(&ctx, args)?,
        Some(Commands::Show { category, notes }) => handle_show(&ctx, category, notes)?,
        Some(Commands::Remove { category }) => handle_remove(&ctx, &category)?,
        Some(Commands::Merge { source, into }) => handle_merge(&ctx, &source, &into)?,
        Some(Commands::Add(args)) => handle_add(&ctx, args)?,
        Some(Commands::Prefs {
            preferences,
            replace,
        }) => handle_prefs(&ctx, preferences, replace)?,
        Some(Commands::Actual { category, amount }) => handle_actual(&ctx, &category, &amount)?,
        Some(Commands::Contract(args)) => handle_contract(&ctx, args)?,
        Some(Commands::ApplyPatches { file, message }) => {
            handle_apply_patches(&ctx, file, &message)?
        }
        Some(Commands::Total { amount }) => handle_total(&ctx, &amount)?,
        Some(Commands::Export { output, format }) => handle_export(&ctx, output, format)?,
        Some(Commands::History { count }) => handle_history(&ctx, count)?,
        Some(Commands::Config { save }) => {
            if save {
                ctx.settings.save(&ctx.paths)?;
            }
            println!("Wedding Budget Configuration");
            println!("============================");
            println!("Base directory:   {}", ctx.paths.base_dir().display());
            println!("Sessions:         {}", ctx.paths.sessions_dir().display());
            println!("Audit log:        {}", ctx.paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Session:          {}", ctx.session);
            println!("  Currency symbol:  {}", ctx.settings.currency_symbol);
            println!("  Audit enabled:    {}", ctx.settings.audit_enabled);
            println!(
                "  Catering minimum: {} per guest",
                ctx.money(ctx.settings.allocation.catering_per_guest_minimum)
            );
            println!(
                "  Favors minimum:   {} per guest",
                ctx.money(ctx.settings.allocation.favors_per_guest_minimum)
            );
            println!(
                "  Cost range:       {:.2}x - {:.2}x",
                ctx.settings.allocation.range_low, ctx.settings.allocation.range_high
            );
        }
        None => {
            println!("wedbudget - wedding budget allocation engine");
            println!();
            println!("Run 'wedbudget --help' for usage information.");
            println!("Run 'wedbudget plan <TOTAL> <GUESTS> --city <CITY> --country <COUNTRY> --date <YYYY-MM-DD>' to start.");
        }
    }

    Ok(())
}
