//! wheel: command-line lotto wheel generator
//!
//! ## Usage
//!
//! ```bash
//! wheel solve --range 1-10 -k 4 -m 2   # Generate and save a wheel
//! wheel solve --pick even -k 3         # Quick pick 10 numbers from the board
//! wheel show                           # Saved pool and tickets
//! wheel cost --quad 2                  # Change a stake and price the tickets
//! wheel audit                          # Re-check coverage of saved tickets
//! wheel clear                          # Forget the saved selection
//! ```

mod commands;
mod output;

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wheel_core::{
    audit_cover, load_config_or_default, system_cost, ticket_cost, validate_config,
    CancellationToken, Config, Engine, SavedSelection, SelectionStore, SolveDispatcher,
    SqliteSelectionStore,
};

use commands::{Cli, Commands, CostArgs, SolveArgs};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let db_path = cli.db.clone().unwrap_or_else(|| config.database.path.clone());
    debug!("Using database {:?}", db_path);
    let store = SqliteSelectionStore::new(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    match cli.command {
        Commands::Solve(args) => solve(&config, &store, args).await,
        Commands::Show => show(&config, &store),
        Commands::Cost(args) => cost(&store, args),
        Commands::Audit => audit(&store),
        Commands::Clear => clear(&store),
    }
}

async fn solve(config: &Config, store: &dyn SelectionStore, args: SolveArgs) -> Result<()> {
    let saved = store.load().context("Failed to load saved selection")?;

    let pool = match (args.pool(), saved.as_ref()) {
        (Some(pool), _) => pool,
        (None, Some(saved)) => saved.pool.clone(),
        (None, None) => bail!("No pool given and no saved selection; use --numbers or --range"),
    };
    let defaults = SavedSelection::default();
    let k = args.k.or(saved.as_ref().map(|s| s.k)).unwrap_or(defaults.k);
    let m = args.m.or(saved.as_ref().map(|s| s.m)).unwrap_or(defaults.m);
    let stakes = saved.as_ref().map(|s| s.stakes).unwrap_or(config.stakes);

    let dispatcher = SolveDispatcher::from_config(
        Engine::new(config.engine.clone()),
        config.offload.as_ref(),
    )
    .context("Failed to set up remote solver")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling run");
                cancel.cancel();
            }
        });
    }

    let mut selection = SavedSelection::new(pool, k, m, stakes);
    let estimated_tickets = estimate(dispatcher.engine(), &selection);

    let pb = output::progress_bar(args.json);
    let result = dispatcher
        .solve(
            selection.request(),
            Some(output::progress_callback(&pb)),
            cancel,
        )
        .await;
    pb.finish_and_clear();
    let outcome = result?;

    let solution = &outcome.solution;
    let cost = system_cost(&solution.tickets, &stakes);
    if args.json {
        let json = serde_json::to_string_pretty(&output::SolveOutput {
            pool: &selection.pool,
            k,
            m,
            estimated_tickets,
            location: outcome.location,
            tickets: &solution.tickets,
            stats: &solution.stats,
            cost: &cost,
        })?;
        println!("{}", json);
    } else {
        output::print_tickets(&solution.tickets);
        output::print_stats(&solution.stats, outcome.location);
        output::print_estimate(estimated_tickets);
        output::print_cost(&cost, ticket_cost(k, &stakes));
    }

    if !args.no_save {
        selection.last_tickets = Some(solution.tickets.clone());
        store.save(&selection).context("Failed to save selection")?;
    }
    Ok(())
}

fn load_saved(store: &dyn SelectionStore) -> Result<SavedSelection> {
    store
        .load()
        .context("Failed to load saved selection")?
        .context("No saved selection; run `wheel solve` first")
}

/// Pre-solve ticket estimate, if the selection is solvable under `engine`'s limits.
fn estimate(engine: &Engine, selection: &SavedSelection) -> Option<u64> {
    engine
        .plan(&selection.request())
        .ok()
        .map(|plan| plan.estimated_tickets)
}

fn show(config: &Config, store: &dyn SelectionStore) -> Result<()> {
    let saved = load_saved(store)?;
    output::print_selection(&saved);
    output::print_estimate(estimate(&Engine::new(config.engine.clone()), &saved));
    output::print_stakes(&saved.stakes);
    match &saved.last_tickets {
        Some(tickets) => {
            println!();
            output::print_tickets(tickets);
        }
        None => println!("No tickets generated yet"),
    }
    Ok(())
}

fn cost(store: &dyn SelectionStore, args: CostArgs) -> Result<()> {
    let mut saved = load_saved(store)?;

    if args.has_changes() {
        let stakes = &mut saved.stakes;
        stakes.single = args.single.unwrap_or(stakes.single);
        stakes.pair = args.pair.unwrap_or(stakes.pair);
        stakes.triple = args.triple.unwrap_or(stakes.triple);
        stakes.quad = args.quad.unwrap_or(stakes.quad);
        if [stakes.single, stakes.pair, stakes.triple, stakes.quad]
            .iter()
            .any(|s| !s.is_finite() || *s < 0.0)
        {
            bail!("Stakes must be non-negative numbers");
        }
        store.save(&saved).context("Failed to save stakes")?;
    }

    output::print_stakes(&saved.stakes);
    let per_ticket = ticket_cost(saved.k, &saved.stakes);
    match &saved.last_tickets {
        Some(tickets) => output::print_cost(&system_cost(tickets, &saved.stakes), per_ticket),
        None => println!("Cost per ticket: {:.2} (no tickets generated yet)", per_ticket),
    }
    Ok(())
}

fn audit(store: &dyn SelectionStore) -> Result<()> {
    let saved = load_saved(store)?;
    let tickets = saved
        .last_tickets
        .as_ref()
        .context("No tickets generated yet; run `wheel solve` first")?;

    let report = audit_cover(&saved.pool, saved.m, tickets).context("Audit failed")?;
    output::print_report(&report);
    if !report.fully_certified {
        bail!(
            "Saved tickets do not cover every {}-number combination",
            saved.m
        );
    }
    Ok(())
}

fn clear(store: &dyn SelectionStore) -> Result<()> {
    if store.clear().context("Failed to clear saved selection")? {
        println!("Saved selection cleared");
    } else {
        println!("Nothing to clear");
    }
    Ok(())
}
