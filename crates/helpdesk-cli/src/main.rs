#![forbid(unsafe_code)]

//! `hd`: a one-shot demo driver for the helpdesk core.
//!
//! State is process-lifetime only, so every invocation seeds the demo data
//! fresh and then drives the requested flow. The binary plays the part of
//! the session layer: it authenticates, consults the policy, and only then
//! calls into the stores.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use helpdesk_core::policy::{self, Action};
use helpdesk_core::{DashboardStats, Helpdesk, Status, StatusChange, Ticket, User};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "helpdesk: role-based ticketing with an auditable lifecycle",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed demo data and walk a full support exchange, printing the
    /// audit trail as it grows.
    Demo,
    /// Seed demo data and print the dashboard summary.
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut desk = Helpdesk::with_system_clock();
    desk.seed_demo().context("seed demo data")?;

    match cli.command {
        Commands::Demo => run_demo(&mut desk, cli.json),
        Commands::Stats => print_stats(&desk.dashboard(), cli.json),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!("helpdesk_core={default_level},hd={default_level}"))
        });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Authenticate against the seeded identity store, the way a login form
/// would.
fn login(desk: &Helpdesk, username: &str, password: &str) -> Result<User> {
    let user = desk
        .identity
        .authenticate(username, password)
        .with_context(|| format!("login as {username}"))?
        .clone();
    info!(username = %user.username, role = %user.role, "logged in");
    Ok(user)
}

fn run_demo(desk: &mut Helpdesk, json: bool) -> Result<()> {
    let customer = login(desk, "customer1", "123")?;
    let supervisor = login(desk, "supervisor", "123")?;
    let agent = login(desk, "agent2", "123")?;

    policy::authorize(&customer, Action::CreateTicket)?;
    let network = desk.categories.find_by_name("Network").map(|c| c.id);
    let id = desk
        .tickets
        .create(
            "Wifi drops in the east wing",
            "Every laptop loses the connection around 10am.",
            &customer,
            network,
        )?
        .id;
    println!("filed ticket #{id} (open)");

    policy::authorize(&supervisor, Action::AssignTicket)?;
    desk.tickets.assign(id, &agent, &supervisor)?;
    println!("assigned to {} (in_progress)", agent.username);

    let snapshot = fetch(desk, id)?;
    policy::authorize_ticket(&agent, Action::ReplyTicket, &snapshot)?;
    desk.tickets
        .reply(id, &agent, "A faulty access point; swapping it now.")?;
    println!("{} replied (answered)", agent.username);

    let snapshot = fetch(desk, id)?;
    policy::authorize_ticket(&customer, Action::ReplyTicket, &snapshot)?;
    desk.tickets
        .reply(id, &customer, "Still dropping out after the swap.")?;
    println!("{} followed up (reopened)", customer.username);

    let snapshot = fetch(desk, id)?;
    policy::authorize_ticket(&agent, Action::ReplyTicket, &snapshot)?;
    desk.tickets
        .reply(id, &agent, "Bad cable on the uplink too; replaced it.")?;
    println!("{} replied (answered)", agent.username);

    policy::authorize(&supervisor, Action::CloseTicket)?;
    match desk.tickets.set_status(id, &supervisor, Status::Closed)? {
        StatusChange::Changed { from, to } => println!("closed ({from} -> {to})"),
        StatusChange::NoOp => println!("already closed, nothing to do"),
    }

    let ticket = fetch(desk, id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        println!("\naudit trail for #{id}:");
        for log in &ticket.logs {
            let details = if log.details.is_empty() {
                String::new()
            } else {
                format!(" -- {}", log.details)
            };
            println!("  {} {}{details}", log.created_at.format("%H:%M:%S"), log.action);
        }
        println!();
    }

    print_stats(&desk.dashboard(), json)
}

fn fetch(desk: &Helpdesk, id: helpdesk_core::TicketId) -> Result<Ticket> {
    match desk.tickets.by_id(id) {
        Some(ticket) => Ok(ticket.clone()),
        None => bail!("ticket {id} vanished from the store"),
    }
}

fn print_stats(stats: &DashboardStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("tickets: {} total", stats.total_tickets);
    println!(
        "  open {}  in_progress {}  answered {}  closed {}",
        stats.open_tickets, stats.in_progress_tickets, stats.answered_tickets, stats.closed_tickets
    );
    println!("  new today: {}", stats.new_tickets_today);
    println!("workload:");
    for (agent, count) in &stats.agent_workload {
        println!("  {agent}: {count}");
    }
    println!(
        "recently updated: {}",
        stats
            .recently_updated
            .iter()
            .map(|id| format!("#{id}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
