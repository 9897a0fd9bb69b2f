//! Output formatting and progress reporting

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use wheel_core::{
    CostBreakdown, CoverageReport, ProgressCallback, SavedSelection, SolveLocation, SolveStats,
    StakeAmounts, Ticket,
};

/// Resolution of the progress bar.
const PROGRESS_STEPS: u64 = 1000;

/// Progress bar driven by engine progress fractions.
pub fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(PROGRESS_STEPS);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {percent:>3}% {elapsed_precise} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Engine callback that moves `pb`.
pub fn progress_callback(pb: &ProgressBar) -> ProgressCallback {
    let pb = pb.clone();
    Arc::new(move |fraction: f64| {
        pb.set_position((fraction.clamp(0.0, 1.0) * PROGRESS_STEPS as f64) as u64);
    })
}

/// JSON shape of `wheel solve --json`.
#[derive(Debug, Serialize)]
pub struct SolveOutput<'a> {
    pub pool: &'a [i64],
    pub k: usize,
    pub m: usize,
    pub location: SolveLocation,
    pub tickets: &'a [Ticket],
    pub estimated_tickets: Option<u64>,
    pub stats: &'a SolveStats,
    pub cost: &'a CostBreakdown,
}

pub fn format_ticket(ticket: &[i64]) -> String {
    ticket
        .iter()
        .map(|n| format!("{:>3}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_tickets(tickets: &[Ticket]) {
    let width = tickets.len().to_string().len();
    for (i, ticket) in tickets.iter().enumerate() {
        println!("{:>width$}. {}", i + 1, format_ticket(ticket), width = width);
    }
}

pub fn print_stats(stats: &SolveStats, location: SolveLocation) {
    println!();
    println!("Universe:      {} subsets", stats.universe_size);
    println!("Candidates:    {} tickets", stats.candidate_pool_size);
    println!(
        "Tickets:       {} ({} greedy, {} forced)",
        stats.ticket_count, stats.greedy_tickets, stats.forced_tickets
    );
    println!(
        "Coverage:      {:.2}% ({} of {})",
        stats.coverage_percent, stats.covered, stats.universe_size
    );
    println!("Reduction:     {:.2}%", stats.reduction_percent);
    println!(
        "Certified:     {}",
        if stats.fully_certified { "yes" } else { "NO" }
    );
    let location = match location {
        SolveLocation::Local => "local",
        SolveLocation::Remote => "remote",
    };
    println!("Solved:        {} in {} ms", location, stats.elapsed_ms);
}

/// `~N tickets`, or why there is no estimate.
pub fn format_estimate(estimated: Option<u64>) -> String {
    match estimated {
        Some(count) => format!("~{} tickets", count),
        None => "n/a (selection cannot be solved)".to_string(),
    }
}

pub fn print_estimate(estimated: Option<u64>) {
    println!("Estimate:      {}", format_estimate(estimated));
}

pub fn print_stakes(stakes: &StakeAmounts) {
    println!(
        "Stakes:        single {:.2}, pair {:.2}, triple {:.2}, quad {:.2}",
        stakes.single, stakes.pair, stakes.triple, stakes.quad
    );
}

pub fn print_cost(cost: &CostBreakdown, ticket_cost: f64) {
    println!(
        "Cost:          {:.2} ({} tickets x {:.2})",
        cost.total, cost.tickets, ticket_cost
    );
}

pub fn print_selection(selection: &SavedSelection) {
    println!(
        "Pool ({}):     {}",
        selection.pool.len(),
        format_ticket(&selection.pool).trim_start()
    );
    println!("Ticket size:   {}", selection.k);
    println!("Guarantee:     {}", selection.m);
    println!("Saved at:      {}", selection.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
}

pub fn print_report(report: &CoverageReport) {
    println!(
        "Coverage:      {:.2}% ({} of {})",
        report.coverage_percent, report.covered, report.universe_size
    );
    println!("Duplicates:    {}", report.duplicate_tickets);
    println!(
        "Certified:     {}",
        if report.fully_certified { "yes" } else { "NO" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ticket_pads_numbers() {
        assert_eq!(format_ticket(&[1, 22, 90]), "  1  22  90");
    }

    #[test]
    fn test_format_estimate() {
        assert_eq!(format_estimate(Some(8)), "~8 tickets");
        assert!(format_estimate(None).starts_with("n/a"));
    }

    #[test]
    fn test_hidden_progress_callback_is_safe() {
        let pb = progress_bar(true);
        let callback = progress_callback(&pb);
        callback(0.5);
        callback(1.5);
        assert_eq!(pb.position(), PROGRESS_STEPS);
    }
}
