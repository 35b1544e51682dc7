//! Encounter client binary.
//!
//! Runs the built-in two-encounter campaign headless: a scripted pilot drags
//! cards through the disposition and ritual scenes, waits out every fate
//! reveal, and the results are reconciled into the campaign.
//!
//! ```bash
//! RUST_LOG=runtime=debug ENCOUNTER_SEED=42 cargo run -p encounter-client
//! ```

use anyhow::Result;
use encounter_client::{Client, ClientConfig, EncounterReport, content};
use runtime::{CampaignState, CommitOutcome, LogLevel};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(seed = config.seed, allow_flee = config.allow_flee, "starting encounter client");

    let mut client = Client::builder()
        .encounters(content::encounters(config.allow_flee))
        .config(config)
        .content(content::content())
        .hero(content::hero())
        .build()?;

    let reports = client.run()?;
    for report in &reports {
        print_report(report);
    }

    if let Some(outcome) = client.resubmit_last()? {
        tracing::info!(
            duplicate_ignored = outcome == CommitOutcome::AlreadyApplied,
            "resubmitted last result"
        );
    }

    print_campaign(&client.campaign().state);
    Ok(())
}

fn print_report(report: &EncounterReport) {
    let outcome = report
        .outcome
        .map_or_else(|| "abandoned".to_string(), |outcome| outcome.to_string());
    println!("== {} ({:?}): {} after {} rounds", report.encounter, report.variant, outcome, report.rounds);

    for entry in &report.log {
        let marker = match entry.level {
            LogLevel::Info => ' ',
            LogLevel::Warning => '!',
            LogLevel::Error => 'x',
        };
        println!("  {marker} [r{:>2}] {}", entry.round, entry.text);
    }

    let stats = &report.stats;
    println!(
        "  turns {} | dealt {} | taken {} | cards {} | fate {}",
        stats.turns_played,
        stats.total_damage_dealt,
        stats.total_damage_taken,
        stats.cards_played,
        stats.fate_cards_drawn
    );

    match &report.commit {
        Some(CommitOutcome::Committed(summary)) => println!(
            "  committed: hp {} -> {}, faith +{}, loot +{}, flags +{}",
            summary.hp_before, summary.hp_after, summary.faith_gained, summary.loot_added, summary.flags_set
        ),
        Some(CommitOutcome::AlreadyApplied) => println!("  already applied"),
        None => println!("  not committed"),
    }
}

fn print_campaign(state: &CampaignState) {
    let hero = &state.hero;
    println!(
        "== {}: hp {}/{} faith {} deck {} cards, resonance {:+.1}",
        hero.name,
        hero.hp,
        hero.max_hp,
        hero.faith,
        hero.deck.len(),
        state.world_resonance
    );
    let fate = state.fate_deck.as_ref().map_or(0, |deck| deck.len());
    println!("  fate deck: {fate} cards to draw");
    for (flag, set) in &state.world_flags {
        println!("  flag {flag} = {set}");
    }
    for (encounter, outcome) in &state.history {
        println!("  {encounter}: {outcome}");
    }
}
