use std::path::Path;

use anyhow::Result;
use clap::Parser;
use revivir::{
    cli::{Cli, Command, OutputFormat},
    detections::{DetectionHit, RetroDetectionEngine},
    entities::EntityExtractor,
    evidence::{evidence_hash, EvidenceChain},
    json_output::JsonReport,
    mitre::{MitreMapper, MitreTechnique},
    replay::{JsonlReplaySource, ReplaySource},
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print the entity footprint of a replayed timeline
fn print_entities(extractor: &EntityExtractor) {
    println!("Processes ({}):", extractor.processes().len());
    for process in extractor.processes() {
        println!("  pid={} image={}", process.pid, process.image);
    }
    println!();

    println!("Networks ({}):", extractor.networks().len());
    for network in extractor.networks() {
        println!("  dst={} port={}", network.dst, network.port);
    }
    println!();

    println!("Files ({}):", extractor.files().len());
    for file in extractor.files() {
        println!("  path={}", file.path);
    }
}

/// Print ATT&CK annotations in timeline order
fn print_techniques(techniques: &[MitreTechnique]) {
    println!("ATT&CK Techniques ({}):", techniques.len());
    println!("─────────────────────────────────────────");
    for technique in techniques {
        println!(
            "  [seq {}] {} {}: {}",
            technique.event_seq, technique.technique_id, technique.name, technique.rationale
        );
    }
}

/// Print detection hits in timeline order
fn print_detections(hits: &[DetectionHit]) {
    if hits.is_empty() {
        println!("No detections fired.");
        return;
    }
    println!("Hits ({}):", hits.len());
    println!("─────────────────────────────────────────");
    for hit in hits {
        println!("  [seq {}] {} {}", hit.event_seq, hit.rule_id, hit.description);
        println!("          {}", hit.evidence);
    }
}

/// Replay a capture and report entities, techniques, and the sealed digest
fn run_analyze(input: &Path, format: OutputFormat) -> Result<()> {
    let session = JsonlReplaySource::new(input).load()?;
    let events = session.replay();

    let mut extractor = EntityExtractor::new();
    extractor.extract(events);
    let techniques = MitreMapper::new().map_timeline(events);

    let mut chain = EvidenceChain::new();
    let digest = chain.add_snapshot(events);

    match format {
        OutputFormat::Json => {
            let mut report = JsonReport::new();
            report.set_events(events.to_vec());
            report.set_entities(&extractor);
            report.set_techniques(techniques);
            report.set_evidence_digest(digest);
            println!("{}", report.to_json()?);
        }
        OutputFormat::Text => {
            println!("=== Timeline Analysis ===");
            println!("Source: {}", input.display());
            println!("Events replayed: {}", session.len());
            println!();
            print_entities(&extractor);
            println!();
            print_techniques(&techniques);
            println!();
            println!("Evidence digest: {digest}");
        }
    }

    Ok(())
}

/// Sweep a replayed capture with the retroactive rule set
fn run_detect(input: &Path, format: OutputFormat) -> Result<()> {
    let session = JsonlReplaySource::new(input).load()?;
    let events = session.replay();

    let engine = RetroDetectionEngine::with_default_rules();
    let hits = engine.run(events);

    match format {
        OutputFormat::Json => {
            let mut report = JsonReport::new();
            report.set_events(events.to_vec());
            report.set_detections(hits);
            println!("{}", report.to_json()?);
        }
        OutputFormat::Text => {
            println!("=== Retroactive Detection ===");
            println!("Source: {}", input.display());
            println!("Events replayed: {}", session.len());
            println!("Rules applied: {}", engine.rule_count());
            println!();
            print_detections(&hits);
        }
    }

    Ok(())
}

/// Replay twice, compare digests, and verify a two-link custody chain
fn run_verify(input: &Path, format: OutputFormat) -> Result<()> {
    let first = JsonlReplaySource::new(input).load()?;
    let second = JsonlReplaySource::new(input).load()?;

    let first_digest = evidence_hash(first.replay());
    let second_digest = evidence_hash(second.replay());
    let deterministic = first_digest == second_digest;

    let mut chain = EvidenceChain::new();
    chain.add_snapshot(first.replay());
    let head = chain.add_snapshot(second.replay());
    let chain_ok = chain.verify();
    let verified = deterministic && chain_ok;

    match format {
        OutputFormat::Json => {
            let mut report = JsonReport::new();
            report.set_events(first.replay().to_vec());
            report.set_evidence_digest(head);
            report.set_chain_verified(verified);
            println!("{}", report.to_json()?);
        }
        OutputFormat::Text => {
            println!("=== Evidence Verification ===");
            println!("Source: {}", input.display());
            println!("Events replayed: {}", first.len());
            println!("Replay digest:    {first_digest}");
            println!("Re-replay digest: {second_digest}");
            println!(
                "Replay determinism: {}",
                if deterministic { "ok" } else { "MISMATCH" }
            );
            println!(
                "Chain integrity: {} ({} links)",
                if chain_ok { "ok" } else { "BROKEN" },
                chain.len()
            );
        }
    }

    if !verified {
        anyhow::bail!("evidence verification failed for {}", input.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match args.command {
        Command::Analyze { input } => run_analyze(&input, args.format),
        Command::Detect { input } => run_detect(&input, args.format),
        Command::Verify { input } => run_verify(&input, args.format),
    }
}
