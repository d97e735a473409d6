use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use collegeqa_cli::cli::{Cli, Command};
use collegeqa_cli::render;
use collegeqa_core::config::{expand_path, Config};
use collegeqa_router::RetrievalSession;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("COLLEGEQA_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn open_session(cli: &Cli) -> anyhow::Result<RetrievalSession> {
    let mut settings = Config::load()?.settings()?;
    if let Some(backend) = cli.backend {
        settings.retrieval.backend = backend.into();
    }
    let records = match &cli.records {
        Some(dir) => dir.clone(),
        None => expand_path(&settings.data.records_dir),
    };
    info!(records = %records.display(), backend = ?settings.retrieval.backend, "opening session");
    RetrievalSession::open_dir(&settings, &records, !cli.quiet)
        .with_context(|| format!("loading records from {}", records.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let session = open_session(&cli)?;

    match &cli.command {
        Command::Query(args) => {
            let top_k = args.top_k.unwrap_or(session.default_top_k());
            let answer = session.answer(&args.text, top_k)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", render::answer_text(&answer));
            }
        }
        Command::Classify { text } => {
            println!("{}", render::classification_line(&session.classify(text)));
        }
        Command::Stats { json } => stats(&session, *json)?,
        Command::Interactive { top_k } => {
            interactive(&session, top_k.unwrap_or(session.default_top_k()))?;
        }
    }
    Ok(())
}

fn stats(session: &RetrievalSession, json: bool) -> anyhow::Result<()> {
    let corpus = session.corpus();
    let stats = corpus.stats();
    let categories = corpus.category_counts();
    let degraded = session.engine().degraded().map(ToString::to_string);
    if json {
        let value = serde_json::json!({
            "documents": stats.documents,
            "entities": stats.entities,
            "categories": categories,
            "backend": session.backend().to_string(),
            "degraded": degraded,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("Documents: {}", stats.documents);
    println!("Entities:  {}", stats.entities);
    println!("Backend:   {}", session.backend());
    if let Some(reason) = degraded {
        println!("Degraded:  {reason}");
    }
    println!("Categories ({}):", stats.categories);
    for (category, count) in categories {
        println!("  {category}: {count}");
    }
    Ok(())
}

fn interactive(session: &RetrievalSession, top_k: usize) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("Ask about a college (type `quit` to exit).");
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            break;
        }
        if text.is_empty() {
            continue;
        }
        match session.answer(text, top_k) {
            Ok(answer) => println!("{}\n", render::answer_text(&answer)),
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
