//! hornkb CLI: load facts and rules, ask questions.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;

use hornkb::analysis::analyze;
use hornkb::config::HornConfig;
use hornkb::kb::KnowledgeBase;
use hornkb::logic::{Fact, Rule};
use hornkb::packs::{KnowledgePack, bundled_packs};
use hornkb::program::{parse_fact, parse_program};

#[derive(Parser)]
#[command(
    name = "hornkb",
    version,
    about = "Horn-clause knowledge base with backward chaining"
)]
struct Cli {
    /// TOML config file ([resolver] and [log] sections).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask whether a goal holds, e.g. `mortal(socrates)` or `mortal(X)`.
    Query {
        /// The goal, in program syntax.
        goal: String,

        /// Program (.kb) or pack (.toml) files to load first.
        #[arg(long = "load", short = 'l')]
        files: Vec<PathBuf>,

        /// Bundled packs to load first.
        #[arg(long = "pack", short = 'p')]
        packs: Vec<String>,

        /// Print every answer instead of the first.
        #[arg(long)]
        all: bool,

        /// Maximum number of answers printed with --all.
        #[arg(long, default_value = "100")]
        limit: usize,

        /// Print search counters.
        #[arg(long)]
        stats: bool,
    },

    /// Run the classic Socrates example.
    Demo,

    /// Report unsafe rules, recursive and undefined predicates.
    Check {
        #[arg(long = "load", short = 'l')]
        files: Vec<PathBuf>,

        #[arg(long = "pack", short = 'p')]
        packs: Vec<String>,
    },

    /// Print the loaded facts and rules.
    Export {
        #[arg(long = "load", short = 'l')]
        files: Vec<PathBuf>,

        #[arg(long = "pack", short = 'p')]
        packs: Vec<String>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },

    /// List the bundled knowledge packs.
    Packs,

    /// Print the effective configuration as TOML.
    Config {
        /// Also write it to this file.
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    /// Program text that `--load` reads back.
    Program,
}

#[derive(Serialize)]
struct Export<'a> {
    facts: Vec<&'a Fact>,
    rules: &'a [Rule],
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HornConfig::load(path)?,
        None => HornConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .init();

    let mut kb = KnowledgeBase::with_config(config.resolver.clone());

    match cli.command {
        Commands::Query {
            goal,
            files,
            packs,
            all,
            limit,
            stats,
        } => {
            load_sources(&mut kb, &files, &packs)?;
            let goal = parse_fact(&goal)?;

            if all {
                let answers = kb.answers(&goal, limit);
                if answers.is_empty() {
                    println!("{goal} -> false");
                }
                for answer in &answers {
                    if answer.is_empty() {
                        println!("{goal} -> true");
                    } else {
                        println!("{}", answer.apply(&goal));
                    }
                }
            } else {
                let (answer, resolution) = kb.resolve_with_stats(&goal);
                match answer {
                    Some(answer) if !answer.is_empty() => println!("{goal} -> true {answer}"),
                    Some(_) => println!("{goal} -> true"),
                    None => println!("{goal} -> false"),
                }
                if stats {
                    println!(
                        "steps={} passes={} max_depth={} loop_prunes={} depth_prunes={} lemmas={}{}",
                        resolution.steps,
                        resolution.passes,
                        resolution.max_depth_reached,
                        resolution.loop_prunes,
                        resolution.depth_prunes,
                        resolution.lemmas,
                        if resolution.budget_exhausted {
                            " (step budget exhausted)"
                        } else {
                            ""
                        }
                    );
                }
            }
        }

        Commands::Demo => {
            let report = KnowledgePack::bundled("socrates")?.apply(&mut kb)?;
            println!(
                "Loaded pack \"{}\": {} facts, {} rules",
                report.name, report.facts_added, report.rules_added
            );
            for rule in kb.rules() {
                println!("  rule: {rule}");
            }

            println!("--- Queries ---");
            for text in [
                "mortal(socrates)",
                "mortal(platao)",
                "mortal(joao)",
                "mortal(maria)",
                "homem(socrates)",
                "homem(zeus)",
            ] {
                let goal = parse_fact(text)?;
                println!("Query: {goal} -> {}", kb.query(&goal));
            }

            let goal = parse_fact("mortal(X)")?;
            let who: Vec<String> = kb
                .answers(&goal, usize::MAX)
                .iter()
                .filter_map(|answer| answer.value_of("X"))
                .map(|term| term.to_string())
                .collect();
            println!("Who is mortal? {}", who.join(", "));
        }

        Commands::Check { files, packs } => {
            load_sources(&mut kb, &files, &packs)?;
            println!("{} facts, {} rules", kb.len_facts(), kb.len_rules());
            println!("{}", analyze(&kb));
        }

        Commands::Export {
            files,
            packs,
            format,
        } => {
            load_sources(&mut kb, &files, &packs)?;
            let mut facts: Vec<&Fact> = kb.facts().collect();
            facts.sort();
            match format {
                ExportFormat::Json => {
                    let export = Export {
                        facts,
                        rules: kb.rules(),
                    };
                    let json = serde_json::to_string_pretty(&export).into_diagnostic()?;
                    println!("{json}");
                }
                ExportFormat::Program => {
                    for fact in facts {
                        println!("{fact}.");
                    }
                    for rule in kb.rules() {
                        println!("{rule}.");
                    }
                }
            }
        }

        Commands::Packs => {
            for pack in bundled_packs() {
                println!(
                    "{:<10} {} ({} facts, {} rules)",
                    pack.name,
                    pack.description,
                    pack.facts.len(),
                    pack.rules.len()
                );
            }
        }

        Commands::Config { write } => {
            print!("{}", config.to_toml()?);
            if let Some(path) = write {
                config.save(&path)?;
                eprintln!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}

/// Load bundled packs, then files: `.toml` files as packs, anything else as
/// program text.
fn load_sources(kb: &mut KnowledgeBase, files: &[PathBuf], packs: &[String]) -> Result<()> {
    for name in packs {
        KnowledgePack::bundled(name)?.apply(kb)?;
    }
    for path in files {
        load_file(kb, path)?;
    }
    Ok(())
}

fn load_file(kb: &mut KnowledgeBase, path: &Path) -> Result<()> {
    if path.extension().is_some_and(|ext| ext == "toml") {
        KnowledgePack::load(path)?.apply(kb)?;
        return Ok(());
    }
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read program file {}", path.display()))?;
    let program = parse_program(&text)
        .wrap_err_with(|| format!("in program file {}", path.display()))?;
    let clauses = program.len();
    kb.extend_from_program(program)?;
    tracing::info!(path = %path.display(), clauses, "program loaded");
    Ok(())
}
