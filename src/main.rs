use anyhow::{Context, Result};
use pokedex_sqlite::{
    clean::{clean_database, CleanConfig, CleanReport},
    cli::{CleanArgs, Cli, Commands, Lookup},
    download::{ensure_references, CacheManager, PokeApiClient, ReferenceNames, SpeciesSource},
    filter::resolve_kinds,
    query::{self, normalize_name, register_pokemon},
    schema::EntityKind,
    server::{self, AppState},
    ui::{Phase, SilentUi, Ui, UiApp},
    writer::{open_read_only, open_read_write, seed_dirty_dataset},
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // The full-screen view owns the terminal, so log lines would corrupt it
    if !matches!(cli.command, Commands::Clean { tui: true, .. }) {
        init_tracing();
    }

    match cli.command {
        Commands::Seed { db } => {
            let summary = seed_dirty_dataset(&db)
                .with_context(|| format!("Failed to seed {:?}", db))?;
            println!(
                "Seeded {:?}: {} types, {} abilities, {} trainers, {} pokemon, {} assignments",
                db,
                summary.types,
                summary.abilities,
                summary.trainers,
                summary.pokemon,
                summary.assignments
            );
        }

        Commands::Clean { db, options, tui } => {
            let start = Instant::now();

            let report = if tui {
                let mut ui = UiApp::new()?;
                match run_clean(&db, &options, &mut ui) {
                    Ok(report) => {
                        ui.finish(&summary(&report, start))?;
                        report
                    }
                    Err(e) => {
                        ui.restore()?;
                        return Err(e);
                    }
                }
            } else {
                run_clean(&db, &options, &mut SilentUi::new())?
            };

            print_report(&report);
            println!("\n{}", summary(&report, start));
        }

        Commands::Serve {
            db,
            options,
            host,
            port,
            no_clean,
        } => {
            if no_clean {
                tracing::info!("skipping cleaning");
            } else {
                let start = Instant::now();
                let report = run_clean(&db, &options, &mut SilentUi::new())?;
                tracing::info!("{}", summary(&report, start));
            }

            // Held here so the blocking client is dropped after the runtime
            let client = Arc::new(PokeApiClient::new()?);
            let species: Arc<dyn SpeciesSource + Send + Sync> = client.clone();
            let state = Arc::new(AppState::new(db, species));

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(server::serve(SocketAddr::new(host, port), state))?;
        }

        Commands::Query { lookup, db, name } => {
            let conn = open_read_only(&db).with_context(|| format!("Failed to open {:?}", db))?;
            let name = normalize_name(&name)?;
            let names = match lookup {
                Lookup::Ability => query::pokemon_by_ability(&conn, &name)?,
                Lookup::Type => query::pokemon_by_type(&conn, &name)?,
                Lookup::Trainers => query::trainers_by_pokemon(&conn, &name)?,
                Lookup::Abilities => query::abilities_by_pokemon(&conn, &name)?,
            };
            for name in names {
                println!("{}", name);
            }
        }

        Commands::Register { db, pokemon, trainer } => {
            let mut conn =
                open_read_write(&db).with_context(|| format!("Failed to open {:?}", db))?;
            let client = PokeApiClient::new()?;
            let registration = register_pokemon(&mut conn, &client, &pokemon, &trainer)?;
            println!("{}", serde_json::to_string_pretty(&registration)?);
        }

        Commands::ListKinds => {
            println!("Entity kinds in cleaning order:\n");
            for kind in EntityKind::cleaning_order()? {
                println!("  {}", kind);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex_sqlite=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_clean(db: &Path, options: &CleanArgs, ui: &mut impl Ui) -> Result<CleanReport> {
    let kinds = resolve_kinds(options.only.clone(), options.skip.clone())?;
    let config = CleanConfig {
        garbage_markers: options.markers.clone(),
        similarity_threshold: options.threshold,
    };
    config.validate()?;

    ui.set_phase(Phase::FetchingReferences);
    let references = load_references(options, &kinds)?;
    ui.log(format!(
        "Reference names: {} types, {} abilities, {} pokemon",
        references.types.len(),
        references.abilities.len(),
        references.pokemon.len()
    ));

    let mut conn = open_read_write(db).with_context(|| format!("Failed to open {:?}", db))?;
    ui.set_info(format!("Database: {}", db.display()));

    let report = clean_database(&mut conn, &kinds, &references, &config, ui)?;
    Ok(report)
}

fn load_references(options: &CleanArgs, kinds: &[EntityKind]) -> Result<ReferenceNames> {
    if let Some(path) = &options.references {
        return ReferenceNames::from_json_file(path);
    }
    // Trainers have no reference list
    if kinds.iter().all(|k| *k == EntityKind::Trainer) {
        return Ok(ReferenceNames::default());
    }

    let cache = CacheManager::new(options.cache_dir.clone())?;
    let client = PokeApiClient::new()?;
    ensure_references(&cache, &client, options.refresh)
}

fn print_report(report: &CleanReport) {
    println!(
        "{:<10} {:>8} {:>9} {:>10} {:>11} {:>10}",
        "kind", "removed", "corrected", "normalized", "collapsed", "remapped"
    );
    for (kind, entry) in &report.kinds {
        println!(
            "{:<10} {:>8} {:>9} {:>10} {:>11} {:>10}",
            kind.to_string(),
            entry.removed,
            entry.corrected,
            entry.normalized,
            entry.collapsed,
            entry.remapped
        );
    }
}

fn summary(report: &CleanReport, start: Instant) -> String {
    format!(
        "Cleaning finished: {} changes in {:.1}s",
        report.changes(),
        start.elapsed().as_secs_f64()
    )
}
