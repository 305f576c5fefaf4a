//! `bdassist` - CLI for breakdown-assist
//!
//! This binary provides the command-line interface for logging breakdown
//! incidents, moving them through their lifecycle, and exporting them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;

use breakdown_assist::cli::{
    AddCommand, CardsCommand, Cli, Command, ConfigCommand, ExportCommand, ListCommand,
    OutputFormat, ShowCommand, UpdateCommand,
};
use breakdown_assist::config::StoreBackend;
use breakdown_assist::export::{card_lines, paginate_cards, to_csv};
use breakdown_assist::filter::{sort_recent_first, RecordFilter};
use breakdown_assist::{
    init_logging, Config, Error, MemoryStore, NewBreakdown, Policy, RecordManager, Session,
    SnapshotCache, SqliteStore, TabularStore, Transition,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Config commands don't need a store
    if let Command::Config(config_cmd) = &cli.command {
        return handle_config(&config, config_cmd);
    }

    match config.store.backend {
        StoreBackend::Sqlite => {
            let store =
                SqliteStore::open_with_table(config.database_path(), &config.store.table)?;
            run(build_manager(store, &config)?, &cli, &config)
        }
        StoreBackend::Memory => run(build_manager(MemoryStore::new(), &config)?, &cli, &config),
    }
}

fn build_manager<S: TabularStore>(
    store: S,
    config: &Config,
) -> Result<RecordManager<S>, Box<dyn std::error::Error>> {
    Ok(RecordManager::with_settings(
        store,
        SnapshotCache::with_ttl(config.cache_ttl()),
        Policy {
            enforce_resolver_required: config.policy.enforce_resolver_required,
        },
        config.timezone()?,
    ))
}

fn run<S: TabularStore>(
    mut manager: RecordManager<S>,
    cli: &Cli,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let actor = cli
        .actor
        .clone()
        .unwrap_or_else(|| config.session.actor.clone());
    let session = Session::new(actor);

    match &cli.command {
        Command::Add(cmd) => handle_add(&mut manager, &session, cmd),
        Command::Update(cmd) => handle_update(&mut manager, &session, cmd),
        Command::Show(cmd) => handle_show(&mut manager, cmd),
        Command::List(cmd) => handle_list(&mut manager, cmd),
        Command::Export(cmd) => handle_export(&mut manager, cmd),
        Command::Cards(cmd) => handle_cards(&mut manager, cmd, config),
        // Handled before the store was opened
        Command::Config(_) => Ok(()),
    }
}

fn handle_add<S: TabularStore>(
    manager: &mut RecordManager<S>,
    session: &Session,
    cmd: &AddCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let form = NewBreakdown {
        booking_id: cmd.booking_id.clone().unwrap_or_default(),
        customer_name: cmd.customer_name.clone().unwrap_or_default(),
        customer_mobile: cmd.customer_mobile.clone().unwrap_or_default(),
        pickup_location: cmd.pickup_location.clone().unwrap_or_default(),
        booking_days: cmd.booking_days,
        issue: cmd.issue.clone().unwrap_or_default(),
        vehicle_number: cmd.vehicle_number.clone().unwrap_or_default(),
        vehicle_model: cmd.vehicle_model.clone().unwrap_or_default(),
        vehicle_type: cmd.vehicle_type.map(Into::into),
        customer_location_url: cmd.location_url.clone().unwrap_or_default(),
        latitude: cmd.latitude.clone().unwrap_or_default(),
        longitude: cmd.longitude.clone().unwrap_or_default(),
        priority: cmd.priority.into(),
        status: cmd.status.into(),
        followup_by: cmd.followup_by.clone().unwrap_or_default(),
    };

    let record = manager.create(session, &form)?;
    println!("Breakdown added with ID: {}", record.id);
    Ok(())
}

fn handle_update<S: TabularStore>(
    manager: &mut RecordManager<S>,
    session: &Session,
    cmd: &UpdateCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    // Pre-fill omitted fields from the stored record, the way the edit form
    // does before a re-save.
    let current = manager
        .find(&cmd.id)?
        .ok_or_else(|| Error::RecordNotFound(cmd.id.clone()))?;

    let change = Transition {
        status: cmd.status.map_or(current.status, Into::into),
        priority: cmd.priority.map_or(current.priority, Into::into),
        followup_by: cmd.followup_by.clone().unwrap_or(current.followup_by),
        resolved_by: cmd.resolved_by.clone().unwrap_or(current.resolved_by),
    };

    let updated = manager.transition(session, &current.id, &change)?;
    println!(
        "Record {} updated: {} / {}",
        updated.id, updated.status, updated.priority
    );
    Ok(())
}

fn handle_show<S: TabularStore>(
    manager: &mut RecordManager<S>,
    cmd: &ShowCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = manager
        .find(&cmd.id)?
        .ok_or_else(|| Error::RecordNotFound(cmd.id.clone()))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Breakdown {}", record.id);
        println!("-----------------");
        for line in card_lines(&record) {
            println!("{line}");
        }
    }
    Ok(())
}

fn handle_list<S: TabularStore>(
    manager: &mut RecordManager<S>,
    cmd: &ListCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = RecordFilter {
        statuses: cmd.status.iter().copied().map(Into::into).collect(),
        priorities: cmd.priority.iter().copied().map(Into::into).collect(),
        vehicle_types: cmd.vehicle_type.iter().copied().map(Into::into).collect(),
        followup_contains: cmd.followup_contains.clone(),
        created_from: cmd.from,
        created_to: cmd.to,
    };

    let mut records = filter.apply(&manager.records()?);
    sort_recent_first(&mut records);
    if let Some(limit) = cmd.limit {
        records.truncate(limit);
    }

    if records.is_empty() {
        println!("No breakdown records found.");
        return Ok(());
    }

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Plain => {
            for record in &records {
                println!(
                    "{} | {} | {} | {} ({} {})",
                    record.id,
                    record.status,
                    record.priority,
                    record.customer_name,
                    record.vehicle_type,
                    record.vehicle_model
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<10} {:<12} {:<9} {:<8} {:<20} {:<15}",
                "ID", "STATUS", "PRIORITY", "VEHICLE", "CUSTOMER", "FOLLOW-UP"
            );
            for record in &records {
                println!(
                    "{:<10} {:<12} {:<9} {:<8} {:<20} {:<15}",
                    record.id,
                    record.status.to_string(),
                    record.priority.to_string(),
                    record.vehicle_type.to_string(),
                    record.customer_name,
                    record.followup_by
                );
            }
        }
    }
    println!();
    println!("{} record(s)", records.len());
    Ok(())
}

fn handle_export<S: TabularStore>(
    manager: &mut RecordManager<S>,
    cmd: &ExportCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = RecordFilter {
        statuses: cmd.status.iter().copied().map(Into::into).collect(),
        priorities: cmd.priority.iter().copied().map(Into::into).collect(),
        vehicle_types: cmd.vehicle_type.iter().copied().map(Into::into).collect(),
        followup_contains: cmd.followup_contains.clone(),
        created_from: cmd.from,
        created_to: cmd.to,
    };

    let mut records = filter.apply(&manager.records()?);
    sort_recent_first(&mut records);
    let csv = to_csv(&records);

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &csv)?;
            println!("Wrote {} record(s) to {}", records.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn handle_cards<S: TabularStore>(
    manager: &mut RecordManager<S>,
    cmd: &CardsCommand,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = RecordFilter {
        statuses: cmd.status.iter().copied().map(Into::into).collect(),
        vehicle_types: cmd.vehicle_type.iter().copied().map(Into::into).collect(),
        ..RecordFilter::default()
    };

    let mut records = filter.apply(&manager.records()?);
    sort_recent_first(&mut records);

    if records.is_empty() {
        println!("No breakdowns found for selected filters.");
        return Ok(());
    }

    let page_lines = cmd.page_lines.unwrap_or(config.export.page_lines);
    let pages = paginate_cards(&records, page_lines);
    // Pages are separated by a form feed so the output prints one page per
    // sheet.
    let output = pages.join("\n\u{000C}\n");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!(
                "Wrote {} card(s) on {} page(s) to {}",
                records.len(),
                pages.len(),
                path.display()
            );
        }
        None => println!("{output}"),
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    cmd: &ConfigCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Backend:            {:?}", config.store.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Table:              {}", config.store.table);
                println!();
                println!("[Cache]");
                println!("  TTL (seconds):      {}", config.cache.ttl_secs);
                println!();
                println!("[Policy]");
                println!(
                    "  Resolver required:  {}",
                    config.policy.enforce_resolver_required
                );
                println!();
                println!("[Time]");
                println!("  UTC offset (min):   {}", config.time.utc_offset_minutes);
                println!();
                println!("[Export]");
                println!("  Page lines:         {}", config.export.page_lines);
                println!();
                println!("[Session]");
                println!("  Actor:              {}", config.session.actor);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.clone().unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
