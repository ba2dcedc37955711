// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use leadline_app::{Lead, RecordStore, Session, SessionOptions};
use leadline_db::{KeyValueStore, MemoryStore, Store};
use logging::LogTarget;
use runtime::StorageRuntime;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `leadline --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let target = if options.check_only {
        LogTarget::Stderr
    } else {
        LogTarget::Dashboard
    };
    let directive =
        logging::resolve_filter_directive(env::var(logging::LOG_ENV).ok(), config.log_level());
    logging::init(&directive, config.log_file().as_deref(), target)?;

    let leads = load_dataset(&options, &config)?;
    let storage = open_storage(&options, &db_path)?;
    let opportunities = leadline_db::load_opportunities(storage.as_ref());
    let records = RecordStore::new(leads, opportunities)
        .context("build dashboard records; fix the lead dataset or clear stored opportunities")?;
    let session_options = SessionOptions {
        conversion_delay: config.conversion_delay()?,
        initial_query: config.initial_query(),
    };

    info!(
        leads = records.leads().len(),
        opportunities = records.opportunities().len(),
        db = %db_path.display(),
        demo = options.demo,
        "startup checks passed"
    );
    if options.check_only {
        return Ok(());
    }

    let mut session = Session::new(records, session_options);
    let mut runtime = StorageRuntime::new(storage);
    leadline_tui::run_app(&mut session, &mut runtime)
}

fn load_dataset(options: &CliOptions, config: &Config) -> Result<Vec<Lead>> {
    if options.demo {
        return Ok(leadline_testkit::demo_leads());
    }
    let path = options.leads_path.clone().or_else(|| config.leads_path());
    match path {
        Some(path) => leadline_db::load_leads(&path).with_context(|| {
            format!(
                "load leads from {}; set [data].leads_path or pass --leads",
                path.display()
            )
        }),
        None => {
            warn!("no lead dataset configured; set [data].leads_path or run with --demo");
            Ok(Vec::new())
        }
    }
}

fn open_storage(options: &CliOptions, db_path: &std::path::Path) -> Result<Box<dyn KeyValueStore>> {
    if options.demo {
        return Ok(Box::new(MemoryStore::new()));
    }
    let store = Store::open(db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or LEADLINE_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    Ok(Box::new(store))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    leads_path: Option<PathBuf>,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        leads_path: None,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--leads" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--leads requires a JSON file path"))?;
                options.leads_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-path" => options.print_db_path = true,
            "--print-example-config" => options.print_example = true,
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.demo && options.leads_path.is_some() {
        return Err(anyhow!(
            "--demo and --leads cannot be combined; demo mode generates its own leads"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("leadline: lead and opportunity dashboard");
    println!("  --config <path>          Use a specific config path");
    println!("  --leads <path>           Load leads from a JSON file");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with generated leads and in-memory storage");
    println!("  --check                  Validate config, leads, and storage, then exit");
    println!("  --help                   Show this help");
}
