// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use abode_app::{
    Destination, HierarchyContext, PARAM_PROPERTY_ID, PARAM_ROOM_ID, RouteId, RouteParams,
    TabKind, resolve_parent,
};
use abode_tui::ShellOptions;
use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use logging::LogTarget;
use runtime::{MemoryCatalog, demo_catalog};
use std::env;
use std::path::PathBuf;
use tracing::info;

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
            "load config {}; run `abode --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    if let Some(path) = &options.resolve {
        let _guard = logging::init(config.log_level(), LogTarget::Stderr)?;
        let parent = resolve_from_flags(path, &options.params, &options.context)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&parent).context("encode destination")?
        );
        return Ok(());
    }

    let motion = config.motion_config()?;
    let frame_interval = config.frame_interval()?;
    let start = match &options.open {
        Some(href) => destination_from_flags(href, &options.params)?,
        None => tab_root(config.start_tab()?),
    };

    let catalog_path = if options.demo {
        None
    } else {
        options.catalog_path.clone().or_else(|| config.catalog_path())
    };
    let mut catalog = match &catalog_path {
        Some(path) => MemoryCatalog::load(path).with_context(|| {
            format!(
                "open catalog {} -- if this path is wrong, set [catalog].path or pass --demo",
                path.display()
            )
        })?,
        None => demo_catalog(),
    };

    if options.check_only {
        let (properties, rooms, items) = catalog.counts();
        println!(
            "ok: config {}, catalog {} ({properties} properties, {rooms} rooms, {items} items)",
            options.config_path.display(),
            catalog_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "demo".to_owned()),
        );
        return Ok(());
    }

    let _guard = logging::init(config.log_level(), LogTarget::File(config.log_file()?))?;
    info!(start = %start, "starting shell");
    abode_tui::run_app(
        start,
        ShellOptions {
            motion,
            frame_interval,
        },
        &mut catalog,
    )
}

fn tab_root(tab: TabKind) -> Destination {
    match tab {
        TabKind::Inventory => Destination::new(RouteId::Inventory),
        TabKind::Settings => Destination::settings(),
        TabKind::Portfolio | TabKind::None => Destination::portfolio(),
    }
}

/// `href` may carry its own `?key=value` query; `--param` pairs win over it.
fn destination_from_flags(href: &str, pairs: &[(String, String)]) -> Result<Destination> {
    let mut destination = Destination::parse_href(href)?;
    for (key, value) in pairs {
        destination.params.insert(key, value.as_str());
    }
    Ok(destination)
}

fn resolve_from_flags(
    path: &str,
    params: &[(String, String)],
    context: &[(String, String)],
) -> Result<Destination> {
    let mut hints = HierarchyContext::default();
    for (key, value) in context {
        hints = match key.as_str() {
            PARAM_PROPERTY_ID => hints.with_property_id(value.as_str()),
            PARAM_ROOM_ID => hints.with_room_id(value.as_str()),
            other => bail!(
                "unsupported --context key {other:?}; use {PARAM_PROPERTY_ID} or {PARAM_ROOM_ID}"
            ),
        };
    }
    let target = destination_from_flags(path, params)?;
    let parent = resolve_parent(&target.path, &target.params, hints.ancestors());
    info!(route = %target, parent = %parent, "resolved parent");
    Ok(parent)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    catalog_path: Option<PathBuf>,
    demo: bool,
    open: Option<String>,
    params: Vec<(String, String)>,
    context: Vec<(String, String)>,
    resolve: Option<String>,
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
        print_config_path: false,
        print_example: false,
        catalog_path: None,
        demo: false,
        open: None,
        params: Vec::new(),
        context: Vec::new(),
        resolve: None,
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
            "--catalog" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--catalog requires a JSON file path"))?;
                options.catalog_path = Some(PathBuf::from(value.as_ref()));
            }
            "--open" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--open requires a route path such as /room"))?;
                options.open = Some(value.as_ref().to_owned());
            }
            "--resolve" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--resolve requires a route path such as /item"))?;
                options.resolve = Some(value.as_ref().to_owned());
            }
            "--param" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--param requires key=value"))?;
                options.params.push(RouteParams::parse_pair(value.as_ref())?);
            }
            "--context" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--context requires key=value"))?;
                options.context.push(RouteParams::parse_pair(value.as_ref())?);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.demo && options.catalog_path.is_some() {
        bail!("--demo and --catalog are mutually exclusive");
    }

    Ok(options)
}

fn print_help() {
    println!("abode");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --catalog <path>         Load properties, rooms, and items from a JSON file");
    println!("  --demo                   Launch with built-in demo data");
    println!("  --open <href>            Start on a route, for example /item?item_id=9");
    println!("  --param key=value        Route param for --open or --resolve; beats the query (repeatable)");
    println!("  --context key=value      Known property_id/room_id for --resolve (repeatable)");
    println!("  --resolve <route>        Print where back would go from <route> as JSON");
    println!("  --check                  Validate config + catalog, then exit");
    println!("  --help                   Show this help");
}
