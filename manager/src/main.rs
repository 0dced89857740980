mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::{self, File};
use std::path::Path;

use cli::{Cli, Commands, ConfigCommand};
use optiscaler_manager::config::{get_config_path, get_data_dir, load_config, LOG_FILE_NAME};
use optiscaler_manager::{
    read_config, spawn_scan, write_config, AppConfig, CancelToken, GameRecord, GameScanner,
    ModConfig, Platform, ScanEvent, SnapshotStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let app_config = load_config(&config_path);
    let level = cli.log_level.as_deref().unwrap_or(&app_config.log_level);
    init_logging(level);
    info!("Using config {}", config_path.display());

    match cli.command {
        Commands::Scan { platform, no_save } => scan(&app_config, platform.as_deref(), no_save).await,
        Commands::Verify { dir } => verify(&app_config, &dir),
        Commands::List => {
            list(&SnapshotStore::default().load_games());
            Ok(())
        }
        Commands::Refresh => refresh(&app_config).await,
        Commands::Config(cmd) => ini(cmd),
    }
}

fn init_logging(level: &str) {
    let level: LevelFilter = level.parse().unwrap_or(LevelFilter::Info);
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let data_dir = get_data_dir();
    if fs::create_dir_all(&data_dir).is_ok() {
        if let Ok(file) = File::create(data_dir.join(LOG_FILE_NAME)) {
            loggers.push(WriteLogger::new(level, Config::default(), file));
        }
    }
    let _ = CombinedLogger::init(loggers);
}

async fn scan(app_config: &AppConfig, platform: Option<&str>, no_save: bool) -> Result<()> {
    let scanner = GameScanner::with_system_registry(app_config.scan_settings());
    let store = SnapshotStore::default();

    let (games, warnings) = match platform {
        Some(name) => {
            let platform: Platform = name.parse().map_err(anyhow::Error::msg)?;
            let report = tokio::task::spawn_blocking(move || scanner.scan_platform(platform))
                .await
                .context("scan worker failed")?;
            for game in &report.games {
                print_game(game);
            }

            // Keep other storefronts from the last full scan
            let mut games: Vec<GameRecord> = store
                .load_games()
                .into_iter()
                .filter(|g| g.platform != platform)
                .collect();
            games.extend(report.games);
            (games, report.warnings.len())
        }
        None => {
            let (handle, mut events) = spawn_scan(scanner, CancelToken::new());
            while let Some(event) = events.recv().await {
                match event {
                    ScanEvent::Progress(p) => {
                        println!("[{:>3.0}%] {}", p.percentage(), p.message);
                    }
                    ScanEvent::GameDiscovered(game) => print_game(&game),
                    ScanEvent::Warning(_) => {}
                }
            }
            let report = handle.await.context("scan worker failed")?;
            (report.games, report.warnings.len())
        }
    };

    if warnings > 0 {
        println!("{} warnings, see the log for details", warnings);
    }
    if !no_save {
        store.save_games(&games)?;
        println!("Saved {} games to {}", games.len(), store.path().display());
    }
    Ok(())
}

fn verify(app_config: &AppConfig, dir: &Path) -> Result<()> {
    let scanner = GameScanner::with_system_registry(app_config.scan_settings());
    match scanner.verify_path(dir) {
        Some(game) => {
            print_game(&game);
            Ok(())
        }
        None => bail!("no game executable found in {}", dir.display()),
    }
}

async fn refresh(app_config: &AppConfig) -> Result<()> {
    let store = SnapshotStore::default();
    let games = store.load_games();
    if games.is_empty() {
        println!("No saved games, run `scan` first");
        return Ok(());
    }

    let scanner = GameScanner::with_system_registry(app_config.scan_settings());
    let refreshed = tokio::task::spawn_blocking(move || {
        games
            .iter()
            .filter(|g| g.executable_directory.is_dir())
            .map(|g| scanner.refresh_mod_status(g))
            .collect::<Vec<_>>()
    })
    .await
    .context("refresh worker failed")?;

    list(&refreshed);
    store.save_games(&refreshed)?;
    Ok(())
}

fn list(games: &[GameRecord]) {
    println!("{:<8} {:<40} {:<10} {:<10} {}", "PLATFORM", "NAME", "OPTISCALER", "PATCHER", "EXECUTABLE");
    for game in games {
        print_game(game);
    }
}

fn print_game(game: &GameRecord) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut line = format!(
        "{:<8} {:<40} {:<10} {:<10} {}",
        game.platform,
        game.name,
        yes_no(game.has_primary_mod),
        yes_no(game.has_patcher_mod),
        game.executable_path.display()
    );
    if let (Some(upscaler), Some(preset)) = (&game.upscaler_method, &game.quality_preset) {
        let fg = if game.frame_gen_enabled == Some(true) { ", FG" } else { "" };
        line.push_str(&format!(" ({} {}{})", upscaler, preset, fg));
    }
    println!("{}", line);
}

fn ini(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { ini } => {
            let cfg = read_config(&ini);
            print!("{}", cfg.to_ini_string());
            println!();
            println!("; upscaler: {}", cfg.upscaler_display_name());
            println!("; frame generation: {}", cfg.frame_generation_enabled());
            println!(
                "; quality preset: {}",
                cfg.quality_preset_label(optiscaler_manager::ini_config::DEFAULT_PRESET_TOLERANCE)
            );
        }
        ConfigCommand::Init { ini, force } => {
            if ini.exists() && !force {
                bail!("{} already exists, pass --force to overwrite", ini.display());
            }
            write_config(&ini, &ModConfig::default())?;
            println!("Wrote defaults to {}", ini.display());
        }
        ConfigCommand::Set {
            ini,
            upscaler,
            frame_gen,
            overlay,
            sharpness,
        } => {
            let mut cfg = read_config(&ini);
            if let Some(token) = upscaler {
                cfg.set_upscaler(&token);
            }
            if let Some(fg) = frame_gen {
                cfg.set_frame_generation(fg.is_on());
            }
            if let Some(overlay) = overlay {
                cfg.menu.overlay_menu = overlay.is_on();
            }
            if let Some(value) = sharpness {
                if !(0.0..=1.3).contains(&value) {
                    bail!("sharpness must be between 0.0 and 1.3");
                }
                cfg.sharpness.override_enabled = true;
                cfg.sharpness.sharpness = value;
            }
            write_config(&ini, &cfg)?;
            println!("Updated {}", ini.display());
        }
    }
    Ok(())
}
