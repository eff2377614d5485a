mod db;
mod error;
mod models;
mod ops;
mod run;
mod summary;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let db_path = get_db_path()?;
    let mut db = db::Database::open(&db_path)?;

    if args.len() >= 2 {
        run::as_cli(&args, &mut db)
    } else {
        run::print_usage();
        Ok(())
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("havikiadas=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn get_db_path() -> Result<std::path::PathBuf> {
    if let Ok(path) = std::env::var("HAVIKIADAS_DB") {
        return Ok(path.into());
    }
    let proj_dirs = directories::ProjectDirs::from("hu", "havikiadas", "HaviKiadas")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("havikiadas.db"))
}
