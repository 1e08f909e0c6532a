//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use careminder::config::CareConfig;
use careminder::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &CareConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `careminder listen` or `careminder say` to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn)
        .context("failed to run health check")?;

    println!("Careminder Health Report");
    println!("========================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("Default language:  {}", config.default_language());
    println!();
    println!("Row counts:");
    println!("  Reminders:       {}", report.total_reminders);
    println!("  Active:          {}", report.active_reminders);
    println!("  Series:          {}", report.series_count);
    if report.orphaned_occurrences > 0 {
        println!(
            "  WARNING: {} occurrence(s) point at a missing series anchor.",
            report.orphaned_occurrences
        );
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.careminder/reminders.db");
        println!("  2. Or keep a JSON copy of what is readable:");
        println!("     careminder export > backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
