use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use vendor_scraper::config::{self, ConfigError, Settings};
use vendor_scraper::db;
use vendor_scraper::document::read_document;
use vendor_scraper::export::{self, relational::SQL_FILE, ExportFormat};
use vendor_scraper::fetch::{build_fetcher, FetchOptions, FetcherKind};
use vendor_scraper::model::Offering;
use vendor_scraper::pipeline::ResearchOptions;
use vendor_scraper::research;
use vendor_scraper::rules::{CompiledRules, ExtractionRules};

#[derive(Parser)]
#[command(name = "vendor_scraper", about = "Research vendor websites into structured documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research vendor sites and write one document + JSON snapshot per vendor
    Research {
        /// Seed URLs
        urls: Vec<String>,
        /// File with one seed URL per line
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Max pages per vendor, seed included
        #[arg(long)]
        max_pages: Option<usize>,
        /// Vendors researched at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// Delay between requests to one site
        #[arg(long)]
        delay_ms: Option<u64>,
        #[arg(long, value_enum, default_value_t = FetcherKind::Http)]
        fetcher: FetcherKind,
        /// Don't read sitemap.xml
        #[arg(long)]
        no_sitemap: bool,
        /// Extraction rules TOML file
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Convert vendor documents into JSON, CSV tables and a SQL script
    Export {
        /// Directory of vendor documents
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Export directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::All)]
        format: ExportFormat,
    },
    /// Load an exported SQL script into SQLite
    Load {
        /// SQL script (default: <export dir>/vendors_database.sql)
        #[arg(short, long)]
        sql: Option<PathBuf>,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Vendors overview table
    Overview {
        #[arg(long)]
        db: Option<PathBuf>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Row counts per table
    Stats {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Summarize one vendor document
    Show {
        vendor_id: String,
        /// Directory of vendor documents
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Research {
            urls,
            file,
            output,
            max_pages,
            concurrency,
            delay_ms,
            fetcher,
            no_sitemap,
            rules,
        } => {
            let mut seeds = urls;
            if let Some(path) = file {
                seeds.extend(config::read_url_file(&path)?);
            }
            if seeds.is_empty() {
                return Err(ConfigError::NoSeedUrls.into());
            }

            let rules = match rules.or_else(|| settings.rules_path.clone()) {
                Some(path) => ExtractionRules::load(&path)?.compile()?,
                None => CompiledRules::default(),
            };
            let options = ResearchOptions {
                max_pages: max_pages.unwrap_or(settings.max_pages_per_vendor).max(1),
                delay: Duration::from_millis(delay_ms.unwrap_or(settings.request_delay_ms)),
                use_sitemap: settings.use_sitemap && !no_sitemap,
            };
            let output_dir = output.unwrap_or_else(|| settings.output_dir.clone());
            let concurrency = concurrency.unwrap_or(settings.concurrency);
            let fetch_options = FetchOptions::from_settings(&settings);

            println!("Researching {} vendors into {}...", seeds.len(), output_dir.display());
            let stats = research::research_vendors_streaming(
                seeds,
                move || build_fetcher(fetcher, &fetch_options),
                Arc::new(rules),
                options,
                concurrency,
                &output_dir,
            )
            .await?;
            println!(
                "Done: {} vendors ({} ok, {} errors). Summary: {}",
                stats.total,
                stats.ok,
                stats.errors,
                stats.report.display()
            );
            Ok(())
        }
        Commands::Export { input, output, format } => {
            let input = input.unwrap_or_else(|| settings.output_dir.clone());
            let output = output.unwrap_or_else(|| settings.export_dir.clone());
            let records = export::load_documents(&input)?;
            if records.is_empty() {
                println!("No vendor documents in {}. Run 'research' first.", input.display());
                return Ok(());
            }
            let written = export::export_records(&records, &output, format)?;
            println!("Exported {} vendors:", records.len());
            for path in &written {
                println!("  - {}", path.display());
            }
            Ok(())
        }
        Commands::Load { sql, db } => {
            let sql = sql.unwrap_or_else(|| settings.export_dir.join(SQL_FILE));
            let db_path = db.unwrap_or_else(|| settings.db_path.clone());
            let conn = db::connect(&db_path)?;
            db::load_script(&conn, &sql)?;
            println!("Loaded {} into {}", sql.display(), db_path.display());
            Ok(())
        }
        Commands::Overview { db, limit } => {
            let conn = db::connect(&db.unwrap_or_else(|| settings.db_path.clone()))?;
            let rows = db::fetch_overview(&conn, limit)?;
            if rows.is_empty() {
                println!("No vendors found. Run 'load' first.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<28} | {:<24} | {:>8} | {:>8} | {:>5} | {:<28}",
                "#", "Vendor", "Domain", "Services", "Products", "Pages", "Email"
            );
            println!("{}", "-".repeat(120));

            for (i, r) in rows.iter().enumerate() {
                println!(
                    "{:>3} | {:<28} | {:<24} | {:>8} | {:>8} | {:>5} | {:<28}",
                    i + 1,
                    truncate(&r.company_name, 28),
                    truncate(&r.domain, 24),
                    r.services,
                    r.products,
                    r.pages,
                    truncate(&r.email, 28)
                );
            }

            println!("\n{} vendors | ids: {}", rows.len(), truncate(&ids(&rows), 80));
            Ok(())
        }
        Commands::Stats { db } => {
            let conn = db::connect(&db.unwrap_or_else(|| settings.db_path.clone()))?;
            let s = db::get_stats(&conn)?;
            for (table, n) in &s.counts {
                println!("{:<20} {}", format!("{}:", table), n);
            }
            Ok(())
        }
        Commands::Show { vendor_id, input } => {
            let dir = input.unwrap_or_else(|| settings.output_dir.clone());
            let r = read_document(&dir.join(format!("{}.md", vendor_id)))?;
            println!("{} ({})", r.company_name, r.vendor_id);
            println!("Website:   {}", r.website);
            if !r.description.is_empty() {
                println!("About:     {}", truncate(&r.description, 100));
            }
            for (key, value) in &r.contact_info {
                println!("{:<10} {}", format!("{}:", key), value);
            }
            print_offerings("Services", &r.services);
            print_offerings("Products", &r.products);
            if !r.technology_stack.is_empty() {
                let tech: Vec<&str> = r.technology_stack.iter().map(String::as_str).collect();
                println!("\nTechnology: {}", tech.join(", "));
            }
            if !r.industry_focus.is_empty() {
                let industries: Vec<&str> = r.industry_focus.iter().map(String::as_str).collect();
                println!("Industries: {}", industries.join(", "));
            }
            println!("\n{} pages scraped at {}", r.total_pages_scraped, r.scraped_at);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_offerings(label: &str, offerings: &[Offering]) {
    if offerings.is_empty() {
        return;
    }
    println!("\n--- {} ({}) ---", label, offerings.len());
    for o in offerings {
        let price = o.pricing.as_deref().unwrap_or("-");
        println!("  {:<32} {:<14} {}", truncate(&o.name, 32), truncate(&o.category, 14), price);
    }
}

fn ids(rows: &[db::OverviewRow]) -> String {
    rows.iter().map(|r| r.vendor_id.as_str()).collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
