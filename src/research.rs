use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::document::render_document;
use crate::fetch::PageSource;
use crate::model::VendorRecord;
use crate::pipeline::{research_vendor, Progress, ResearchOptions};
use crate::rules::CompiledRules;

/// Research stats returned after completion.
pub struct ResearchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
    /// `summary_report_<timestamp>.md` in the output directory.
    pub report: PathBuf,
}

/// Prefix of the per-batch report; never a vendor document.
pub const SUMMARY_PREFIX: &str = "summary_report_";

enum Outcome {
    Done(VendorRecord),
    Failed { seed_url: String, error: String },
}

/// Research vendors concurrently, writing each record to `output_dir` as it arrives.
///
/// `make_source` is called once per vendor so every task gets its own session.
pub async fn research_vendors_streaming<F>(
    seeds: Vec<String>,
    make_source: F,
    rules: Arc<CompiledRules>,
    options: ResearchOptions,
    concurrency: usize,
    output_dir: &Path,
) -> Result<ResearchStats>
where
    F: Fn() -> Result<Arc<dyn PageSource>> + Send + Sync + 'static,
{
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let make_source = Arc::new(make_source);
    let total = seeds.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} vendors ({per_sec}, eta {eta}) {msg}")?
            .progress_chars("=> "),
    );

    // Workers send outcomes, this task is the only writer
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Outcome>(concurrency * 2);

    for seed_url in seeds {
        let sem = Arc::clone(&semaphore);
        let make_source = Arc::clone(&make_source);
        let rules = Arc::clone(&rules);
        let options = options.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let outcome = match make_source() {
                Ok(source) => {
                    let report = |p: Progress| debug!("{}: page {}/{}", seed_url, p.pages_done, p.pages_total);
                    match research_vendor(source.as_ref(), &rules, &seed_url, &options, &report).await {
                        Ok(record) => Outcome::Done(record),
                        Err(e) => Outcome::Failed {
                            seed_url,
                            error: format!("{:#}", anyhow::Error::from(e)),
                        },
                    }
                }
                Err(e) => Outcome::Failed {
                    seed_url,
                    error: format!("{:#}", e),
                },
            };
            let _ = tx.send(outcome).await;
        });
    }

    // rx closes once every spawned task has dropped its sender
    drop(tx);

    let mut written: HashSet<String> = HashSet::new();
    let mut saved: Vec<VendorRecord> = Vec::new();
    let mut failed: Vec<(String, String)> = Vec::new();

    while let Some(outcome) = rx.recv().await {
        match outcome {
            Outcome::Done(mut record) => {
                record.normalize();
                let id = unique_id(&written, &record);
                if id != record.vendor_id {
                    warn!(
                        "vendor_id {} already written in this batch, saving {} as {}",
                        record.vendor_id, record.website, id
                    );
                    record.vendor_id = id;
                }
                let md_path = write_outputs(output_dir, &record)?;
                pb.set_message(record.vendor_id.clone());
                info!("Saved {}", md_path.display());
                written.insert(record.vendor_id.clone());
                saved.push(record);
            }
            Outcome::Failed { seed_url, error } => {
                warn!("Research failed for {}: {}", seed_url, error);
                failed.push((seed_url, error));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    let (ok, errors) = (saved.len(), failed.len());
    info!("Researched {} vendors ({} ok, {} errors)", total, ok, errors);

    let report = output_dir.join(format!("{}{}.md", SUMMARY_PREFIX, Local::now().format("%Y%m%d_%H%M%S")));
    std::fs::write(&report, summary_report(&saved, &failed))
        .with_context(|| format!("Failed to write {}", report.display()))?;

    Ok(ResearchStats {
        total,
        ok,
        errors,
        report,
    })
}

/// The record's vendor_id, or, when a vendor in this batch already took it,
/// `<id>_<domain>` and then `<id>_<domain>_<n>`.
fn unique_id(taken: &HashSet<String>, record: &VendorRecord) -> String {
    let id = &record.vendor_id;
    if !taken.contains(id) {
        return id.clone();
    }
    let domain: String = record
        .domain
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let base = if domain.is_empty() {
        id.clone()
    } else {
        format!("{}_{}", id, domain)
    };
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

/// Markdown overview of one batch: every saved vendor, then every failed seed.
pub fn summary_report(saved: &[VendorRecord], failed: &[(String, String)]) -> String {
    let mut md = String::new();
    md.push_str("# Vendor Research Summary Report\n\n");
    let _ = writeln!(md, "Generated on: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(
        md,
        "Total vendors researched: {} ({} ok, {} failed)\n",
        saved.len() + failed.len(),
        saved.len(),
        failed.len()
    );

    for r in saved {
        let services: Vec<&str> = r.services.iter().map(|s| s.name.as_str()).collect();
        let tech: Vec<&str> = r.technology_stack.iter().map(String::as_str).collect();
        let _ = writeln!(md, "## {}", r.company_name);
        let _ = writeln!(md, "- **Vendor ID**: {}", r.vendor_id);
        let _ = writeln!(md, "- **Website**: {}", r.website);
        let _ = writeln!(md, "- **Services**: {}", or_na(&services.join(", ")));
        let _ = writeln!(md, "- **Products**: {}", r.products.len());
        let _ = writeln!(md, "- **Tech Stack**: {}", or_na(&tech.join(", ")));
        let email = r.contact_info.get("email").map(String::as_str).unwrap_or_default();
        let _ = writeln!(md, "- **Contact**: {}\n", or_na(email));
    }

    if !failed.is_empty() {
        md.push_str("## Failed\n\n");
        for (url, error) in failed {
            let _ = writeln!(md, "- {}: {}", url, error);
        }
    }
    md
}

fn or_na(s: &str) -> &str {
    if s.is_empty() {
        "N/A"
    } else {
        s
    }
}

/// Write `<vendor_id>.md` and `<vendor_id>.json`; returns the document path.
pub fn write_outputs(output_dir: &Path, record: &VendorRecord) -> Result<PathBuf> {
    let md_path = output_dir.join(format!("{}.md", record.vendor_id));
    std::fs::write(&md_path, render_document(record))
        .with_context(|| format!("Failed to write {}", md_path.display()))?;

    let json_path = output_dir.join(format!("{}.json", record.vendor_id));
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(&json_path, json).with_context(|| format!("Failed to write {}", json_path.display()))?;

    Ok(md_path)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::document::read_document;
    use crate::fetch::testing::StaticSource;

    fn options() -> ResearchOptions {
        ResearchOptions {
            max_pages: 10,
            delay: Duration::ZERO,
            use_sitemap: true,
        }
    }

    #[tokio::test]
    async fn writes_document_and_snapshot_per_vendor() {
        let dir = tempfile::tempdir().unwrap();
        let seeds = vec![
            "https://acme.example/".to_string(),
            "https://gone.example/".to_string(),
        ];
        let stats = research_vendors_streaming(
            seeds,
            || Ok(Arc::new(StaticSource::acme()) as Arc<dyn PageSource>),
            Arc::new(CompiledRules::default()),
            options(),
            2,
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.ok, 1);
        assert_eq!(stats.errors, 1);

        let from_doc = read_document(&dir.path().join("acme_cloud.md")).unwrap();
        let json = std::fs::read_to_string(dir.path().join("acme_cloud.json")).unwrap();
        let from_json: VendorRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(from_doc, from_json);
        assert_eq!(from_doc.company_name, "Acme Cloud");
    }

    #[tokio::test]
    async fn source_construction_failure_counts_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let stats = research_vendors_streaming(
            vec!["https://acme.example/".to_string()],
            || anyhow::bail!("no client"),
            Arc::new(CompiledRules::default()),
            options(),
            1,
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!((stats.ok, stats.errors), (0, 1));

        let files: Vec<PathBuf> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(files, vec![stats.report.clone()]);
        let report = std::fs::read_to_string(&stats.report).unwrap();
        assert!(report.contains("- https://acme.example/: no client"), "{report}");
    }

    #[tokio::test]
    async fn colliding_vendor_ids_are_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let seeds = vec![
            "https://acme.example/".to_string(),
            "https://acme2.example/".to_string(),
        ];
        let stats = research_vendors_streaming(
            seeds,
            || {
                Ok(Arc::new(StaticSource::new(&[
                    ("https://acme.example/", "acme_home.html"),
                    ("https://acme2.example/", "acme_home.html"),
                ])) as Arc<dyn PageSource>)
            },
            Arc::new(CompiledRules::default()),
            options(),
            2,
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!((stats.ok, stats.errors), (2, 0));

        let mut docs: Vec<(String, String)> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|e| e == "md") && *p != stats.report)
            .map(|p| {
                let r = read_document(&p).unwrap();
                assert_eq!(p.file_stem().unwrap().to_str().unwrap(), r.vendor_id);
                assert!(p.with_extension("json").exists());
                (r.vendor_id, r.website)
            })
            .collect();
        docs.sort();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "acme_cloud");
        assert!(docs[1].0.starts_with("acme_cloud_acme"), "{:?}", docs);
        assert_ne!(docs[0].1, docs[1].1);
    }

    #[test]
    fn unique_id_falls_back_to_domain_then_counter() {
        let record = VendorRecord {
            vendor_id: "acme_cloud".into(),
            domain: "acme2.example".into(),
            ..Default::default()
        };
        let mut taken = HashSet::new();
        assert_eq!(unique_id(&taken, &record), "acme_cloud");
        taken.insert("acme_cloud".to_string());
        assert_eq!(unique_id(&taken, &record), "acme_cloud_acme2_example");
        taken.insert("acme_cloud_acme2_example".to_string());
        assert_eq!(unique_id(&taken, &record), "acme_cloud_acme2_example_2");
    }

    #[test]
    fn summary_lists_vendors_and_failures() {
        let mut r = VendorRecord {
            vendor_id: "acme_cloud".into(),
            company_name: "Acme Cloud".into(),
            website: "https://acme.example/".into(),
            ..Default::default()
        };
        r.technology_stack.insert("Kubernetes".into());
        let md = summary_report(&[r], &[("https://gone.example/".into(), "HTTP 404".into())]);
        assert!(md.starts_with("# Vendor Research Summary Report\n"));
        assert!(md.contains("## Acme Cloud\n- **Vendor ID**: acme_cloud\n"));
        assert!(md.contains("- **Services**: N/A\n"));
        assert!(md.contains("- **Tech Stack**: Kubernetes\n"));
        assert!(md.contains("- https://gone.example/: HTTP 404\n"));
    }
}
