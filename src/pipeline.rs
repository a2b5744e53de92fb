//! One vendor, end to end: fetch -> classify -> extract -> merge -> normalized record.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify;
use crate::discover;
use crate::extract;
use crate::fetch::{FetchError, PageSource};
use crate::html::{self, PageContent};
use crate::merge::merge_offerings;
use crate::model::{self, Offering, OfferingKind, VendorRecord};
use crate::rules::CompiledRules;
use crate::sitemap;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("seed page {url} could not be fetched: {source}")]
    SeedFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("seed page {url} has no readable content")]
    EmptySeed { url: String },
}

#[derive(Debug, Clone)]
pub struct ResearchOptions {
    pub max_pages: usize,
    /// Pause before every request after the seed.
    pub delay: Duration,
    pub use_sitemap: bool,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        ResearchOptions {
            max_pages: 25,
            delay: Duration::from_millis(1000),
            use_sitemap: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub pages_done: usize,
    pub pages_total: usize,
}

/// Research one vendor site. Only a failed seed fetch is fatal; every other page
/// failure is logged and the page skipped.
pub async fn research_vendor(
    source: &dyn PageSource,
    rules: &CompiledRules,
    seed_url: &str,
    options: &ResearchOptions,
    progress: &(dyn Fn(Progress) + Send + Sync),
) -> Result<VendorRecord, PipelineError> {
    info!("Researching {}", seed_url);
    let seed_html = source
        .fetch(seed_url)
        .await
        .map_err(|source| PipelineError::SeedFetch {
            url: seed_url.to_string(),
            source,
        })?;
    if seed_html.trim().is_empty() {
        return Err(PipelineError::EmptySeed {
            url: seed_url.to_string(),
        });
    }
    let seed = html::parse_page(seed_url, &seed_html);

    let sitemap_urls = if options.use_sitemap {
        tokio::time::sleep(options.delay).await;
        match sitemap::fetch_sitemap_urls(source, seed_url).await {
            Ok(urls) => urls,
            Err(e) => {
                debug!("No sitemap for {}: {:#}", seed_url, e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let candidates = discover::candidate_pages(seed_url, &seed.links, &sitemap_urls, options.max_pages);
    let total = candidates.len();
    info!("{}: {} pages to visit", seed_url, total);

    let mut pages: Vec<PageContent> = Vec::with_capacity(total);
    if seed.has_content() {
        pages.push(seed.clone());
    }
    progress(Progress {
        pages_done: 1,
        pages_total: total,
    });

    for (i, url) in candidates.iter().enumerate().skip(1) {
        tokio::time::sleep(options.delay).await;
        match source.fetch(url).await {
            Ok(body) => {
                let page = html::parse_page(url, &body);
                if page.has_content() {
                    pages.push(page);
                } else {
                    debug!("Skipping {}: no visible text", url);
                }
            }
            Err(e) => warn!("Skipping page: {}", e),
        }
        progress(Progress {
            pages_done: i + 1,
            pages_total: total,
        });
    }

    let record = build_record(rules, seed_url, &seed, &pages);
    info!(
        "{}: {} pages, {} services, {} products",
        record.vendor_id,
        record.total_pages_scraped,
        record.services.len(),
        record.products.len()
    );
    Ok(record)
}

/// Assemble the record from already-fetched pages (seed first).
pub fn build_record(
    rules: &CompiledRules,
    seed_url: &str,
    seed: &PageContent,
    pages: &[PageContent],
) -> VendorRecord {
    let company_name = extract::company_name(rules, &seed.title, seed_url);
    let now = Utc::now().to_rfc3339();

    let mut record = VendorRecord {
        vendor_id: model::vendor_id(&company_name),
        company_name,
        website: seed_url.to_string(),
        domain: model::domain_of(seed_url),
        description: seed.meta_description.clone(),
        title: seed.title.clone(),
        total_pages_scraped: pages.len() as u32,
        scraped_at: now.clone(),
        last_updated: now,
        ..Default::default()
    };
    extract::apply_vendor_facts(&mut record, rules, pages);

    let mut services: Vec<Offering> = Vec::new();
    let mut products: Vec<Offering> = Vec::new();

    if rules.seed_mentioned_services {
        for page in pages {
            for name in extract::mentioned_services(rules, &page.text) {
                let mut o = Offering::new(OfferingKind::Service, name);
                o.url = seed_url.to_string();
                services.push(o);
            }
        }
    }

    let fallback_name = if record.domain.is_empty() {
        record.company_name.clone()
    } else {
        record.domain.clone()
    };
    for page in pages {
        for kind in classify::page_kinds(rules, &page.url, &page.title) {
            let candidate = extract::extract_offering(rules, kind, page, &fallback_name);
            match kind {
                OfferingKind::Service => services.push(candidate),
                OfferingKind::Product => products.push(candidate),
            }
        }
    }

    record.services = merge_offerings(services);
    record.products = merge_offerings(products);
    record.normalize();
    record
}
