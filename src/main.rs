use clap::Parser;
use llm_seo::crawlers::Fetcher;
use llm_seo::parsers::text::extract_visible_text;
use llm_seo::query::{QueryAlignment, analyze_query_alignment};
use llm_seo::{Audit, AuditConfig, AuditError, HttpFetcher, PolicyDraft, SiteAuditResult};
use serde::Serialize;
use std::process::ExitCode;

mod args;
use args::Args;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    site: &'a SiteAuditResult,
    llm_txt_draft: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_alignment: Option<&'a QueryAlignment>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("Audit failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> llm_seo::Result<()> {
    let mut config = match &args.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };
    if let Some(max_pages) = args.max_pages {
        config.crawl.max_pages = max_pages;
    }

    ::log::info!(
        "Starting audit for {} (up to {} pages)",
        args.url,
        config.crawl.max_pages
    );
    let start_time = std::time::Instant::now();

    let site = Audit::new(args.url.clone())
        .with_config(config.clone())
        .run()
        .await?;

    ::log::info!(
        "Audit complete - {} pages in {:.2} seconds",
        site.pages.len(),
        start_time.elapsed().as_secs_f64()
    );

    let mut draft = PolicyDraft::from_audit(&site);
    if let Some(contact) = &args.contact {
        draft = draft.with_contact(contact.trim());
    }
    if let Some(license_url) = &args.license_url {
        draft = draft.with_license_url(license_url.trim());
    }
    let llm_txt = draft.render();

    if args.save_llm_txt {
        std::fs::create_dir_all(&args.out_dir)?;
        let path = args.out_dir.join("llm.txt");
        std::fs::write(&path, &llm_txt)?;
        ::log::info!("Wrote {}", path.display());
    }

    let alignment = match &args.query {
        Some(query) => query_alignment(query, &site, &config).await?,
        None => None,
    };

    if args.as_json {
        let report = JsonReport {
            site: &site,
            llm_txt_draft: &llm_txt,
            query_alignment: alignment.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&site, &llm_txt, alignment.as_ref());
        if args.save_llm_txt {
            println!("\nSaved llm.txt to {}", args.out_dir.join("llm.txt").display());
        }
    }

    Ok(())
}

/// Refetch the primary page so its visible text can be compared with the query
async fn query_alignment(
    query: &str,
    site: &SiteAuditResult,
    config: &AuditConfig,
) -> llm_seo::Result<Option<QueryAlignment>> {
    let Some(page) = site.primary_page() else {
        ::log::warn!("No page was audited; skipping query alignment");
        return Ok(None);
    };

    let fetcher = HttpFetcher::new(&config.crawl)?;
    let body_text = match fetcher.fetch(&page.url).await {
        Ok(response) if response.has_content() => extract_visible_text(&response.body),
        Ok(_) => String::new(),
        Err(AuditError::Fetch { url, message }) => {
            ::log::warn!("Could not refetch {} for query alignment: {}", url, message);
            String::new()
        }
        Err(e) => return Err(e),
    };

    Ok(Some(analyze_query_alignment(query, &body_text, page)))
}

fn print_report(site: &SiteAuditResult, llm_txt: &str, alignment: Option<&QueryAlignment>) {
    println!("LLM Discoverability Audit: {}", site.base_url);
    println!("Overall score: {:.1}/100", site.score);

    println!("\nBreakdown:");
    for (name, value) in site.breakdown.entries() {
        println!("  {:<16} {:>5.1}", name, value);
    }

    match site.primary_page() {
        Some(page) => {
            println!("\nPage: {} (status {})", page.url, page.status_code);
            println!("  Title: {}", page.title.as_deref().unwrap_or("-"));
            println!("  Description: {}", page.description.as_deref().unwrap_or("-"));
            println!("  Canonical: {}", page.canonical_url.as_deref().unwrap_or("-"));
            println!("  Words: {}", page.text_stats.word_count);
            println!("  Reading ease: {:.1}", page.reading_ease);
            if !page.json_ld_types.is_empty() {
                println!("  JSON-LD types: {}", page.json_ld_types.join(", "));
            }
            if page.blocked_by_robots {
                println!("  Blocked by robots.txt");
            }
        }
        None => println!("\nNo pages could be fetched."),
    }

    println!(
        "\nSitemaps: {}",
        if site.sitemap_urls.is_empty() {
            "none".to_string()
        } else {
            site.sitemap_urls.join(", ")
        }
    );
    match site.llm_policy_url.as_deref() {
        Some(url) if site.llm_policy_found => println!("llm.txt: found at {}", url),
        _ => println!("llm.txt: not found"),
    }

    if !site.recommendations.is_empty() {
        println!("\nRecommendations:");
        for rec in &site.recommendations {
            println!("  - {}", rec);
        }
    }

    if !site.keywords.is_empty() {
        println!("\nTop keywords:");
        for kw in &site.keywords {
            println!("  {:<20} {:>5.1}  ({} pages)", kw.term, kw.score, kw.pages);
        }
    }

    if let Some(alignment) = alignment {
        println!("\nQuery alignment: \"{}\"", alignment.query);
        println!("  Present: {}", alignment.present_terms.join(", "));
        println!("  Missing: {}", alignment.missing_terms.join(", "));
        for rec in &alignment.recommendations {
            println!("  - {}", rec);
        }
    }

    println!("\nSuggested llm.txt:\n");
    println!("{}", llm_txt);
}
