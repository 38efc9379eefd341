//! gsc CLI - Search Console reports from the terminal

use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gsc_batch::auth::mask_token;
use gsc_batch::report::{date_range_from_today, map_queries, sitemap_url};
use gsc_batch::{
    ApiClient, Credential, FixSuggestion, GscConfig, GscError, NoRefresh, OAuthRefresher,
    SearchAnalyticsQuery, SearchConsole, TokenCache, TokenRefresher,
};

#[derive(Parser)]
#[command(name = "gsc")]
#[command(about = "Batched Search Console API client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List properties the token can access
    Sites,

    /// Top search queries by clicks
    Queries {
        /// Property URL (defaults to config `defaults.site_url`)
        site: Option<String>,

        /// Days to cover, ending today
        #[arg(short, long)]
        days: Option<u32>,

        /// Number of rows
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// Dimension to group by (query, page, country, device)
        #[arg(long, default_value = "query")]
        dimension: String,
    },

    /// List submitted sitemaps
    Sitemaps {
        /// Property URL (defaults to config `defaults.site_url`)
        site: Option<String>,
    },

    /// Submit a sitemap (defaults to <site origin>/sitemap.xml)
    SubmitSitemap {
        site: String,

        #[arg(long)]
        feed: Option<String>,
    },

    /// Inspect the index status of URLs (sent through /batch)
    Inspect {
        site: String,

        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Print the date range a report would cover
    Dates {
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Show which token would be used
    Token {
        /// Delete the cached token instead
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays pipeable; RUST_LOG overrides `info`
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), GscError> {
    let config = GscConfig::load()?.with_env();

    match command {
        Commands::Sites => {
            let sites = build_console(&config).await?.list_sites().await?;
            if sites.site_entry.is_empty() {
                println!("{}", "No properties".dimmed());
            }
            for site in sites.site_entry {
                println!(
                    "{}  {}",
                    site.site_url.cyan(),
                    site.permission_level.unwrap_or_default().dimmed()
                );
            }
        }

        Commands::Queries {
            site,
            days,
            limit,
            dimension,
        } => {
            let site = resolve_site(&config, site)?;
            let days = days.unwrap_or_else(|| config.default_days());
            let query = SearchAnalyticsQuery::last_days(days, chrono::Utc::now().date_naive())
                .with_dimension(dimension)
                .with_row_limit(limit);

            println!(
                "{} {} | {} → {}",
                "→".cyan(),
                site.cyan().bold(),
                query.start_date,
                query.end_date
            );

            let response = build_console(&config).await?
                .query_search_analytics(&site, &query)
                .await?;

            let shares = map_queries(&response);
            if shares.is_empty() {
                println!("{}", "No data".dimmed());
            }
            for share in shares {
                let bar = "█".repeat((share.percent * 30.0).round() as usize);
                println!("{:<48} {:>8} {}", share.key, share.val, bar.green());
            }
        }

        Commands::Sitemaps { site } => {
            let site = resolve_site(&config, site)?;
            let sitemaps = build_console(&config).await?.list_sitemaps(&site).await?;
            for sitemap in sitemaps.sitemap {
                let pending = if sitemap.is_pending.unwrap_or(false) {
                    " (pending)".yellow().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{}{}  {}",
                    sitemap.path.cyan(),
                    pending,
                    sitemap.last_submitted.unwrap_or_default().dimmed()
                );
            }
        }

        Commands::SubmitSitemap { site, feed } => {
            let feed = match feed {
                Some(feed) => feed,
                None => sitemap_url(&site)?,
            };
            build_console(&config).await?.submit_sitemap(&site, &feed).await?;
            println!("{} Submitted {}", "✓".green(), feed);
        }

        Commands::Inspect { site, urls } => {
            let summaries = build_console(&config).await?.inspect_urls(&site, &urls).await?;
            for summary in &summaries {
                let verdict = summary.verdict.as_deref().unwrap_or("UNKNOWN");
                let verdict = if verdict == "PASS" {
                    verdict.green()
                } else {
                    verdict.yellow()
                };
                println!(
                    "{:<8} {}  {}",
                    verdict,
                    summary.url,
                    summary.coverage_state.as_deref().unwrap_or_default().dimmed()
                );
            }
            if summaries.len() < urls.len() {
                eprintln!(
                    "{} {} of {} URLs had no decodable result",
                    "!".yellow(),
                    urls.len() - summaries.len(),
                    urls.len()
                );
            }
        }

        Commands::Dates { days } => {
            for date in date_range_from_today(days.unwrap_or_else(|| config.default_days())) {
                println!("{}", date);
            }
        }

        Commands::Token { clear: true } => {
            let cache = TokenCache::default_location();
            cache.clear()?;
            println!("{} Cleared {}", "✓".green(), cache.path().display());
        }

        Commands::Token { clear: false } => {
            let cache = TokenCache::default_location();
            let cached = cache.load()?;
            match Credential::resolve(config.access_token.as_deref(), cached.as_ref()) {
                Some(credential) => {
                    let from_cache = cached
                        .as_ref()
                        .is_some_and(|r| r.access_token == credential.as_str());
                    let cached_is_expired = from_cache
                        && cached.as_ref().is_some_and(|r| r.is_expired_at(now_timestamp()));
                    let source = if from_cache {
                        cache.path().display().to_string()
                    } else {
                        "GSC_ACCESS_TOKEN".to_string()
                    };
                    println!("Token: {}", mask_token(credential.as_str(), 8));
                    println!("  Source: {}", source);
                    if cached_is_expired {
                        println!("  {}", "Expired".yellow());
                    }
                }
                None => return Err(GscError::MissingToken),
            }
            println!(
                "  Refresh: {}",
                if config.has_oauth_client() {
                    "oauth".green()
                } else {
                    "disabled".dimmed()
                }
            );
        }
    }

    Ok(())
}

fn resolve_site(config: &GscConfig, site: Option<String>) -> Result<String, GscError> {
    site.or_else(|| config.defaults.site_url.clone())
        .ok_or_else(|| GscError::ConfigError {
            reason: "No site given and defaults.site_url is not set".to_string(),
        })
}

fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn build_console(config: &GscConfig) -> Result<SearchConsole, GscError> {
    let cache = TokenCache::default_location();
    let mut cached = cache.load()?;

    let refresher: Arc<dyn TokenRefresher> = match OAuthRefresher::from_config(config, cache)? {
        Some(refresher) => Arc::new(refresher),
        None => Arc::new(NoRefresh),
    };

    // Cached token already past expires_at: refresh before the first call
    if cached
        .as_ref()
        .is_some_and(|record| record.is_expired_at(now_timestamp()))
    {
        if let Some(record) = refresher.refresh().await {
            cached = Some(record);
        }
    }

    let credential = Credential::resolve(config.access_token.as_deref(), cached.as_ref())
        .ok_or(GscError::MissingToken)?;

    let client = ApiClient::new(credential, refresher)?.with_base_url(config.base_url());
    Ok(SearchConsole::new(client))
}
