mod cli;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamedex_core::{
    load_config, validate_config, CatalogClient, CatalogItem, CatalogItemDetail,
    CollectionStore, Config, DetailController, ListController, ListSnapshot, LoadPhase,
    RawgClient, SanitizedConfig, SearchController, SortOption, SqliteStorage,
};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine config path
    let config_path = cli
        .config
        .map(PathBuf::from)
        .or_else(|| std::env::var("GAMEDEX_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Dispatch command
    match cli.command {
        Commands::Browse {
            search,
            genres,
            sort,
            pages,
        } => browse(&config, search, genres, sort, pages).await,
        Commands::Search { text } => search(&config, text).await,
        Commands::Show { id } => show(&config, id).await,
        Commands::Save { id } => save(&config, id).await,
        Commands::Remove { id } => remove(&config, id),
        Commands::Collection => collection(&config),
        Commands::Config => {
            let sanitized = SanitizedConfig::from(&config);
            println!("{}", serde_json::to_string_pretty(&sanitized)?);
            Ok(())
        }
    }
}

fn catalog(config: &Config) -> Result<Arc<dyn CatalogClient>> {
    let client = RawgClient::new(&config.api).context("Failed to create catalog client")?;
    Ok(Arc::new(client))
}

fn open_collection(config: &Config) -> Result<CollectionStore> {
    let storage = SqliteStorage::new(&config.storage.path)
        .with_context(|| format!("Failed to open storage at {:?}", config.storage.path))?;
    Ok(CollectionStore::open(
        Arc::new(storage),
        config.storage.collection_key.clone(),
    ))
}

async fn browse(
    config: &Config,
    text: Option<String>,
    genres: Vec<String>,
    sort: SortOption,
    pages: u32,
) -> Result<()> {
    let list = ListController::new(catalog(config)?);

    // Local sorts apply to every page as it arrives
    if sort.is_local() {
        list.set_sort(sort).await;
    }

    let genres: BTreeSet<String> = genres.into_iter().collect();
    if text.is_some() || !genres.is_empty() {
        list.set_filters(text.unwrap_or_default(), genres).await;
    } else {
        list.ensure_loaded().await;
    }

    for _ in 1..pages {
        let snapshot = list.snapshot().await;
        if !snapshot.has_more || snapshot.phase == LoadPhase::Errored {
            break;
        }
        list.load_next().await;
    }

    print_list(&list.snapshot().await)
}

async fn search(config: &Config, text: String) -> Result<()> {
    if text.trim().chars().count() < config.search.min_query_len {
        bail!(
            "Search text must be at least {} characters",
            config.search.min_query_len
        );
    }

    let list = ListController::new(catalog(config)?);
    let mut updates = list.subscribe();
    let search = SearchController::new(list, &config.search);
    search.input(text.clone()).await;

    let snapshot = updates
        .wait_for(|s| {
            s.query.text == text && matches!(s.phase, LoadPhase::Loaded | LoadPhase::Errored)
        })
        .await
        .context("List controller closed")?
        .clone();

    print_list(&snapshot)
}

async fn show(config: &Config, id: u64) -> Result<()> {
    let store = open_collection(config)?;
    let detail = load_detail(config, id, &store).await?;
    let saved = detail.is_saved();
    let Some(record) = detail.detail().await else {
        bail!("Game {} has no details", id);
    };

    print_detail(&record, saved);
    Ok(())
}

async fn save(config: &Config, id: u64) -> Result<()> {
    let store = open_collection(config)?;
    let detail = load_detail(config, id, &store).await?;

    if detail.is_saved() {
        println!("Game {} is already in the collection", id);
        return Ok(());
    }
    detail.toggle_saved(&store).await?;
    println!("Saved game {}", id);
    Ok(())
}

fn remove(config: &Config, id: u64) -> Result<()> {
    let store = open_collection(config)?;
    if store.remove(id) {
        println!("Removed game {}", id);
    } else {
        println!("Game {} was not in the collection", id);
    }
    Ok(())
}

fn collection(config: &Config) -> Result<()> {
    let store = open_collection(config)?;
    if store.is_empty() {
        println!("The collection is empty");
        return Ok(());
    }
    for entry in store.entries() {
        print_item(&entry.summary());
    }
    Ok(())
}

async fn load_detail(
    config: &Config,
    id: u64,
    store: &CollectionStore,
) -> Result<DetailController> {
    let detail = DetailController::new(id, catalog(config)?);
    detail.observe_collection_membership(store);
    detail.fetch_detail().await;

    let snapshot = detail.snapshot().await;
    if snapshot.phase == LoadPhase::Errored {
        bail!(
            "{}",
            snapshot
                .error
                .unwrap_or_else(|| "Failed to load game".to_string())
        );
    }
    Ok(detail)
}

fn print_list(snapshot: &ListSnapshot) -> Result<()> {
    if let Some(message) = &snapshot.error {
        bail!("{}", message);
    }
    if snapshot.items.is_empty() {
        println!("No games found");
        return Ok(());
    }
    for item in &snapshot.items {
        print_item(item);
    }
    Ok(())
}

fn print_item(item: &CatalogItem) {
    let genres: Vec<&str> = item.genres.iter().map(|g| g.name.as_str()).collect();
    println!(
        "{:>8}  {:<40}  {:>4.2}  {:<10}  {}",
        item.id,
        item.name,
        item.rating,
        item.released.as_deref().unwrap_or("-"),
        genres.join(", ")
    );
}

fn print_detail(detail: &CatalogItemDetail, saved: bool) {
    println!("{} ({})", detail.name, detail.id);
    println!("Rating:    {:.2}", detail.rating);
    if let Some(score) = detail.metacritic {
        println!("Metacritic: {}", score);
    }
    println!("Released:  {}", detail.released.as_deref().unwrap_or("-"));
    let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
    println!("Genres:    {}", genres.join(", "));
    let platforms: Vec<&str> = detail.platforms.iter().map(|p| p.name.as_str()).collect();
    println!("Platforms: {}", platforms.join(", "));
    if let Some(cover) = detail.cover_image_url() {
        println!("Cover:     {}", cover);
    }
    println!("Saved:     {}", if saved { "yes" } else { "no" });
    if let Some(description) = detail.plain_description() {
        println!();
        println!("{}", description);
    }
}
