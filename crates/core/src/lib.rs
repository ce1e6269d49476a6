pub mod catalog;
pub mod collection;
pub mod config;
pub mod detail;
pub mod list;
pub mod search;
pub mod testing;

pub use catalog::{
    genre_filter_param, CatalogClient, CatalogError, CatalogItem, CatalogItemDetail, RawgClient,
    SearchRequest, Tag,
};
pub use collection::{
    CollectionEntry, CollectionStorage, CollectionStore, SqliteStorage, StorageError,
    Subscription,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ApiConfig, Config, ConfigError,
    SanitizedConfig, SearchConfig, StorageConfig,
};
pub use detail::{DetailController, DetailError, DetailSnapshot};
pub use list::{ListController, ListSnapshot, LoadPhase, Query, SortOption, UnknownSortOption};
pub use search::SearchController;
