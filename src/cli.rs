use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};

use crate::client::StoreClient;
use crate::config::{BackendConfig, Config};
use crate::error::{Result, ShopError};
use crate::logging;
use crate::mock::{MockServer, Store};
use crate::products::{ProductDraft, ProductId, ProductPatch};
use crate::query::{FilterSet, KeyRule, PageSpec, ProductQuery, SortOrder, SortSpec};

#[derive(Parser)]
#[command(
    name = "shopfront",
    version,
    about = "Shopfront: storefront catalog client and mock backend"
)]
pub struct Cli {
    /// Configuration file (default: config.toml in the user config directory)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the configured one
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search products with filters, sorting and paging
    Products(ProductsArgs),

    /// Show a single product
    Product {
        /// Product id
        id: String,
    },

    /// List the brands available for filtering
    Brands,

    /// List the categories available for filtering
    Categories,

    /// Create a product from a JSON file
    Create {
        /// JSON file with the product fields
        file: PathBuf,
    },

    /// Apply a partial update from a JSON file
    Update {
        /// Product id
        id: String,

        /// JSON file with the fields to change
        file: PathBuf,
    },

    /// Soft-delete a product
    Delete {
        /// Product id
        id: String,
    },

    /// Run a json-server compatible fake backend
    #[command(name = "mock-server")]
    MockServer {
        /// json-server style database file (default: bundled demo catalog)
        #[arg(long = "db")]
        db: Option<PathBuf>,

        /// Host to bind (default from config)
        #[arg(long = "host")]
        host: Option<String>,

        /// Port to bind (default from config)
        #[arg(long = "port", short = 'p')]
        port: Option<u16>,
    },
}

#[derive(Args, Debug)]
pub struct ProductsArgs {
    /// Category to filter by (repeatable, the last one is used)
    #[arg(long = "category", short = 'c')]
    pub category: Vec<String>,

    /// Brand to filter by (repeatable, the last one is used)
    #[arg(long = "brand", short = 'b')]
    pub brand: Vec<String>,

    /// Minimum rating
    #[arg(long = "rating", short = 'r')]
    pub rating: Option<f64>,

    /// Any other filter as key=value (repeatable)
    #[arg(long = "filter", short = 'f', value_parser = parse_key_value)]
    pub filter: Vec<(String, String)>,

    /// Field to sort by
    #[arg(long = "sort", short = 's')]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(
        long = "order",
        value_parser = clap::builder::PossibleValuesParser::new(["asc", "desc"]),
        default_value = "asc",
        requires = "sort"
    )]
    pub order: String,

    /// Page number, starting at 1
    #[arg(long = "page", default_value_t = 1)]
    pub page: u32,

    /// Products per page
    #[arg(long = "limit", short = 'l', default_value_t = PageSpec::DEFAULT_LIMIT)]
    pub limit: u32,

    /// Print the request path without sending it
    #[arg(long = "query-only", default_value_t = false)]
    pub query_only: bool,
}

impl ProductsArgs {
    pub fn to_query(&self) -> Result<ProductQuery> {
        let mut filters = FilterSet::new();

        for category in &self.category {
            filters.select("category", category.as_str());
        }
        for brand in &self.brand {
            filters.select("brand", brand.as_str());
        }
        if let Some(rating) = self.rating {
            filters.set("rating", rating);
        }
        for (key, value) in &self.filter {
            if KeyRule::is_reserved(key) {
                return Err(ShopError::InvalidQuery(format!(
                    "'{}' is set with --sort, --order, --page or --limit",
                    key
                )));
            }
            filters.set(key.as_str(), value.as_str());
        }

        let sort = match &self.sort {
            Some(field) => {
                let order: SortOrder = self
                    .order
                    .parse()
                    .map_err(|_| ShopError::InvalidQuery(format!("Invalid order '{}'", self.order)))?;
                Some(SortSpec::new(field.as_str(), order))
            }
            None => None,
        };

        Ok(ProductQuery::new(filters, sort, PageSpec::new(self.page, self.limit)?))
    }
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

impl Cli {
    pub fn handle_command_line() -> Result<()> {
        let args = Cli::parse();

        let mut config = match &args.config {
            Some(path) => Config::load_from(path),
            None => Config::load_config(&Config::project_dirs()?),
        };
        if let Some(base_url) = &args.base_url {
            config.backend = BackendConfig {
                timeout_secs: config.backend.timeout_secs,
                ..BackendConfig::new(base_url.as_str())
            };
        }

        logging::init(&config.logging)?;
        debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());
        debug!("Using backend {}", config.backend.base_url);

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ShopError::Error(format!("Failed to create runtime: {}", e)))?;

        rt.block_on(Self::run(args.command, config))
    }

    async fn run(command: Command, config: Config) -> Result<()> {
        // Building the client opens no connection
        let client = StoreClient::new(&config.backend)?;

        match command {
            Command::Products(products_args) => {
                let query = products_args.to_query()?;
                if products_args.query_only {
                    println!("{}", StoreClient::products_path(&query));
                    return Ok(());
                }
                print_json(&client.fetch_products(&query).await?)
            }
            Command::Product { id } => {
                print_json(&client.fetch_product_by_id(&ProductId::from(id.as_str())).await?)
            }
            Command::Brands => print_json(&client.fetch_brands().await?),
            Command::Categories => print_json(&client.fetch_categories().await?),
            Command::Create { file } => {
                let draft: ProductDraft = read_json(&file)?;
                let product = client.create_product(&draft).await?;
                info!("Created product {}", product.id);
                print_json(&product)
            }
            Command::Update { id, file } => {
                let patch: ProductPatch = read_json(&file)?;
                if patch.is_empty() {
                    return Err(ShopError::Error(format!(
                        "{} contains no fields to update",
                        file.display()
                    )));
                }
                print_json(&client.update_product(&ProductId::from(id.as_str()), &patch).await?)
            }
            Command::Delete { id } => {
                let id = client.soft_delete_product(ProductId::from(id.as_str())).await?;
                info!("Soft-deleted product {}", id);
                println!("{}", id);
                Ok(())
            }
            Command::MockServer { db, host, port } => {
                Self::run_mock_server(db, host, port, &config).await
            }
        }
    }

    async fn run_mock_server(
        db: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
        config: &Config,
    ) -> Result<()> {
        let store = match &db {
            Some(path) => Store::load(path)?,
            None => Store::sample()?,
        };

        let mut mock = config.mock.clone();
        if let Some(host) = host {
            mock.host = host;
        }
        if let Some(port) = port {
            mock.port = port;
        }

        let server = MockServer::bind(&mock.addr(), store).await?;
        println!("Mock backend running on http://{}", server.local_addr()?);
        server.serve().await
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
