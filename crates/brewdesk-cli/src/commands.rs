//! Subcommand handlers.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use brewdesk_core::api::ConnectionStatus;
use brewdesk_core::auth::{AuthState, CredentialStore, FileStore, SessionStore};
use brewdesk_core::models::{
    canonical_category, product_categories, OrderFilter, OrderStatus, Product, ProductFilter,
    ProductInput, PRODUCT_CATEGORIES,
};
use brewdesk_core::notify::{Notification, Notifier};
use brewdesk_core::{ApiClient, Authenticator, Config};
use clap::Args;
use tracing::{info, warn};

use crate::output::{self, print_lines};
use crate::terminal::{TerminalNotifier, TerminalObserver};

/// Product fields for `product-add`
#[derive(Args, Debug, Clone)]
pub struct NewProduct {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value = "", help = category_help())]
    pub category: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Image URL
    #[arg(long, default_value = "")]
    pub image: String,
    #[arg(long, default_value_t = 0.0)]
    pub rating: f64,
    /// e.g. "3-4 min"
    #[arg(long, default_value = "")]
    pub brew_time: String,
    #[arg(long, default_value_t = brewdesk_core::models::DEFAULT_STOCK)]
    pub stock: i64,
    /// List the product as not orderable
    #[arg(long)]
    pub unavailable: bool,
}

impl NewProduct {
    pub fn into_input(self) -> ProductInput {
        let mut input = ProductInput::new(self.name.trim(), self.price);
        input.category = catalogue_spelling(self.category);
        input.description = self.description;
        input.image = self.image;
        input.rating = self.rating;
        input.brew_time = self.brew_time;
        input.stock = self.stock;
        input.is_available = !self.unavailable;
        input
    }
}

/// Fields to change with `product-update`; anything left out keeps its value
#[derive(Args, Debug, Clone, Default)]
pub struct ProductChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long, help = category_help())]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub rating: Option<f64>,
    #[arg(long)]
    pub brew_time: Option<String>,
    #[arg(long)]
    pub stock: Option<i64>,
    #[arg(long)]
    pub available: Option<bool>,
}

impl ProductChanges {
    pub fn apply(self, product: &Product) -> ProductInput {
        let mut input = ProductInput::from_product(product);
        if let Some(name) = self.name {
            input.name = name.trim().to_string();
        }
        if let Some(price) = self.price {
            input.price = price;
        }
        if let Some(category) = self.category {
            input.category = catalogue_spelling(category);
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(image) = self.image {
            input.image = image;
        }
        if let Some(rating) = self.rating {
            input.rating = rating;
        }
        if let Some(brew_time) = self.brew_time {
            input.brew_time = brew_time;
        }
        if let Some(stock) = self.stock {
            input.stock = stock;
        }
        if let Some(available) = self.available {
            input.is_available = available;
        }
        input
    }
}

fn category_help() -> String {
    format!("One of: {}", PRODUCT_CATEGORIES.join(", "))
}

/// Known categories take their catalogue spelling; anything else is left
/// for `ProductInput::validate` to reject.
fn catalogue_spelling(category: String) -> String {
    match canonical_category(&category) {
        Some(known) => known.to_string(),
        None => category.trim().to_string(),
    }
}

/// Parse a status given on the command line, rejecting unknown values
pub fn parse_status(value: &str) -> Result<OrderStatus> {
    match OrderStatus::from(value.trim().to_string()) {
        OrderStatus::Unknown(other) => {
            let known: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
            bail!("Unknown status '{}'. Expected one of: {}", other, known.join(", "))
        }
        status => Ok(status),
    }
}

/// Everything a command needs: config, the session-bound gateway, and the
/// terminal hooks it reports through.
pub struct Console {
    config: Config,
    auth: Authenticator,
    observer: Arc<TerminalObserver>,
}

impl Console {
    pub fn new(config: Config, api_url: Option<&str>) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        let storage = Arc::new(FileStore::in_dir(&cache_dir));
        let session = Arc::new(SessionStore::new(storage));

        let gateway = config.gateway_config(api_url)?;
        let api = ApiClient::new(&gateway, session, Arc::new(TerminalNotifier))?;
        info!(base_url = %api.base_url(), "Gateway ready");

        let observer = Arc::new(TerminalObserver::default());
        let auth = Authenticator::new(api, observer.clone());

        Ok(Self {
            config,
            auth,
            observer,
        })
    }

    fn api(&self) -> &ApiClient {
        self.auth.api()
    }

    fn require_login(&self) -> Result<()> {
        if !self.auth.is_authenticated() {
            bail!("Not logged in. Run `brewdesk login` first.");
        }
        Ok(())
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn login(&mut self, email: Option<String>, remember: bool) -> Result<()> {
        let email = match email {
            Some(email) => email.trim().to_string(),
            None => prompt_email(self.config.last_email.as_deref())?,
        };

        let credentials = CredentialStore::for_backend(self.api().base_url());
        let password = if credentials.has_credentials(&email)
            && confirm("Use stored password? [Y/n]: ", true)?
        {
            credentials.get_password(&email)?
        } else {
            rpassword::prompt_password("Password: ")?
        };

        eprintln!("Authenticating...");
        self.observer.set_login_view(true);
        let result = self.auth.login(&email, &password).await;
        self.observer.set_login_view(false);
        let profile = result?;

        if remember {
            if let Err(e) = credentials.store(&email, &password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        TerminalNotifier.notify(Notification::success("Login successful!"));
        println!("Welcome, {}", profile.display_name());
        Ok(())
    }

    pub fn logout(&self, forget: bool) -> Result<()> {
        let email = self
            .auth
            .current_profile()
            .and_then(|p| p.email)
            .or_else(|| self.config.last_email.clone());

        self.auth.logout();

        if forget {
            if let Some(email) = email {
                let credentials = CredentialStore::for_backend(self.api().base_url());
                if credentials.has_credentials(&email) {
                    credentials.delete(&email)?;
                    println!("Forgot stored password for {}", email);
                }
            }
        }
        Ok(())
    }

    pub fn whoami(&self) -> Result<()> {
        match self.auth.state() {
            AuthState::Authenticated(profile) => print_lines(&output::profile_lines(&profile)),
            _ => println!("Not logged in. Run `brewdesk login` to sign in."),
        }
        Ok(())
    }

    pub async fn status(&self) -> Result<()> {
        println!("Backend: {}", self.api().base_url());
        match self.api().test_connection().await {
            ConnectionStatus::Connected(data) => {
                println!("Connection: connected");
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
            ConnectionStatus::Unreachable(reason) => {
                println!("Connection: unreachable ({})", reason);
            }
        }
        match self.auth.state() {
            AuthState::Authenticated(profile) => {
                println!("Session: signed in as {}", profile.display_name())
            }
            _ => println!("Session: not signed in"),
        }
        Ok(())
    }

    // ========================================================================
    // Dashboard and orders
    // ========================================================================

    pub async fn dashboard(&self) -> Result<()> {
        self.require_login()?;
        let dashboard = self
            .api()
            .dashboard()
            .await
            .context("Failed to fetch dashboard data")?;
        print_lines(&output::dashboard_lines(&dashboard));
        Ok(())
    }

    pub async fn orders(&self, search: Option<String>, status: &str) -> Result<()> {
        self.require_login()?;
        let orders = self.api().orders().await.context("Failed to fetch orders")?;

        let filter = OrderFilter {
            search: search.unwrap_or_default(),
            status: OrderStatus::from_filter(status),
        };
        let shown = filter.apply(&orders);
        if shown.is_empty() {
            println!("No orders found");
            return Ok(());
        }

        println!("{}", output::order_header());
        for order in &shown {
            println!("{}", output::order_row(order));
        }
        println!("{} of {} orders", shown.len(), orders.len());
        Ok(())
    }

    pub async fn order(&self, id: i64) -> Result<()> {
        self.require_login()?;
        let order = self.api().order(id).await.context("Failed to fetch order")?;
        print_lines(&output::order_detail(&order));
        Ok(())
    }

    /// Move an order to the next step of its workflow
    pub async fn advance(&self, id: i64) -> Result<()> {
        self.require_login()?;
        let order = self.api().order(id).await.context("Failed to fetch order")?;
        let Some(next) = order.status.next() else {
            bail!("Order {} is {} and cannot advance", order.order_number, order.status);
        };
        self.set_status(id, next).await
    }

    pub async fn set_status(&self, id: i64, status: OrderStatus) -> Result<()> {
        self.require_login()?;
        let updated = self
            .api()
            .update_order_status(id, status)
            .await
            .context("Failed to update order status")?;
        TerminalNotifier.notify(Notification::success("Order status updated"));

        let order = match updated {
            Some(order) => order,
            None => self.api().order(id).await.context("Failed to fetch order")?,
        };
        println!("{}", output::order_row(&order));
        Ok(())
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn products(&self, search: Option<String>, category: &str) -> Result<()> {
        self.require_login()?;
        let products = self
            .api()
            .products()
            .await
            .context("Failed to fetch products")?;

        let filter = ProductFilter {
            search: search.unwrap_or_default(),
            ..Default::default()
        }
        .with_category(category);
        let shown = filter.apply(&products);
        if shown.is_empty() {
            println!("No products found");
        } else {
            println!("{}", output::product_header());
            for product in &shown {
                println!("{}", output::product_row(product));
            }
        }

        let categories = product_categories(&products);
        if !categories.is_empty() {
            println!("Categories: {}", categories.join(", "));
        }
        Ok(())
    }

    pub async fn product_add(&self, product: NewProduct) -> Result<()> {
        self.require_login()?;
        let input = product.into_input();
        input.validate().map_err(anyhow::Error::msg)?;

        let created = self
            .api()
            .create_product(&input)
            .await
            .context("Failed to create product")?;
        TerminalNotifier.notify(Notification::success("Product created successfully"));
        if let Some(created) = created {
            println!("{}", output::product_row(&created));
        }
        Ok(())
    }

    pub async fn product_update(&self, id: i64, changes: ProductChanges) -> Result<()> {
        self.require_login()?;
        let current = self
            .api()
            .product(id)
            .await
            .context("Failed to fetch product")?;
        let input = changes.apply(&current);
        input.validate().map_err(anyhow::Error::msg)?;

        let updated = self
            .api()
            .update_product(id, &input)
            .await
            .context("Failed to update product")?;
        TerminalNotifier.notify(Notification::success("Product updated successfully"));

        let product = match updated {
            Some(product) => product,
            None => self.api().product(id).await.context("Failed to fetch product")?,
        };
        println!("{}", output::product_row(&product));
        Ok(())
    }

    pub async fn product_delete(&self, id: i64, yes: bool) -> Result<()> {
        self.require_login()?;
        if !yes && !confirm("Are you sure you want to delete this product? [y/N]: ", false)? {
            println!("Cancelled");
            return Ok(());
        }
        self.api()
            .delete_product(id)
            .await
            .context("Failed to delete product")?;
        TerminalNotifier.notify(Notification::success("Product deleted successfully"));
        Ok(())
    }
}

/// `brewdesk config`: update or show the stored settings. Runs without a
/// gateway so a missing backend URL can be fixed here.
pub fn configure(mut config: Config, api_url: Option<String>, timeout: Option<u64>) -> Result<()> {
    let changed = api_url.is_some() || timeout.is_some();
    if let Some(url) = api_url {
        check_backend_url(&url)?;
        config.api_url = Some(url.trim().to_string());
    }
    if let Some(secs) = timeout {
        config.request_timeout_secs = Some(secs);
    }

    if changed {
        config.save()?;
        println!("Saved {}", Config::config_path()?.display());
    }

    println!("api_url: {}", config.api_url.as_deref().unwrap_or("(not set)"));
    println!("request_timeout: {}s", config.request_timeout().as_secs());
    println!("last_email: {}", config.last_email.as_deref().unwrap_or("(none)"));
    Ok(())
}

fn check_backend_url(url: &str) -> Result<()> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Backend URL must start with http:// or https://");
    }
    Ok(())
}

fn prompt_email(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(match input.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}
