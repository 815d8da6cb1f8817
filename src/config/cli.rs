use crate::config::{CatalogMode, StorefrontConfig};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "pharma-cart")]
#[command(about = "Pharmacy storefront client: catalog, cart and delivery account tools")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Use the offline demo catalog
    #[arg(long, global = true)]
    pub demo: bool,

    /// Bearer token for authenticated endpoints
    #[arg(long, global = true, env = "PHARMA_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Session cookie for prescription endpoints
    #[arg(long, global = true, env = "PHARMA_SESSION_COOKIE")]
    pub session_cookie: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the medicine catalog
    Catalog,

    /// Build a cart from the catalog and show totals and checkout eligibility
    Cart {
        /// Add one unit of a medicine id (repeatable)
        #[arg(long = "add")]
        add: Vec<String>,

        /// Set a quantity, e.g. `m1=3`; zero removes the line (repeatable)
        #[arg(long = "set", value_parser = parse_quantity)]
        set: Vec<(String, i64)>,

        /// Prescription status to check against; fetched from the API when omitted
        #[arg(long)]
        prescription_status: Option<String>,

        /// Complete checkout when eligible
        #[arg(long)]
        checkout: bool,
    },

    /// List uploaded prescriptions
    Prescriptions,

    /// Show refill suggestions
    Refills,

    /// Request a delivery account password reset OTP
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Reset a delivery account password with the emailed OTP
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        otp: String,
        #[arg(long)]
        password: String,
    },
}

fn parse_quantity(raw: &str) -> std::result::Result<(String, i64), String> {
    let (id, qty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=QTY, got '{}'", raw))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity '{}': {}", qty, e))?;
    Ok((id.trim().to_string(), qty))
}

impl Cli {
    /// 載入配置檔（若有）並套用命令列覆寫
    pub fn load_config(&self) -> Result<StorefrontConfig> {
        let mut config = match &self.config {
            Some(path) => StorefrontConfig::from_file(path)?,
            None => StorefrontConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if self.demo {
            config.catalog.mode = CatalogMode::Demo;
        }
        if self.auth_token.is_some() {
            config.api.auth_token = self.auth_token.clone();
        }
        if self.session_cookie.is_some() {
            config.api.session_cookie = self.session_cookie.clone();
        }

        Ok(config)
    }
}
