use clap::Parser;
use pharma_cart::config::cli::{Cli, Command};
use pharma_cart::domain::model::PrescriptionStatus;
use pharma_cart::domain::money::format_amount;
use pharma_cart::utils::error::{ErrorSeverity, StoreError};
use pharma_cart::utils::{logger, validation::Validate};
use pharma_cart::{
    DeliveryRecovery, MemoryNotifier, Storefront, StorefrontClient, StorefrontConfig,
    TracingNotifier,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(&config.logging.level);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(e: &StoreError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 3,
        ErrorSeverity::Critical => 4,
    }
}

async fn run(cli: &Cli, config: &StorefrontConfig) -> pharma_cart::Result<()> {
    let symbol = config.display.currency_symbol.as_str();

    match &cli.command {
        Command::Catalog => {
            let mut store = Storefront::from_config(config, TracingNotifier)?;
            store.refresh_catalog().await?;

            for item in store.session().catalog().items() {
                println!(
                    "{:<24} {:<32} {:>10} {}",
                    item.id,
                    item.name,
                    format_amount(symbol, item.price),
                    if item.prescription_required { "Rx" } else { "" }
                );
            }
        }

        Command::Cart {
            add,
            set,
            prescription_status,
            checkout,
        } => {
            // 購物車通知直接印在結果前面
            let notifier = MemoryNotifier::new();
            let mut store = Storefront::from_config(config, notifier.clone())?;
            store.refresh_catalog().await?;

            for item_id in add {
                store.session_mut().add_item(item_id)?;
            }
            for (item_id, quantity) in set {
                store.session_mut().set_quantity(item_id, *quantity)?;
            }
            for notice in notifier.drain() {
                println!("{}", notice);
            }

            let session = store.session();
            for line in session.cart().lines() {
                let name = session
                    .catalog()
                    .get(&line.item_id)
                    .map(|i| i.name.as_str())
                    .unwrap_or("(unavailable)");
                println!("{:<24} {:<32} x{}", line.item_id, name, line.quantity);
            }
            println!(
                "Items: {}  Total: {}",
                session.cart().item_count(),
                format_amount(symbol, session.total())
            );

            let status = match prescription_status {
                Some(raw) => Some(PrescriptionStatus::parse(raw).ok_or_else(|| {
                    StoreError::validation(
                        "prescription_status",
                        format!("Unknown prescription status '{}'", raw),
                    )
                })?),
                None if session.can_checkout(None) => None,
                None => store.attached_prescription_status().await?,
            };
            let verdict = store.session().evaluate_checkout(status);
            println!(
                "Checkout: {}",
                if verdict.is_allowed() { "allowed" } else { "blocked" }
            );

            if *checkout {
                let summary = store.session_mut().complete_checkout(status)?;
                println!(
                    "✅ Order ready: {} line(s), {}",
                    summary.lines.len(),
                    format_amount(symbol, summary.total)
                );
            }
        }

        Command::Prescriptions => {
            let store = Storefront::from_config(config, TracingNotifier)?;
            for record in store.prescriptions().await? {
                println!(
                    "{:<26} {:<10} {:<20} {}",
                    record.id,
                    record.status,
                    record.doctor_name.as_deref().unwrap_or("-"),
                    record.created_at.format("%Y-%m-%d")
                );
            }
        }

        Command::Refills => {
            let store = Storefront::from_config(config, TracingNotifier)?;
            for suggestion in store.refill_suggestions().await {
                println!("💊 {}", suggestion.message);
            }
        }

        Command::ForgotPassword { email } => {
            let recovery =
                DeliveryRecovery::new(StorefrontClient::new(&config.api)?, TracingNotifier);
            let ticket = recovery.request_reset(email).await?;
            println!("✅ {}", ticket.message);
            println!("🔑 Reset token: {}", ticket.token);
        }

        Command::ResetPassword {
            token,
            otp,
            password,
        } => {
            let recovery =
                DeliveryRecovery::new(StorefrontClient::new(&config.api)?, TracingNotifier);
            let response = recovery.reset_password(token, otp, password).await?;
            println!("✅ {}", response.message);
        }
    }

    Ok(())
}
