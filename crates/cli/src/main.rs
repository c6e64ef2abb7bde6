//! EcoSort CLI - Main entry point

use clap::{Parser, Subcommand};
use ecosort_cli::{commands, AppContext};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecosort")]
#[command(about = "EcoSort - credit ledger and anti-abuse gate", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    Register {
        /// User ID
        user: String,
    },

    /// Mark a user's phone as verified
    VerifyPhone {
        /// User ID
        user: String,
        /// Phone number in E.164 form
        phone: String,
    },

    /// Grant the first free trial (runs the eligibility gate)
    GrantTrial {
        /// User ID
        user: String,
        /// Device the signup came from
        #[arg(long)]
        device: String,
        /// IP the signup came from
        #[arg(long)]
        ip: IpAddr,
    },

    /// Grant the second trial once the first has expired
    GrantSecond {
        /// User ID
        user: String,
    },

    /// Claim the ad-watch bonus
    AdBonus {
        /// User ID
        user: String,
        /// Number of rewarded videos watched
        #[arg(long, default_value = "4")]
        videos: u32,
    },

    /// Record a subscription purchase or renewal
    Subscribe {
        /// User ID
        user: String,
        /// Subscription tier (PRO or ULTRA)
        tier: String,
    },

    /// Record an outright credit purchase
    Purchase {
        /// User ID
        user: String,
        /// Credits purchased
        amount: i64,
    },

    /// Deduct credits for a metered AI operation
    Deduct {
        /// User ID
        user: String,
        /// Credits to deduct
        amount: i64,
        /// Metered feature that triggered the charge
        #[arg(long)]
        feature: Option<String>,
    },

    /// Show a user's balance
    Balance {
        /// User ID
        user: String,
    },

    /// Record a login on a device
    DeviceLogin {
        /// User ID
        user: String,
        /// Device ID
        device: String,
    },

    /// Raise a manual abuse flag on a user
    Flag {
        /// User ID
        user: String,
        /// Reason for the flag
        reason: String,
    },

    /// Show a user's transaction history
    History {
        /// User ID
        user: String,
    },

    /// Audit the journal (verify hash chain)
    Audit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli.data)?;

    match cli.command {
        Commands::Register { user } => {
            commands::register(&ctx, &user).await?;
        }

        Commands::VerifyPhone { user, phone } => {
            commands::verify_phone(&ctx, &user, &phone).await?;
        }

        Commands::GrantTrial { user, device, ip } => {
            commands::grant_trial(&ctx, &user, &device, ip).await?;
        }

        Commands::GrantSecond { user } => {
            commands::grant_second(&ctx, &user).await?;
        }

        Commands::AdBonus { user, videos } => {
            commands::ad_bonus(&ctx, &user, videos).await?;
        }

        Commands::Subscribe { user, tier } => {
            commands::subscribe(&ctx, &user, &tier).await?;
        }

        Commands::Purchase { user, amount } => {
            commands::purchase(&ctx, &user, amount).await?;
        }

        Commands::Deduct {
            user,
            amount,
            feature,
        } => {
            commands::deduct(&ctx, &user, amount, feature.as_deref()).await?;
        }

        Commands::Balance { user } => {
            commands::balance(&ctx, &user).await?;
        }

        Commands::DeviceLogin { user, device } => {
            commands::device_login(&ctx, &user, &device).await?;
        }

        Commands::Flag { user, reason } => {
            commands::flag(&ctx, &user, &reason).await?;
        }

        Commands::History { user } => {
            commands::history(&ctx, &user).await?;
        }

        Commands::Audit => {
            commands::audit(&ctx).await?;
        }
    }

    Ok(())
}
