//! CLI commands

use crate::context::AppContext;
use anyhow::Context;
use ecosort_core::{Credits, SubscriptionTier};
use ecosort_journal::EntryKind;
use std::net::IpAddr;

/// Create the balance and antifraud records for a new user
pub async fn register(ctx: &AppContext, user: &str) -> Result<(), anyhow::Error> {
    ctx.service.register_user(user).await?;
    println!("✅ Registered {user}");
    Ok(())
}

/// Mark the user's phone as verified
pub async fn verify_phone(ctx: &AppContext, user: &str, phone: &str) -> Result<(), anyhow::Error> {
    ctx.service.verify_phone(user, phone).await?;
    println!("✅ Phone verified for {user}");
    Ok(())
}

/// Raise a manual abuse flag on the account
pub async fn flag(ctx: &AppContext, user: &str, reason: &str) -> Result<(), anyhow::Error> {
    ctx.service.flag_user(user, reason).await?;
    println!("✅ Flagged {user}: {reason}");
    Ok(())
}

/// First trial grant, behind the eligibility gate
pub async fn grant_trial(
    ctx: &AppContext,
    user: &str,
    device: &str,
    ip: IpAddr,
) -> Result<(), anyhow::Error> {
    let outcome = ctx.service.grant_first_trial(user, device, ip).await?;
    println!(
        "✅ Granted {} trial credits to {user} (total: {})",
        outcome.granted, outcome.new_total
    );
    Ok(())
}

/// Second trial grant after the first has expired
pub async fn grant_second(ctx: &AppContext, user: &str) -> Result<(), anyhow::Error> {
    let outcome = ctx.service.grant_second_trial(user).await?;
    println!(
        "✅ Granted {} second-trial credits to {user} (total: {})",
        outcome.granted, outcome.new_total
    );
    Ok(())
}

/// One-shot ad-watch bonus
pub async fn ad_bonus(ctx: &AppContext, user: &str, videos: u32) -> Result<(), anyhow::Error> {
    let outcome = ctx.service.grant_ad_watch_bonus(user, videos).await?;
    println!(
        "✅ Granted {} bonus credits to {user} (total: {})",
        outcome.granted, outcome.new_total
    );
    Ok(())
}

/// Subscription purchase/renewal
pub async fn subscribe(ctx: &AppContext, user: &str, tier: &str) -> Result<(), anyhow::Error> {
    let tier: SubscriptionTier = tier
        .to_uppercase()
        .parse()
        .with_context(|| format!("unknown tier: {tier} (expected PRO or ULTRA)"))?;

    let outcome = ctx.service.grant_monthly_credits(user, tier).await?;
    println!(
        "✅ {user} subscribed to {tier}: {} monthly credits (total: {})",
        outcome.granted, outcome.new_total
    );
    Ok(())
}

/// Outright credit purchase
pub async fn purchase(ctx: &AppContext, user: &str, amount: i64) -> Result<(), anyhow::Error> {
    let amount = Credits::new(amount)?;
    let outcome = ctx.service.grant_purchase_credits(user, amount).await?;
    println!(
        "✅ {user} purchased {amount} credits (total: {})",
        outcome.new_total
    );
    Ok(())
}

/// Pay for a metered AI operation
pub async fn deduct(
    ctx: &AppContext,
    user: &str,
    amount: i64,
    feature: Option<&str>,
) -> Result<(), anyhow::Error> {
    let amount = Credits::new(amount)?;
    let outcome = ctx
        .service
        .deduct(user, amount, "ai_usage", feature)
        .await?;

    println!(
        "✅ Deducted {amount} from {user} (trial: {}, monthly: {}, purchase: {}; remaining: {})",
        outcome.breakdown.trial_used,
        outcome.breakdown.monthly_used,
        outcome.breakdown.purchase_used,
        outcome.new_total
    );
    Ok(())
}

/// Show a user's balance with lazy expiry applied
pub async fn balance(ctx: &AppContext, user: &str) -> Result<(), anyhow::Error> {
    let balance = ctx.service.balance(user).await?;

    println!("Balance for {user}: {} credits", balance.total());
    println!("  trial:    {}", balance.trial.amount);
    if let Some(expires_at) = balance.trial.expires_at {
        println!("            expires {expires_at}");
    }
    println!(
        "  monthly:  {} ({})",
        balance.monthly.amount, balance.monthly.tier
    );
    println!("  purchase: {}", balance.purchase.amount);
    Ok(())
}

/// Record a login on a device
pub async fn device_login(ctx: &AppContext, user: &str, device: &str) -> Result<(), anyhow::Error> {
    ctx.service.track_device_login(user, device).await?;
    println!("✅ Recorded login of {user} on {device}");
    Ok(())
}

/// Print a user's transaction history
pub async fn history(ctx: &AppContext, user: &str) -> Result<(), anyhow::Error> {
    let entries = ctx.service.history(user)?;
    if entries.is_empty() {
        println!("No transactions for {user}");
        return Ok(());
    }

    println!("History for {user} ({} entries):", entries.len());
    println!("{:-<78}", "");
    for entry in &entries {
        let detail = match &entry.kind {
            EntryKind::Grant { pool } => format!("grant +{} into {pool}", entry.amount),
            EntryKind::Deduction {
                trial_used,
                monthly_used,
                purchase_used,
            } => format!(
                "deduct -{} (t:{trial_used} m:{monthly_used} p:{purchase_used})",
                entry.amount
            ),
        };
        println!(
            "{:>6} | {} | {:<40} | total {}",
            entry.sequence,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            format!("{detail} [{}]", entry.reason),
            entry.balance_after.total
        );
    }
    Ok(())
}

/// Verify the journal hash chain
pub async fn audit(ctx: &AppContext) -> Result<(), anyhow::Error> {
    match ctx.service.audit() {
        Ok(count) => {
            println!("✅ Hash chain verified ({count} entries)");
            Ok(())
        }
        Err(e) => {
            println!("❌ Hash chain broken: {e}");
            Ok(())
        }
    }
}
