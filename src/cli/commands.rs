//! CLI command implementations

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, MultiSelect};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::table::{format_usd, picker_label, render_portfolio};
use crate::config::Config;
use crate::error::Error;
use crate::indexer::AlchemyClient;
use crate::portfolio::{scale_raw_amount, PortfolioLoader, TokenKey};
use crate::price::{CoinGeckoClient, PriceLookup, PriceSource};
use crate::session::{LoadState, Session, TxStatus};
use crate::transfer::{TransactionAssembler, TransferRequest};
use crate::wallet::{AuthorizationRequest, Capability, Executor, LocalWallet, Wallet};

/// Show the balances held by an account
pub async fn portfolio(config: &Config, address: Option<String>) -> Result<()> {
    let account = match address {
        Some(address) => parse_account(&address)?,
        None => {
            let wallet = LocalWallet::connect(&config.chain, &config.wallet)?;
            first_account(&wallet).await?
        }
    };

    let loader = build_loader(config)?;
    let mut session = Session::new();

    session.load(&loader, account).await;
    ensure_loaded(&session)?;

    println!("\n=== PORTFOLIO {} ({}) ===\n", account, config.chain.name);
    if session.tokens().is_empty() {
        println!("No balances found.");
        return Ok(());
    }
    session.select_all();
    println!("{}", render_portfolio(session.tokens(), session.selection()));

    Ok(())
}

/// Select balances and move them to a recipient in one contract call
pub async fn transfer(
    config: &Config,
    recipient: Option<String>,
    all: bool,
    tokens: Vec<String>,
    force: bool,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        warn!("Running in DRY-RUN mode - nothing will be submitted");
    }

    let wallet = Arc::new(LocalWallet::connect(&config.chain, &config.wallet)?);
    wallet.chain_id().await?;
    let account = first_account(wallet.as_ref()).await?;

    let loader = build_loader(config)?;
    let mut session = Session::new();

    session.load(&loader, account).await;
    ensure_loaded(&session)?;

    if session.tokens().is_empty() {
        println!("No balances to transfer.");
        return Ok(());
    }

    if all {
        session.select_all();
    } else if !tokens.is_empty() {
        for token in &tokens {
            let key = parse_token_key(token, &config.chain.native.symbol)?;
            if session.selection().is_selected(&key) {
                continue;
            }
            if !session.toggle(key) {
                anyhow::bail!("{} is not held by {}", token, account);
            }
        }
    } else {
        let labels: Vec<String> = session.tokens().iter().map(picker_label).collect();
        let picks = MultiSelect::new()
            .with_prompt("Select assets to transfer (space to toggle, enter to confirm)")
            .items(&labels)
            .interact()?;
        let keys: Vec<TokenKey> = picks
            .into_iter()
            .filter_map(|index| session.tokens().get(index).map(|token| token.key()))
            .collect();
        for key in keys {
            session.toggle(key);
        }
    }

    println!("\n=== SELECTED ASSETS ===\n");
    println!("{}", render_portfolio(session.tokens(), session.selection()));

    if session.selection().is_empty() {
        anyhow::bail!("Nothing selected to transfer");
    }

    let recipient = match recipient {
        Some(recipient) => recipient,
        None => Input::<String>::new()
            .with_prompt("Recipient address")
            .interact_text()?,
    };

    let assembler = TransactionAssembler::new(
        wallet.clone(),
        config.bulk_transfer.contract,
        config.bulk_transfer.delegation,
    );

    // Reject a bad recipient or an empty transfer before anything is confirmed
    let request = plan_transfer(&session, &recipient)?;

    if dry_run {
        let call = assembler.build_call(&request);

        println!("\n=== DRY RUN ===");
        println!("From: {}", account);
        println!("Recipient: {}", request.recipient);
        println!("Contract: {}", call.to);
        println!("Value: {} wei", call.value);
        println!(
            "Tokens: {}{}",
            request.tokens.len(),
            if request.is_native_only() { " (native only)" } else { "" }
        );
        println!("Delegation: {}", config.bulk_transfer.delegation);
        println!("Calldata: {}", call.data);
        return Ok(());
    }

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(confirmation_prompt(&session, &request))
            .default(false)
            .interact()?;

        if !confirmed {
            info!("Transfer cancelled by user");
            return Ok(());
        }
    }

    let status = session.submit(&assembler, Some(&recipient)).await.clone();
    match status {
        TxStatus::Success(hash) => {
            let hash = hash.to_string();
            info!("Transfer submitted: {}", hash);
            println!("\n=== TRANSFER SUBMITTED ===");
            println!("Transaction: {}", hash);
            println!("View on explorer: {}", config.explorer_tx_url(&hash));
        }
        TxStatus::Error(message) => {
            error!("Transfer failed: {}", message);
            anyhow::bail!("Transfer failed: {}", message);
        }
        other => anyhow::bail!("Unexpected transaction status: {}", other),
    }

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Check the RPC node, indexer, price API and wallet
pub async fn health(config: &Config) -> Result<()> {
    println!("\n=== SYSTEM HEALTH CHECK ===\n");

    let mut all_healthy = true;

    print!("RPC Endpoint... ");
    match check_rpc(config).await {
        Ok((chain_id, latency)) => println!("OK (chain {}, {}ms)", chain_id, latency),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    print!("Indexer API... ");
    match check_indexer(config).await {
        Ok((block, latency)) => println!("OK (block {}, {}ms)", block, latency),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    // Prices are optional, so a missing quote is not a failure
    print!("Price API... ");
    match check_price(config).await {
        Ok(Some(price)) => println!("OK ({} = ${:.2})", config.chain.native.symbol, price),
        Ok(None) => println!("DEGRADED (no quote for {})", config.price.native_id),
        Err(e) => println!("DEGRADED: {}", e),
    }

    print!("Wallet... ");
    match LocalWallet::connect(&config.chain, &config.wallet) {
        Ok(wallet) => {
            match wallet.balance().await {
                Ok(balance) => println!(
                    "OK ({}, {} {})",
                    wallet.address(),
                    scale_raw_amount(balance, config.chain.native.decimals).normalize(),
                    config.chain.native.symbol
                ),
                Err(e) => {
                    println!("FAILED: {}", e);
                    all_healthy = false;
                }
            }

            print!("EIP-7702 delegation... ");
            let request = AuthorizationRequest {
                contract_address: config.bulk_transfer.contract,
                executor: Executor::SelfAccount,
            };
            match wallet.sign_authorization(request).await {
                Ok(Capability::Supported(_)) => {
                    println!("SUPPORTED (policy: {})", config.bulk_transfer.delegation)
                }
                Ok(Capability::Unsupported(reason)) => println!(
                    "UNSUPPORTED: {} (policy: {})",
                    reason, config.bulk_transfer.delegation
                ),
                Err(e) => println!("FAILED: {}", e),
            }
        }
        Err(e) => {
            println!("NOT CONFIGURED: {}", e);
        }
    }

    println!();
    if all_healthy {
        println!("All systems healthy!");
    } else {
        println!("Some systems are unhealthy. Check the errors above.");
    }

    Ok(())
}

async fn check_rpc(config: &Config) -> Result<(u64, u64)> {
    let url: url::Url = config
        .chain
        .rpc_url
        .parse()
        .with_context(|| format!("Invalid rpc_url: {}", config.chain.rpc_url))?;
    let provider = ProviderBuilder::new().connect_http(url);

    let start = Instant::now();
    let chain_id = provider.get_chain_id().await?;
    let latency = start.elapsed().as_millis() as u64;

    if chain_id != config.chain.chain_id {
        anyhow::bail!(
            "node reports chain {} but configuration expects {}",
            chain_id,
            config.chain.chain_id
        );
    }
    Ok((chain_id, latency))
}

async fn check_indexer(config: &Config) -> Result<(u64, u64)> {
    let client = AlchemyClient::new(&config.indexer)?;

    let start = Instant::now();
    let block = client.block_number().await?;
    let latency = start.elapsed().as_millis() as u64;

    Ok((block, latency))
}

async fn check_price(config: &Config) -> Result<Option<f64>> {
    let client = CoinGeckoClient::new(&config.price)?;
    Ok(client.native_price().await?)
}

fn build_loader(config: &Config) -> Result<PortfolioLoader> {
    let indexer = AlchemyClient::new(&config.indexer)?;
    let prices = CoinGeckoClient::new(&config.price)?;

    Ok(PortfolioLoader::new(
        Arc::new(indexer),
        PriceLookup::new(Arc::new(prices)),
        config.chain.native.clone(),
    ))
}

async fn first_account(wallet: &dyn Wallet) -> Result<Address> {
    let accounts = wallet.request_accounts().await?;
    accounts
        .into_iter()
        .next()
        .ok_or_else(|| Error::WalletUnavailable("wallet exposed no accounts".to_string()).into())
}

fn plan_transfer(session: &Session, recipient: &str) -> Result<TransferRequest> {
    Ok(TransferRequest::from_selection(
        session.tokens(),
        session.selection(),
        Some(recipient),
    )?)
}

fn confirmation_prompt(session: &Session, request: &TransferRequest) -> String {
    format!(
        "Transfer {} asset(s) worth {} to {}? This cannot be undone.",
        session.selection().len(),
        format_usd(session.totals().usd_value),
        request.recipient
    )
}

fn ensure_loaded(session: &Session) -> Result<()> {
    match session.load_state() {
        LoadState::Failed(message) => anyhow::bail!("{}", message),
        _ => Ok(()),
    }
}

fn parse_account(address: &str) -> Result<Address> {
    address
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", address, e))
}

/// `native`, the native symbol, or a token contract address
fn parse_token_key(value: &str, native_symbol: &str) -> Result<TokenKey> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("native") || value.eq_ignore_ascii_case(native_symbol) {
        return Ok(TokenKey::Native);
    }

    value
        .parse::<Address>()
        .map(TokenKey::Contract)
        .map_err(|e| anyhow::anyhow!("Invalid token {}: {}", value, e))
}
