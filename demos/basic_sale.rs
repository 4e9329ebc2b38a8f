//! Basic token and sale walkthrough

use std::sync::Arc;

use token_sale_core::utils::{MemoryEventSink, MemoryStorage};
use token_sale_core::{DeploymentConfig, Identity, Market, TokenSaleService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🪙 Token Sale Core - Basic Sale Example\n");

    // 1. Deploy the token and its sale
    let config = DeploymentConfig::from_env()?;
    let admin = Identity::generate();
    let market = Market::deploy(&config, admin, MemoryStorage::new())?;
    let token_address = market.token().address();
    println!(
        "📜 Deployed {} ({}) at {}",
        market.token().name(),
        market.token().symbol(),
        token_address
    );
    println!("  ✓ Sale at {}", market.sale().address());
    println!("  ✓ Admin {} holds {}\n", admin, market.balance_of(&admin)?);

    let sink = Arc::new(MemoryEventSink::new());
    let service = TokenSaleService::new(market, sink.clone());

    // 2. Transfers and allowances
    println!("💸 Transfers and allowances...");
    let alice = Identity::generate();
    let bob = Identity::generate();
    service.transfer(admin, alice, 1_000).await?;
    service.approve(alice, bob, 300).await?;
    service.transfer_from(bob, alice, bob, 200).await?;
    println!(
        "  ✓ Alice: {}, Bob: {}, Bob may still move {}\n",
        service.balance_of(alice).await?,
        service.balance_of(bob).await?,
        service.allowance(alice, bob).await?
    );

    // 3. Buy from the sale
    println!("🛒 Buying tokens...");
    let price = service.token_price().await;
    let buyer = Identity::generate();
    service.deposit(buyer, 25 * price).await?;
    service.buy_tokens(buyer, 10, 10 * price).await?;
    if let Err(e) = service.buy_tokens(buyer, 10, 1).await {
        println!("  ✗ Rejected: {}", e);
    }
    let report = service.sale_report().await?;
    println!(
        "  ✓ Sold {} at {} each, {} left, proceeds {}\n",
        report.tokens_sold, report.token_price_major, report.tokens_available, report.proceeds_major
    );

    // 4. Close the sale
    println!("🔒 Ending the sale...");
    if let Err(e) = service.end_sale(buyer).await {
        println!("  ✗ Rejected: {}", e);
    }
    service.end_sale(admin).await?;
    println!("  ✓ Admin now holds {}", service.balance_of(admin).await?);
    println!(
        "  ✓ Admin received {} in currency",
        service.currency_balance(admin).await
    );

    let supply = service.verify_supply().await?;
    println!(
        "\n📊 Supply check: total={}, sum={}, valid={}",
        supply.total_supply, supply.sum_of_balances, supply.is_valid
    );

    println!("\n🧾 Event log:");
    for record in sink.records()? {
        println!("  #{} {} {:?}", record.sequence, record.emitter, record.event);
    }

    Ok(())
}
