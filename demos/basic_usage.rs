//! Basic usage examples for the pylib-finder library
//!
//! Run with: `cargo run --example basic_usage`

use pylib_finder::{InstallCommands, PackageDetails, PypiClient, Recommender, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== PyLib Finder Basic Usage Examples ===\n");

    let client = Arc::new(PypiClient::new()?);

    // Example 1: Look up a package
    println!("1. Looking up 'requests':");
    let metadata = client.get_package("requests").await?;
    let details = PackageDetails::from(&metadata);
    println!("   Name: {}", details.name);
    println!("   Version: {}", details.version);
    println!("   License: {}", details.license);
    println!("   Description: {}\n", details.description);

    // Example 2: Install commands
    println!("2. Installing it:");
    let install = InstallCommands::for_package(&details.name);
    println!("   {}", install.windows);
    println!("   {}\n", install.unix);

    // Example 3: Similar packages
    println!("3. Packages similar to 'django':");
    let recommender = Recommender::new(client.clone());
    let similar = recommender.recommend("django").await;
    for (i, name) in similar.iter().enumerate() {
        println!("   {}. {}", i + 1, name);
    }
    println!();

    // Example 4: Missing packages are not errors for recommendations
    println!("4. Packages similar to a package that does not exist:");
    let similar = recommender.recommend("no-such-package-xyz-12345").await;
    println!("   {} recommendations", similar.len());

    println!("\n=== All examples completed! ===");
    Ok(())
}
