//! Subaccount listing command

use anyhow::Result;
use recon_lib::search::InventorySource;

use crate::output::{print_warning, OutputFormat};

/// List the subaccounts visible to the API credentials.
pub async fn subaccounts(source: &dyn InventorySource, format: OutputFormat) -> Result<()> {
    let accounts = source.subaccounts().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
        _ => {
            if accounts.is_empty() {
                print_warning("No subaccounts visible to this token");
                return Ok(());
            }
            for account in &accounts {
                println!("{}", account);
            }
        }
    }

    Ok(())
}
