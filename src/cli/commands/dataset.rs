//! Dataset inspection commands.

use console::style;

use crate::config::Settings;
use crate::dataset::{id_to_shortcode, media_id_from_filename, Dataset, ACCOUNT_LIST_FILENAME};

/// Write the account list for accounts that have post metadata.
pub async fn cmd_scan(settings: &Settings) -> anyhow::Result<()> {
    let dataset = Dataset::open(&settings.dataset_path)?;
    let names = dataset.scan_accounts_with_info()?;

    println!(
        "{} Listed {} accounts in {}",
        style("✓").green(),
        names.len(),
        dataset.root().join(ACCOUNT_LIST_FILENAME).display()
    );
    Ok(())
}

/// Print shortcodes for the given ids, or for every media file in the dataset.
pub async fn cmd_shortcode(settings: &Settings, ids: &[String]) -> anyhow::Result<()> {
    if ids.is_empty() {
        let dataset = Dataset::open(&settings.dataset_path)?;
        for account in dataset.accounts()? {
            for (file_name, code) in account.media_shortcodes()? {
                println!("{}/{}\t{}", account.name, file_name, code);
            }
        }
        return Ok(());
    }

    for id in ids {
        match media_id_from_filename(id).and_then(id_to_shortcode) {
            Some(code) => println!("{}\t{}", id, code),
            None => println!("{}\t{}", id, style("invalid media id").red()),
        }
    }
    Ok(())
}
