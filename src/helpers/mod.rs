pub mod fzf_invoker;
pub mod logging;
pub mod progress;

use self::fzf_invoker::FzfInvoker;
use anyhow::{Context, Result, bail};

/// Wrapper around the `termenu` picker that keeps the UX consistent across the
/// CLI. The helper converts the supplied items into `String`s so callers do
/// not have to worry about ownership.
pub fn choose_one<S: ToString>(title: &str, items: Vec<S>) -> Result<String> {
    let display_items: Vec<String> = items.into_iter().map(|s| s.to_string()).collect();
    let picker = FzfInvoker::new(title.to_string(), display_items);
    match picker.invoke().context("menu failed")? {
        Some(choice) => Ok(choice),
        None => bail!("No selection made"),
    }
}
