//! API key management commands: set, show, forget.

use anyhow::Result;
use console::style;
use dialoguer::Password;

use parley_core::credential::store::CredentialStore;
use parley_core::credential::{CREDENTIAL_KEY, mask_credential};
use parley_types::error::CredentialError;

use crate::state::AppState;

/// Store the API key, prompting with hidden input when no value is given.
///
/// ```bash
/// # Secure prompt (recommended)
/// parley key set
///
/// # Script/automation mode
/// parley key set --value AIza...
/// ```
pub async fn set_key(state: &AppState, value: Option<&str>, json: bool) -> Result<()> {
    let entered = match value {
        Some(v) => v.to_string(),
        None => Password::new()
            .with_prompt(format!("Enter your {}", style("Gemini API key").bold()))
            .interact()?,
    };
    let key = entered.trim();
    if key.is_empty() {
        anyhow::bail!("API key is empty");
    }

    state.credentials.set(CREDENTIAL_KEY, key).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"set": true, "key": CREDENTIAL_KEY, "masked": mask_credential(key)})
        );
    } else {
        println!(
            "  {} API key stored ({})",
            style("✓").green().bold(),
            mask_credential(key)
        );
    }

    Ok(())
}

/// Show the API key the chat would use, masked.
pub async fn show_key(state: &AppState, json: bool) -> Result<()> {
    let value = state.credentials.get(CREDENTIAL_KEY).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "key": CREDENTIAL_KEY,
                "present": value.is_some(),
                "masked": value.as_deref().map(mask_credential),
                "stores": state.credentials.store_names(),
            })
        );
        return Ok(());
    }

    match value {
        Some(v) => println!(
            "  {}: {}",
            style(CREDENTIAL_KEY).bold(),
            style(mask_credential(&v)).cyan()
        ),
        None => println!(
            "  {} No API key stored. Add one with: {}",
            style("i").blue().bold(),
            style("parley key set").yellow()
        ),
    }

    Ok(())
}

/// Remove the stored API key from every writable store.
pub async fn forget_key(state: &AppState, json: bool) -> Result<()> {
    let removed = match state.credentials.remove(CREDENTIAL_KEY).await {
        Ok(()) => true,
        Err(CredentialError::NotFound) => false,
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::json!({"removed": removed, "key": CREDENTIAL_KEY}));
    } else if removed {
        println!("  {} Stored API key removed", style("✓").green().bold());
    } else {
        println!("  {} No stored API key to remove", style("i").blue().bold());
    }

    Ok(())
}
