//! Admin cafe-account management commands.
//!
//! There is no public registration endpoint; accounts are provisioned by
//! an operator against the local store.

use std::path::PathBuf;

use menucard_core::store::{CafeDraft, CafeStore, Store};
use menucard_gateway::auth::{generate_password, hash_password};

use crate::ui;

/// Arguments for admin commands.
pub struct AdminArgs {
    /// The admin action to perform.
    pub action: AdminAction,
    /// Data directory override.
    pub data_dir: Option<PathBuf>,
}

/// Admin actions.
pub enum AdminAction {
    /// Create a new cafe account.
    Create {
        /// Login name.
        login: String,
        /// Password, if given explicitly.
        password: Option<String>,
        /// Display name.
        name: Option<String>,
        /// Short public code.
        code: Option<String>,
        /// Generate a random password instead.
        generate_password: bool,
    },
    /// List all accounts.
    List,
    /// Reset an account's password.
    ResetPassword {
        /// Login name.
        login: String,
        /// Password, if given explicitly.
        password: Option<String>,
        /// Generate a random password instead.
        generate_password: bool,
    },
    /// Delete an account.
    Delete {
        /// Login name.
        login: String,
    },
}

/// Run the admin command.
///
/// # Errors
///
/// Returns error if the operation fails.
pub fn run_admin(args: AdminArgs) -> anyhow::Result<()> {
    let data_dir = args
        .data_dir
        .unwrap_or_else(|| menucard_core::Config::load_default().map_or_else(
            |_| menucard_core::Config::state_dir().join("data"),
            |c| c.data_dir(),
        ));

    std::fs::create_dir_all(&data_dir)?;

    let store = Store::open(&data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {e}"))?;
    let cafes = store.cafes();

    match args.action {
        AdminAction::Create {
            login,
            password,
            name,
            code,
            generate_password: gen_pwd,
        } => create_cafe(cafes, &login, password, name, code, gen_pwd)?,
        AdminAction::List => list_cafes(cafes)?,
        AdminAction::ResetPassword {
            login,
            password,
            generate_password: gen_pwd,
        } => reset_password(cafes, &login, password, gen_pwd)?,
        AdminAction::Delete { login } => delete_cafe(cafes, &login)?,
    }

    Ok(())
}

fn resolve_password(
    password: Option<String>,
    generate: bool,
) -> anyhow::Result<(String, bool)> {
    match password {
        Some(p) if !p.is_empty() => Ok((p, false)),
        _ if generate => Ok((generate_password(), true)),
        _ => anyhow::bail!("Provide --password or --generate-password"),
    }
}

fn create_cafe(
    cafes: &CafeStore,
    login: &str,
    password: Option<String>,
    name: Option<String>,
    code: Option<String>,
    generate: bool,
) -> anyhow::Result<()> {
    let (password, generated) = resolve_password(password, generate)?;
    let password_hash = hash_password(&password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    let cafe = cafes.create(CafeDraft {
        login: login.to_string(),
        password_hash,
        name: name.unwrap_or_else(|| login.to_string()),
        code: code.unwrap_or_default(),
        phone_numbers: Vec::new(),
        expiry_date: None,
    })?;

    ui::success(&format!("Created cafe account \"{}\" (id {})", cafe.login, cafe.id));
    if generated {
        ui::kv("Password", &password);
        ui::info("Store this password now; it is not shown again.");
    }

    Ok(())
}

fn list_cafes(cafes: &CafeStore) -> anyhow::Result<()> {
    let all = cafes.list()?;

    if all.is_empty() {
        ui::info("No cafe accounts yet");
        return Ok(());
    }

    ui::header("Cafe accounts");
    for cafe in all {
        ui::kv(
            &cafe.login,
            &format!("id {} \"{}\" code \"{}\"", cafe.id, cafe.name, cafe.code),
        );
    }

    Ok(())
}

fn reset_password(
    cafes: &CafeStore,
    login: &str,
    password: Option<String>,
    generate: bool,
) -> anyhow::Result<()> {
    let Some(mut cafe) = cafes.get_by_login(login)? else {
        anyhow::bail!("No cafe account with login \"{login}\"");
    };

    let (password, generated) = resolve_password(password, generate)?;
    cafe.password_hash = hash_password(&password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    cafes.update(&cafe)?;

    ui::success(&format!("Password reset for \"{login}\""));
    if generated {
        ui::kv("Password", &password);
    }

    Ok(())
}

fn delete_cafe(cafes: &CafeStore, login: &str) -> anyhow::Result<()> {
    let Some(cafe) = cafes.get_by_login(login)? else {
        anyhow::bail!("No cafe account with login \"{login}\"");
    };

    cafes.delete(cafe.id)?;
    ui::success(&format!("Deleted cafe account \"{login}\""));

    Ok(())
}
