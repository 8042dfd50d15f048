//! Out-of-band admin bootstrap
//!
//! The API never creates admins; this binary does, against the same
//! database the server uses. Run it while the server is stopped.
//!
//! ```text
//! crear-admin <username> <email> [password]
//! ```
//!
//! The password falls back to the ADMIN_PASSWORD environment variable.

use anyhow::{Context, bail};

use server::core::Config;
use server::db::DbService;
use server::db::repository::UserRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    server::utils::logger::init_logger();

    let mut args = std::env::args().skip(1);
    let (Some(username), Some(email)) = (args.next(), args.next()) else {
        bail!("Usage: crear-admin <username> <email> [password]");
    };
    let password = match args.next() {
        Some(p) => p,
        None => std::env::var("ADMIN_PASSWORD")
            .context("Password missing: pass it as an argument or set ADMIN_PASSWORD")?,
    };

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let db_path = config.database_dir().join("farmacia.db");
    let db_service = DbService::new(&db_path.to_string_lossy())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {e}"))?;
    let repo = UserRepository::new(db_service.db);

    let admin = repo
        .create_or_update_admin(&username, &email, &password)
        .await
        .context("Failed to create or update admin")?;

    println!("Admin listo: {} <{}>", admin.username, admin.email);
    Ok(())
}
