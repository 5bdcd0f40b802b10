//! # Promote Admin Utility
//!
//! Grants the `admin` role to an existing account. Admins are the only users
//! allowed to change the persisted app settings (`PUT /api/settings`).
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package promote-admin --bin promote_admin -- alice@example.com
//! ```
//!
//! The program will:
//! 1. Connect to the database named by `DATABASE_URL`
//! 2. Look up the account by email
//! 3. Ask for confirmation
//! 4. Set its role to `admin`

use lib_core::config::DEFAULT_DATABASE_URL;
use lib_core::model::store::models::UserRole;
use lib_core::model::store::UserRepository;
use lib_core::{create_pool, run_migrations};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let Some(email) = std::env::args().nth(1) else {
        anyhow::bail!("usage: promote_admin <email>");
    };

    println!("============================================");
    println!("  Promote Admin Utility");
    println!("============================================");
    println!();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    println!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    println!("Connected successfully.");
    println!();

    let Some(user) = UserRepository::find_by_email(&pool, &email).await? else {
        println!("No user with email {} was found.", email);
        return Ok(());
    };

    if user.is_admin() {
        println!("{} is already an admin.", user.username);
        return Ok(());
    }

    print!("Grant admin to {} ({})? (yes/no): ", user.username, user.email);
    io::stdout().flush()?;

    let mut confirmation = String::new();
    io::stdin().read_line(&mut confirmation)?;
    let confirmation = confirmation.trim().to_lowercase();

    if confirmation != "yes" && confirmation != "y" {
        println!("Operation cancelled.");
        return Ok(());
    }

    UserRepository::set_role_by_email(&pool, &email, UserRole::Admin).await?;

    println!("{} is now an admin.", user.username);
    Ok(())
}
