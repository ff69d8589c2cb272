//! # Development Token Issuer
//!
//! Prints a bearer token for an existing user, signed with `JWT_SECRET`.
//!
//! ## Usage
//! ```bash
//! # Token for the seeded shopper
//! cargo run -p gebeya-api --bin issue-token -- --user shopper@gebeya.dev
//!
//! # Use it
//! curl -H "Authorization: Bearer $(cargo run -q -p gebeya-api --bin issue-token -- -u shopper@gebeya.dev)" \
//!      http://localhost:8080/cart
//! ```
//!
//! Admin rights come from the user row, so `--user admin@gebeya.dev`
//! yields an admin token.

use std::env;

use gebeya_api::auth::JwtManager;
use gebeya_api::config::ApiConfig;
use gebeya_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut email: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    email = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let Some(email) = email else {
        print_help();
        return Err("missing --user".into());
    };

    let config = ApiConfig::load()?;
    let db = Database::new(DbConfig::new(&config.database_path).max_connections(1)).await?;

    let user = db
        .users()
        .get_by_email(&email)
        .await?
        .ok_or_else(|| format!("no user with email {} (run the seed binary first)", email))?;

    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);
    let token = jwt.generate_access_token(user.id, user.is_admin)?;

    eprintln!(
        "Token for {} (id {}, admin: {}), valid {}s",
        user.email, user.id, user.is_admin, config.jwt_access_lifetime_secs
    );
    println!("{}", token);

    db.close().await;
    Ok(())
}

fn print_help() {
    println!("Gebeya Token Issuer");
    println!();
    println!("Usage: issue-token --user <EMAIL>");
    println!();
    println!("Options:");
    println!("  -u, --user <EMAIL>  Email of an existing user");
    println!("  -h, --help          Show this help message");
}
