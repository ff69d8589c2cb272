//! # Seed Data Generator
//!
//! Populates the database with a beauty catalog and demo accounts for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p gebeya-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p gebeya-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p gebeya-db --bin seed -- --db ./data/gebeya.db
//! ```
//!
//! ## Generated Data
//! - Products across makeup, skincare, hair, fragrance, tools and bath
//! - Prices $4.99 - $89.99; roughly 3 in 10 products are deals at 10-40% off
//! - Ratings 3.0 - 5.0 with 0 - 2,000 reviews
//! - `admin@gebeya.dev` (admin) and `shopper@gebeya.dev` (shopper)
//!
//! Output is deterministic for a given `--count`.

use gebeya_core::{ProductInput, STORE_NAME};
use gebeya_db::{Database, DbConfig, DbError};
use std::env;

/// Categories with their product types and name stems.
const CATEGORIES: &[(&str, &[(&str, &[&str])])] = &[
    (
        "makeup",
        &[
            ("lipstick", &["Matte Lipstick", "Satin Lipstick", "Lip Lacquer", "Liquid Lip"]),
            ("foundation", &["Longwear Foundation", "Skin Tint", "Cushion Foundation"]),
            ("mascara", &["Volume Mascara", "Lengthening Mascara", "Waterproof Mascara"]),
            ("eyeshadow", &["Nude Palette", "Smoky Palette", "Shimmer Quad"]),
            ("blush", &["Powder Blush", "Cream Blush", "Glow Highlighter"]),
        ],
    ),
    (
        "skincare",
        &[
            ("serum", &["Vitamin C Serum", "Hyaluronic Serum", "Retinol Serum", "Niacinamide Serum"]),
            ("moisturizer", &["Daily Moisturizer", "Night Cream", "Gel Cream", "Eye Cream"]),
            ("cleanser", &["Foaming Cleanser", "Cleansing Balm", "Micellar Water"]),
            ("sunscreen", &["SPF 50 Sunscreen", "Tinted SPF 30", "Mineral Sunscreen"]),
            ("mask", &["Clay Mask", "Sheet Mask", "Overnight Mask"]),
        ],
    ),
    (
        "hair",
        &[
            ("shampoo", &["Repair Shampoo", "Volume Shampoo", "Clarifying Shampoo"]),
            ("conditioner", &["Deep Conditioner", "Leave-In Conditioner"]),
            ("styling", &["Curl Cream", "Hair Oil", "Heat Protectant", "Texture Spray"]),
        ],
    ),
    (
        "fragrance",
        &[
            ("perfume", &["Eau de Parfum", "Floral Parfum", "Amber Parfum"]),
            ("body mist", &["Vanilla Body Mist", "Citrus Body Mist"]),
        ],
    ),
    (
        "tools",
        &[
            ("brush", &["Foundation Brush", "Blending Brush", "Brush Set"]),
            ("sponge", &["Makeup Sponge", "Silicone Sponge"]),
            ("accessory", &["Eyelash Curler", "Tweezers", "Vanity Mirror"]),
        ],
    ),
    (
        "bath",
        &[
            ("body wash", &["Shea Body Wash", "Exfoliating Body Wash"]),
            ("lotion", &["Body Lotion", "Hand Cream", "Body Butter"]),
            ("soap", &["Oatmeal Soap", "Charcoal Soap"]),
        ],
    ),
];

const BRANDS: &[&str] = &[
    "Sephora",
    "MAC",
    "Dior",
    "Fenty Beauty",
    "Olay",
    "L'Oreal",
    "Maybelline",
    "Nivea",
];

/// Demo accounts: (name, email, is_admin).
const USERS: &[(&str, &str, bool)] = &[
    ("Gebeya Admin", "admin@gebeya.dev", true),
    ("Demo Shopper", "shopper@gebeya.dev", false),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./gebeya.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("{} Seed Data Generator", STORE_NAME);
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./gebeya.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 {} Seed Data Generator", STORE_NAME);
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    for (name, email, is_admin) in USERS {
        match db.users().create(name, email, *is_admin).await {
            Ok(user) => println!("✓ Created user {} (id {})", user.email, user.id),
            Err(DbError::UniqueViolation { .. }) => println!("  User {} already exists", email),
            Err(e) => return Err(e.into()),
        }
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping product seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let stems: Vec<(&str, &str, &str)> = CATEGORIES
        .iter()
        .flat_map(|(category, types)| {
            types.iter().flat_map(move |(product_type, names)| {
                names.iter().map(move |name| (*category, *product_type, *name))
            })
        })
        .collect();

    let mut generated = 0;
    let mut deals = 0;
    let start = std::time::Instant::now();

    for seed in 0..count {
        let (category, product_type, stem) = stems[seed % stems.len()];
        let brand = BRANDS[(seed / stems.len() + seed) % BRANDS.len()];
        let input = generate_product(category, product_type, stem, brand, seed);

        match db.products().insert(&input).await {
            Ok(product) => {
                generated += 1;
                if product.is_deal {
                    deals += 1;
                }
            }
            Err(e) => {
                eprintln!("Failed to insert {}: {}", input.name, e);
                continue;
            }
        }

        if generated % 100 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products ({} deals) in {:?}", generated, deals, elapsed);

    println!();
    println!("Verifying catalog search...");
    let suggestions = db.products().suggestions("serum").await?;
    println!("  Suggestions for 'serum': {}", suggestions.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one product input with plausible, deterministic data.
fn generate_product(
    category: &str,
    product_type: &str,
    stem: &str,
    brand: &str,
    seed: usize,
) -> ProductInput {
    // $4.99 - $89.99
    let base_price = 499 + ((seed * 37) % 86) as i64 * 100;

    let is_deal = seed % 10 < 3;
    let discount = 10 + ((seed * 7) % 31) as i64;

    let stars = 3.0 + ((seed * 13) % 21) as f64 / 10.0;
    let num_reviews = ((seed * 97) % 2001) as i64;

    ProductInput {
        name: format!("{} {} No. {}", brand, stem, seed + 1),
        brand: brand.to_string(),
        category: category.to_string(),
        product_type: product_type.to_string(),
        image_url: format!(
            "https://img.gebeya.dev/products/{}/{}.jpg",
            category,
            seed + 1
        ),
        price_cents: base_price,
        original_price_cents: is_deal.then_some(base_price),
        discount_percentage: is_deal.then_some(discount),
        is_deal,
        stars,
        num_reviews,
    }
}
