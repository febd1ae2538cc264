use carshop_api::{config::AppConfig, db::create_pool, slug::slugify};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "Admin", "User", "admin").await?;
    let user_id = ensure_user(&pool, "user@example.com", "Jan", "Kowalski", "user").await?;

    seed_cars(&pool).await?;
    seed_categories(&pool).await?;
    seed_products(&pool).await?;
    seed_car_services(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_cars(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let cars = vec![("Skoda", "Octavia"), ("Fiat", "Punto"), ("Opel", "Astra")];

    for (brand, model) in cars {
        let slug = slugify(&format!("{brand} {model}"));
        sqlx::query(
            r#"
            INSERT INTO cars (id, brand, model, slug)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (model) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(brand)
        .bind(model)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    println!("Seeded cars");
    Ok(())
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec!["Brakes", "Filters", "Suspension", "Engine"];

    for name in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        ("Front brake pads", "BP-1001", "Front axle brake pad set", "149.99", 40),
        ("Oil filter", "OF-2002", "Spin-on oil filter", "24.50", 120),
        ("Shock absorber", "SA-3003", "Gas-filled front shock absorber", "219.00", 18),
        ("Timing belt kit", "TB-4004", "Belt, tensioner and idler pulley", "389.90", 9),
    ];

    for (name, code, description, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, code, stock, description, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .bind(code)
        .bind(stock)
        .bind(description)
        .bind(price.parse::<Decimal>()?)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_car_services(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let services = vec![
        ("Oil change", "120.00", 45),
        ("Brake inspection", "80.00", 30),
        ("Timing belt replacement", "650.00", 240),
    ];

    for (name, price, duration_minutes) in services {
        sqlx::query(
            r#"
            INSERT INTO car_services (id, name, price, duration_minutes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price.parse::<Decimal>()?)
        .bind(duration_minutes)
        .execute(pool)
        .await?;
    }

    println!("Seeded car services");
    Ok(())
}
