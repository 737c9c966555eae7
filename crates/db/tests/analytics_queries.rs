//! Integration tests for the dashboard aggregation queries.
//!
//! Each test gets a fresh database with the reference schema applied,
//! provisioned by `sqlx::test` from `DATABASE_URL`.

use autodash_core::filter::DateRange;
use autodash_db::repositories::AnalyticsRepo;
use chrono::NaiveDate;
use sqlx::PgPool;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_catalog(pool: &PgPool) {
    sqlx::query(
        "INSERT INTO manufacturer (manufacturer_id, name) VALUES (1, 'Toyota'), (2, 'Ford')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO car_model (model_id, manufacturer_id, model_name, category) VALUES \
         (1, 1, 'Corolla', 'Sedan'), \
         (2, 1, 'RAV4', 'SUV'), \
         (3, 2, 'Mustang', 'Coupe'), \
         (4, 2, 'Prototype', NULL)",
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_dealerships(pool: &PgPool, count: i64) {
    for id in 1..=count {
        sqlx::query("INSERT INTO dealership (dealership_id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(format!("Dealer {id}"))
            .execute(pool)
            .await
            .unwrap();
    }
}

async fn insert_sale(pool: &PgPool, model_id: i64, dealership_id: i64, sale_date: NaiveDate) {
    sqlx::query("INSERT INTO sales (model_id, dealership_id, sale_date) VALUES ($1, $2, $3)")
        .bind(model_id)
        .bind(dealership_id)
        .bind(sale_date)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_review_yields_single_rating(pool: PgPool) {
    seed_catalog(&pool).await;
    sqlx::query("INSERT INTO reviews (model_id, rating) VALUES (1, 4.5)")
        .execute(&pool)
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let rows = AnalyticsRepo::manufacturer_ratings(&mut conn).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].manufacturer_name, "Toyota");
    assert!((rows[0].avg_rating - 4.5).abs() < f64::EPSILON);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn monthly_sales_stay_within_range(pool: PgPool) {
    seed_catalog(&pool).await;
    seed_dealerships(&pool, 1).await;
    for day in [
        date(2023, 1, 15),
        date(2023, 2, 10),
        date(2023, 2, 20),
        date(2023, 3, 31),
        date(2023, 4, 1),
    ] {
        insert_sale(&pool, 1, 1, day).await;
    }

    let range = DateRange::new(date(2023, 2, 1), date(2023, 3, 31)).unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let rows = AnalyticsRepo::monthly_sales(&mut conn, &range).await.unwrap();

    let months: Vec<_> = rows.iter().map(|r| (r.sale_month, r.total_sales)).collect();
    assert_eq!(months, vec![(date(2023, 2, 1), 2), (date(2023, 3, 1), 1)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dealership_sales_limited_to_five(pool: PgPool) {
    seed_catalog(&pool).await;
    seed_dealerships(&pool, 7).await;
    for dealer in 1..=7_i64 {
        for _ in 0..dealer {
            insert_sale(&pool, 2, dealer, date(2024, 5, 1)).await;
        }
    }

    let mut conn = pool.acquire().await.unwrap();
    let rows = AnalyticsRepo::dealership_sales(&mut conn).await.unwrap();

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].dealership_name, "Dealer 7");
    assert_eq!(rows[0].total_sales, 7);
    assert!(rows.windows(2).all(|w| w[0].total_sales >= w[1].total_sales));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_category_is_reported_as_uncategorized(pool: PgPool) {
    seed_catalog(&pool).await;

    let mut conn = pool.acquire().await.unwrap();
    let rows = AnalyticsRepo::category_distribution(&mut conn).await.unwrap();

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().any(|r| r.category == "Uncategorized"));
    assert!(rows.iter().all(|r| r.total_models == 1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_database_returns_no_rows(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let range = DateRange::new(date(2020, 1, 1), date(2030, 1, 1)).unwrap();

    assert!(AnalyticsRepo::manufacturer_ratings(&mut conn).await.unwrap().is_empty());
    assert!(AnalyticsRepo::monthly_sales(&mut conn, &range).await.unwrap().is_empty());
    assert!(AnalyticsRepo::category_distribution(&mut conn).await.unwrap().is_empty());
    assert!(AnalyticsRepo::top_speeds(&mut conn).await.unwrap().is_empty());
    assert!(AnalyticsRepo::dealership_sales(&mut conn).await.unwrap().is_empty());
    assert!(AnalyticsRepo::category_discounts(&mut conn).await.unwrap().is_empty());
    assert!(AnalyticsRepo::category_monthly_sales(&mut conn).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_monthly_sales_ordered_by_month_then_category(pool: PgPool) {
    seed_catalog(&pool).await;
    seed_dealerships(&pool, 1).await;
    insert_sale(&pool, 3, 1, date(2023, 1, 3)).await;
    insert_sale(&pool, 1, 1, date(2023, 1, 9)).await;
    insert_sale(&pool, 1, 1, date(2023, 2, 9)).await;

    let mut conn = pool.acquire().await.unwrap();
    let rows = AnalyticsRepo::category_monthly_sales(&mut conn).await.unwrap();

    let keys: Vec<_> = rows
        .iter()
        .map(|r| (r.sale_month, r.category.as_str(), r.total_sales))
        .collect();
    assert_eq!(
        keys,
        vec![
            (date(2023, 1, 1), "Coupe", 1),
            (date(2023, 1, 1), "Sedan", 1),
            (date(2023, 2, 1), "Sedan", 1),
        ]
    );
}
