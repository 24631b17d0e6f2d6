//! Medicine catalogue and stock service
//!
//! Owns the `medicines` table. Stock only moves through sales (deduction),
//! receipts (addition) and reorder receipts; medicines are never deleted.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Text, FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    DrugSchedule, ExpiryUrgency, LowStockPriority, Medicine, MedicineCategory, MedicineSnapshot,
};
use shared::validation::{validate_batch_dates, validate_price, validate_stock_thresholds};

const DEFAULT_MIN_QUANTITY: i64 = 20;

const MEDICINE_COLUMNS: &str = "id, brand_name, generic_name, company, batch_no, mfg_date, \
     expiry_date, quantity, min_quantity, max_quantity, mrp, purchase_price, category, \
     schedule, store_location, created_at, updated_at";

/// Inventory service for the medicine catalogue and stock levels
#[derive(Clone)]
pub struct InventoryService {
    db: SqlitePool,
}

/// Input for adding a medicine to the catalogue
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMedicineInput {
    #[validate(length(min = 1, max = 200, message = "Brand name is required"))]
    pub brand_name: String,
    pub generic_name: Option<String>,
    pub company: Option<String>,
    pub batch_no: Option<String>,
    pub mfg_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
    pub min_quantity: Option<i64>,
    pub max_quantity: i64,
    pub mrp: Decimal,
    pub purchase_price: Decimal,
    pub category: MedicineCategory,
    pub schedule: Option<DrugSchedule>,
    pub store_location: Option<String>,
}

/// Input for receiving stock from a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct ReceiveStockInput {
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i64,
}

/// Row returned by the under-stock scan
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UnderStockedMedicine {
    pub medicine_id: Uuid,
    pub brand_name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
}

/// Medicine at or below its minimum threshold
#[derive(Debug, Clone, Serialize)]
pub struct LowStockItem {
    pub medicine_id: Uuid,
    pub brand_name: String,
    pub generic_name: Option<String>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub shortage: i64,
    pub priority: LowStockPriority,
}

/// Medicine expiring inside the requested window
#[derive(Debug, Clone, Serialize)]
pub struct ExpiringMedicine {
    pub medicine_id: Uuid,
    pub brand_name: String,
    pub generic_name: Option<String>,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub days_left: i64,
    pub urgency: ExpiryUrgency,
}

/// Stock levels and selling price after a deduction
#[derive(Debug, Clone, FromRow)]
pub struct StockLevel {
    pub brand_name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub mrp: Text<Decimal>,
}

/// Row for medicine queries
#[derive(Debug, FromRow)]
struct MedicineRow {
    id: Uuid,
    brand_name: String,
    generic_name: Option<String>,
    company: Option<String>,
    batch_no: Option<String>,
    mfg_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    quantity: i64,
    min_quantity: i64,
    max_quantity: i64,
    mrp: Text<Decimal>,
    purchase_price: Text<Decimal>,
    category: String,
    schedule: String,
    store_location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MedicineRow> for Medicine {
    type Error = AppError;

    fn try_from(row: MedicineRow) -> Result<Self, Self::Error> {
        let schedule = DrugSchedule::parse(&row.schedule).ok_or_else(|| {
            AppError::Internal(format!("Unknown drug schedule '{}'", row.schedule))
        })?;

        Ok(Medicine {
            id: row.id,
            brand_name: row.brand_name,
            generic_name: row.generic_name,
            company: row.company,
            batch_no: row.batch_no,
            mfg_date: row.mfg_date,
            expiry_date: row.expiry_date,
            quantity: row.quantity,
            min_quantity: row.min_quantity,
            max_quantity: row.max_quantity,
            mrp: row.mrp.0,
            purchase_price: row.purchase_price.0,
            category: row.category,
            schedule,
            store_location: row.store_location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row for the snapshot read used by forecasting
#[derive(Debug, FromRow)]
struct SnapshotRow {
    id: Uuid,
    brand_name: String,
    quantity: i64,
    min_quantity: i64,
    max_quantity: i64,
    category: String,
}

/// Row for the expiry scan
#[derive(Debug, FromRow)]
struct ExpiryRow {
    id: Uuid,
    brand_name: String,
    generic_name: Option<String>,
    quantity: i64,
    expiry_date: NaiveDate,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Add a medicine to the catalogue
    pub async fn create_medicine(&self, input: CreateMedicineInput) -> AppResult<Medicine> {
        input.validate()?;

        let min_quantity = input.min_quantity.unwrap_or(DEFAULT_MIN_QUANTITY);
        validate_stock_thresholds(min_quantity, input.max_quantity)
            .map_err(|msg| AppError::validation("min_quantity", msg))?;
        validate_price(input.mrp).map_err(|msg| AppError::validation("mrp", msg))?;
        validate_price(input.purchase_price)
            .map_err(|msg| AppError::validation("purchase_price", msg))?;
        validate_batch_dates(input.mfg_date, input.expiry_date)
            .map_err(|msg| AppError::validation("expiry_date", msg))?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let schedule = input.schedule.unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO medicines (
                id, brand_name, generic_name, company, batch_no, mfg_date, expiry_date,
                quantity, min_quantity, max_quantity, mrp, purchase_price, category,
                schedule, store_location, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&input.brand_name)
        .bind(&input.generic_name)
        .bind(&input.company)
        .bind(&input.batch_no)
        .bind(input.mfg_date)
        .bind(input.expiry_date)
        .bind(input.quantity)
        .bind(min_quantity)
        .bind(input.max_quantity)
        .bind(Text(input.mrp))
        .bind(Text(input.purchase_price))
        .bind(input.category.as_str())
        .bind(schedule.as_str())
        .bind(&input.store_location)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?;

        tracing::info!(
            medicine_id = %id,
            brand_name = %input.brand_name,
            quantity = input.quantity,
            "Medicine added to catalogue"
        );

        self.get_medicine(id).await
    }

    /// Get a medicine by id
    pub async fn get_medicine(&self, id: Uuid) -> AppResult<Medicine> {
        let sql = format!("SELECT {} FROM medicines WHERE id = ?", MEDICINE_COLUMNS);
        let row = sqlx::query_as::<_, MedicineRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Medicine".to_string()))?;

        row.try_into()
    }

    /// List medicines, optionally filtered by brand, generic name or company
    pub async fn list_medicines(&self, search: Option<&str>) -> AppResult<Vec<Medicine>> {
        let rows = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let sql = format!(
                    "SELECT {} FROM medicines \
                     WHERE brand_name LIKE ?1 OR generic_name LIKE ?1 OR company LIKE ?1 \
                     ORDER BY brand_name",
                    MEDICINE_COLUMNS
                );
                sqlx::query_as::<_, MedicineRow>(&sql)
                    .bind(format!("%{}%", term))
                    .fetch_all(&self.db)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM medicines ORDER BY brand_name", MEDICINE_COLUMNS);
                sqlx::query_as::<_, MedicineRow>(&sql)
                    .fetch_all(&self.db)
                    .await?
            }
        };

        rows.into_iter().map(Medicine::try_from).collect()
    }

    /// Receive stock from a supplier
    pub async fn receive_stock(&self, id: Uuid, input: ReceiveStockInput) -> AppResult<Medicine> {
        input.validate()?;

        let mut conn = self.db.acquire().await?;
        Self::add_stock(&mut conn, id, input.quantity, Utc::now()).await?;
        drop(conn);

        tracing::info!(medicine_id = %id, quantity = input.quantity, "Stock received");

        self.get_medicine(id).await
    }

    /// Add units to a medicine on an existing connection
    pub(crate) async fn add_stock(
        conn: &mut SqliteConnection,
        id: Uuid,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE medicines SET quantity = quantity + ?, updated_at = ? WHERE id = ?",
        )
        .bind(quantity)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Medicine".to_string()));
        }
        Ok(())
    }

    /// Deduct sold units in a single conditional update, so concurrent sales
    /// can never drive stock below zero.
    pub(crate) async fn deduct_stock(
        conn: &mut SqliteConnection,
        id: Uuid,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> AppResult<StockLevel> {
        let updated = sqlx::query_as::<_, StockLevel>(
            r#"
            UPDATE medicines
            SET quantity = quantity - ?1, updated_at = ?2
            WHERE id = ?3 AND quantity >= ?1
            RETURNING brand_name, quantity, min_quantity, max_quantity, mrp
            "#,
        )
        .bind(quantity)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(level) = updated {
            return Ok(level);
        }

        let available = sqlx::query_as::<_, (String, i64)>(
            "SELECT brand_name, quantity FROM medicines WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match available {
            Some((brand_name, on_hand)) => Err(AppError::InsufficientStock(format!(
                "Only {} units of {} available",
                on_hand, brand_name
            ))),
            None => Err(AppError::NotFound("Medicine".to_string())),
        }
    }

    /// Point-in-time read used by the forecaster
    pub async fn medicine_info(&self, id: Uuid) -> AppResult<MedicineSnapshot> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT id, brand_name, quantity, min_quantity, max_quantity, category
            FROM medicines
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Medicine".to_string()))?;

        Ok(MedicineSnapshot {
            id: row.id,
            name: row.brand_name,
            quantity: row.quantity,
            min_quantity: row.min_quantity,
            max_quantity: row.max_quantity,
            category: row.category,
        })
    }

    /// Medicines at or below `min_quantity * multiplier`, largest shortfall first
    pub async fn under_stocked_medicines(
        &self,
        multiplier: f64,
    ) -> AppResult<Vec<UnderStockedMedicine>> {
        let rows = sqlx::query_as::<_, UnderStockedMedicine>(
            r#"
            SELECT id AS medicine_id, brand_name, quantity, min_quantity, max_quantity
            FROM medicines
            WHERE CAST(quantity AS REAL) <= min_quantity * ?
            ORDER BY (min_quantity - quantity) DESC, brand_name
            "#,
        )
        .bind(multiplier)
        .fetch_all(&self.db)
        .await?;

        tracing::debug!(count = rows.len(), multiplier, "Under-stocked scan");
        Ok(rows)
    }

    /// Medicines at or below their minimum, largest shortage first
    pub async fn low_stock_medicines(&self) -> AppResult<Vec<LowStockItem>> {
        let rows = sqlx::query_as::<_, (Uuid, String, Option<String>, i64, i64)>(
            r#"
            SELECT id, brand_name, generic_name, quantity, min_quantity
            FROM medicines
            WHERE quantity <= min_quantity
            ORDER BY (min_quantity - quantity) DESC, brand_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(medicine_id, brand_name, generic_name, quantity, min_quantity)| LowStockItem {
                    medicine_id,
                    brand_name,
                    generic_name,
                    quantity,
                    min_quantity,
                    shortage: min_quantity - quantity,
                    priority: LowStockPriority::classify(quantity, min_quantity),
                },
            )
            .collect())
    }

    /// Medicines expiring between `today` and `today + days`, soonest first
    pub async fn expiring_medicines(
        &self,
        days: i64,
        today: NaiveDate,
    ) -> AppResult<Vec<ExpiringMedicine>> {
        if days < 0 {
            return Err(AppError::validation("days", "Days must not be negative"));
        }

        let until = today + Duration::days(days);
        let rows = sqlx::query_as::<_, ExpiryRow>(
            r#"
            SELECT id, brand_name, generic_name, quantity, expiry_date
            FROM medicines
            WHERE expiry_date IS NOT NULL AND expiry_date BETWEEN ? AND ?
            ORDER BY expiry_date, brand_name
            "#,
        )
        .bind(today)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let days_left = (row.expiry_date - today).num_days();
                ExpiringMedicine {
                    medicine_id: row.id,
                    brand_name: row.brand_name,
                    generic_name: row.generic_name,
                    quantity: row.quantity,
                    expiry_date: row.expiry_date,
                    days_left,
                    urgency: ExpiryUrgency::from_days_left(days_left),
                }
            })
            .collect())
    }

    /// Load the sample catalogue when the table is empty. Returns rows inserted.
    pub async fn seed_sample_catalogue(&self) -> AppResult<usize> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.db)
            .await?;
        if count > 0 {
            return Ok(0);
        }

        let catalogue = sample_catalogue();
        let inserted = catalogue.len();
        for input in catalogue {
            self.create_medicine(input).await?;
        }

        tracing::info!(inserted, "Seeded sample catalogue");
        Ok(inserted)
    }
}

/// Common Indian medicines used to bootstrap a demo database
fn sample_catalogue() -> Vec<CreateMedicineInput> {
    use DrugSchedule::{Otc, ScheduleH};
    use MedicineCategory::*;

    let rows = [
        ("Crocin 650mg", "Paracetamol", "GSK", "CRN-2024-01", (2024, 1, 15), (2025, 12, 31), 100, 200, 30, 1500, 850, Analgesic, Otc, "Rack A1"),
        ("Combiflam", "Ibuprofen + Paracetamol", "Sanofi", "CBF-2024-02", (2024, 2, 10), (2025, 11, 30), 75, 150, 25, 2500, 1500, Analgesic, Otc, "Rack A2"),
        ("Augmentin 625mg", "Amoxicillin + Clavulanic", "GSK", "AUG-2024-01", (2024, 1, 20), (2025, 10, 31), 50, 100, 20, 18000, 12000, Antibiotic, ScheduleH, "Rack B1"),
        ("Azithral 500mg", "Azithromycin", "Alembic", "AZT-2024-03", (2024, 3, 5), (2026, 3, 4), 60, 120, 25, 8500, 5500, Antibiotic, ScheduleH, "Rack B2"),
        ("Cardace 5mg", "Ramipril", "Sun Pharma", "CRD-2024-01", (2024, 1, 12), (2025, 12, 31), 80, 160, 40, 12000, 8500, Cardiac, ScheduleH, "Rack C1"),
        ("Storvas 10mg", "Atorvastatin", "Sun Pharma", "STV-2024-02", (2024, 2, 18), (2026, 2, 17), 90, 180, 45, 9500, 6500, Cardiac, ScheduleH, "Rack C2"),
        ("Glycomet GP 1", "Metformin + Glimepiride", "USV", "GLY-2024-01", (2024, 1, 25), (2025, 12, 31), 120, 240, 50, 13500, 9000, Diabetic, ScheduleH, "Rack D1"),
        ("Januvia 100mg", "Sitagliptin", "MSD", "JNV-2024-02", (2024, 2, 14), (2026, 2, 13), 40, 80, 20, 48000, 35000, Diabetic, ScheduleH, "Rack D2"),
        ("Pantop 40mg", "Pantoprazole", "Sun Pharma", "PAN-2024-01", (2024, 1, 8), (2025, 12, 31), 150, 300, 60, 4500, 2500, Gastrointestinal, ScheduleH, "Rack E1"),
        ("Cyclopam", "Dicyclomine + Paracetamol", "Mankind", "CYC-2024-03", (2024, 3, 1), (2026, 2, 28), 110, 220, 45, 6500, 3500, Gastrointestinal, Otc, "Rack E2"),
    ];

    rows.into_iter()
        .map(
            |(brand, generic, company, batch, mfg, expiry, qty, max, min, mrp_paise, cost_paise, category, schedule, location)| {
                CreateMedicineInput {
                    brand_name: brand.to_string(),
                    generic_name: Some(generic.to_string()),
                    company: Some(company.to_string()),
                    batch_no: Some(batch.to_string()),
                    mfg_date: NaiveDate::from_ymd_opt(mfg.0, mfg.1, mfg.2),
                    expiry_date: NaiveDate::from_ymd_opt(expiry.0, expiry.1, expiry.2),
                    quantity: qty,
                    min_quantity: Some(min),
                    max_quantity: max,
                    mrp: Decimal::new(mrp_paise, 2),
                    purchase_price: Decimal::new(cost_paise, 2),
                    category,
                    schedule: Some(schedule),
                    store_location: Some(location.to_string()),
                }
            },
        )
        .collect()
}
