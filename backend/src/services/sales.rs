//! Billing counter and sales history
//!
//! A bill is written in one transaction: every line deducts stock atomically,
//! is appended to `sales`, and may raise a low-stock alert plus a HIGH
//! priority reorder. Any failing line rolls the whole bill back.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Text, FromRow, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    bill_number, compute_bill_totals, low_stock_message, AlertType, BillLine, BillTotals,
    DailySales, PaymentMode, SaleRecord, SalesSummary, Severity, DEFAULT_GST_PERCENT,
};
use crate::services::{AlertService, InventoryService, ReorderQueueService};
use shared::types::DateRange;
use shared::validation::{validate_discount_percent, validate_gst_percent, validate_indian_phone};

const AUTO_REORDER_REASON: &str = "Auto reorder - stock below minimum";

#[derive(Clone)]
pub struct SalesService {
    db: SqlitePool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillItemInput {
    pub medicine_id: Uuid,
    pub quantity: i64,
}

/// Input for a counter sale
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBillInput {
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<BillItemInput>,
    pub discount_percent: Option<Decimal>,
    pub gst_percent: Option<Decimal>,
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    #[validate(length(max = 200))]
    pub doctor_name: Option<String>,
    pub payment_mode: Option<PaymentMode>,
}

/// Receipt returned after a successful bill
#[derive(Debug, Clone, Serialize)]
pub struct Bill {
    pub bill_no: String,
    pub sale_date: NaiveDate,
    pub lines: Vec<BillLine>,
    pub discount_percent: Decimal,
    pub gst_percent: Decimal,
    pub totals: BillTotals,
    pub customer_name: Option<String>,
    pub doctor_name: Option<String>,
    pub payment_mode: PaymentMode,
    /// Medicines that dropped to or below their minimum with this bill
    pub low_stock: Vec<Uuid>,
}

/// A day's sales with its summary
#[derive(Debug, Clone, Serialize)]
pub struct DaySales {
    pub summary: SalesSummary,
    pub sales: Vec<SaleRecord>,
}

/// Revenue for one day of a trend report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub units_sold: i64,
    pub bill_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSeller {
    pub medicine_id: Uuid,
    pub brand_name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    bill_no: String,
    medicine_id: Uuid,
    quantity: i64,
    unit_price: Text<Decimal>,
    discount_percent: Text<Decimal>,
    gst_percent: Text<Decimal>,
    line_total: Text<Decimal>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    doctor_name: Option<String>,
    payment_mode: String,
    sale_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for SaleRecord {
    type Error = AppError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let payment_mode = PaymentMode::parse(&row.payment_mode).ok_or_else(|| {
            AppError::Internal(format!("Unknown payment mode '{}'", row.payment_mode))
        })?;

        Ok(SaleRecord {
            id: row.id,
            bill_no: row.bill_no,
            medicine_id: row.medicine_id,
            quantity: row.quantity,
            unit_price: row.unit_price.0,
            discount_percent: row.discount_percent.0,
            gst_percent: row.gst_percent.0,
            line_total: row.line_total.0,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            doctor_name: row.doctor_name,
            payment_mode,
            sale_date: row.sale_date,
            created_at: row.created_at,
        })
    }
}

impl SalesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Bill a counter sale
    pub async fn create_bill(&self, input: CreateBillInput) -> AppResult<Bill> {
        self.create_bill_at(input, Utc::now()).await
    }

    pub(crate) async fn create_bill_at(
        &self,
        input: CreateBillInput,
        now: DateTime<Utc>,
    ) -> AppResult<Bill> {
        input.validate()?;

        if input.items.iter().any(|item| item.quantity < 1) {
            return Err(AppError::validation("quantity", "Quantity must be at least 1"));
        }
        let discount_percent = input.discount_percent.unwrap_or(Decimal::ZERO);
        validate_discount_percent(discount_percent)
            .map_err(|msg| AppError::validation("discount_percent", msg))?;
        let gst_percent = input.gst_percent.unwrap_or(DEFAULT_GST_PERCENT);
        validate_gst_percent(gst_percent).map_err(|msg| AppError::validation("gst_percent", msg))?;
        if let Some(phone) = input.customer_phone.as_deref().filter(|p| !p.trim().is_empty()) {
            validate_indian_phone(phone).map_err(|msg| AppError::validation("customer_phone", msg))?;
        }

        let payment_mode = input.payment_mode.unwrap_or_default();
        let bill_no = bill_number(now);
        let sale_date = now.date_naive();

        let mut tx = self.db.begin().await?;
        let mut lines = Vec::with_capacity(input.items.len());
        let mut low_stock = Vec::new();

        for item in &input.items {
            let level =
                InventoryService::deduct_stock(&mut tx, item.medicine_id, item.quantity, now)
                    .await?;

            let line = BillLine {
                medicine_id: item.medicine_id,
                name: level.brand_name.clone(),
                quantity: item.quantity,
                unit_price: level.mrp.0,
            };

            sqlx::query(
                r#"
                INSERT INTO sales (
                    id, bill_no, medicine_id, quantity, unit_price, discount_percent,
                    gst_percent, line_total, customer_name, customer_phone, doctor_name,
                    payment_mode, sale_date, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&bill_no)
            .bind(item.medicine_id)
            .bind(item.quantity)
            .bind(Text(line.unit_price))
            .bind(Text(discount_percent))
            .bind(Text(gst_percent))
            .bind(Text(line.subtotal()))
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .bind(&input.doctor_name)
            .bind(payment_mode.as_str())
            .bind(sale_date)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if level.quantity <= level.min_quantity {
                AlertService::insert_in(
                    &mut tx,
                    item.medicine_id,
                    AlertType::LowStock,
                    &low_stock_message(level.quantity, level.min_quantity),
                    Severity::High,
                )
                .await?;

                let refill = level.max_quantity - level.quantity;
                if refill > 0 {
                    ReorderQueueService::enqueue_in(
                        &mut tx,
                        item.medicine_id,
                        refill,
                        AUTO_REORDER_REASON,
                        Severity::High,
                    )
                    .await?;
                }
                low_stock.push(item.medicine_id);
            }

            lines.push(line);
        }

        tx.commit().await?;

        let totals = compute_bill_totals(&lines, discount_percent, gst_percent);

        tracing::info!(
            bill_no = %bill_no,
            lines = lines.len(),
            grand_total = %totals.grand_total,
            low_stock = low_stock.len(),
            "Bill created"
        );

        Ok(Bill {
            bill_no,
            sale_date,
            lines,
            discount_percent,
            gst_percent,
            totals,
            customer_name: input.customer_name,
            doctor_name: input.doctor_name,
            payment_mode,
            low_stock,
        })
    }

    /// Units sold per date for one medicine, ascending, both bounds included
    pub async fn daily_sales(
        &self,
        medicine_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<DailySales>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT sale_date, SUM(quantity)
            FROM sales
            WHERE medicine_id = ? AND sale_date BETWEEN ? AND ?
            GROUP BY sale_date
            ORDER BY sale_date
            "#,
        )
        .bind(medicine_id)
        .bind(since)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        tracing::debug!(medicine_id = %medicine_id, days = rows.len(), "Daily sales loaded");

        Ok(rows
            .into_iter()
            .map(|(date, quantity)| DailySales::new(date, quantity))
            .collect())
    }

    /// Total units sold for a medicine on or after `since`
    pub async fn units_sold_since(&self, medicine_id: Uuid, since: NaiveDate) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0) FROM sales WHERE medicine_id = ? AND sale_date >= ?",
        )
        .bind(medicine_id)
        .bind(since)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    /// Every sale line on a date plus the day's totals
    pub async fn sales_on(&self, date: NaiveDate) -> AppResult<DaySales> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, bill_no, medicine_id, quantity, unit_price, discount_percent,
                   gst_percent, line_total, customer_name, customer_phone, doctor_name,
                   payment_mode, sale_date, created_at
            FROM sales
            WHERE sale_date = ?
            ORDER BY created_at, bill_no
            "#,
        )
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        let sales = rows
            .into_iter()
            .map(SaleRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        let bills: BTreeSet<&str> = sales.iter().map(|s| s.bill_no.as_str()).collect();
        let summary = SalesSummary {
            date,
            bill_count: bills.len() as i64,
            units_sold: sales.iter().map(|s| s.quantity).sum(),
            revenue: sales.iter().map(|s| s.line_total).sum(),
        };

        Ok(DaySales { summary, sales })
    }

    /// Revenue, units and bill count per day across a range
    pub async fn sales_trend(&self, range: DateRange) -> AppResult<Vec<DailyRevenue>> {
        let rows = sqlx::query_as::<_, (NaiveDate, String, i64, Text<Decimal>)>(
            r#"
            SELECT sale_date, bill_no, quantity, line_total
            FROM sales
            WHERE sale_date BETWEEN ? AND ?
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let mut by_date: BTreeMap<NaiveDate, (Decimal, i64, BTreeSet<String>)> = BTreeMap::new();
        for (date, bill_no, quantity, line_total) in rows {
            let day = by_date.entry(date).or_default();
            day.0 += line_total.0;
            day.1 += quantity;
            day.2.insert(bill_no);
        }

        Ok(by_date
            .into_iter()
            .map(|(date, (revenue, units_sold, bills))| DailyRevenue {
                date,
                revenue,
                units_sold,
                bill_count: bills.len() as i64,
            })
            .collect())
    }

    /// Best sellers by units across a range
    pub async fn top_selling(&self, range: DateRange, limit: usize) -> AppResult<Vec<TopSeller>> {
        let rows = sqlx::query_as::<_, (Uuid, String, i64, Text<Decimal>)>(
            r#"
            SELECT s.medicine_id, m.brand_name, s.quantity, s.line_total
            FROM sales s
            JOIN medicines m ON m.id = s.medicine_id
            WHERE s.sale_date BETWEEN ? AND ?
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let mut by_medicine: HashMap<Uuid, TopSeller> = HashMap::new();
        for (medicine_id, brand_name, quantity, line_total) in rows {
            let seller = by_medicine.entry(medicine_id).or_insert_with(|| TopSeller {
                medicine_id,
                brand_name,
                units_sold: 0,
                revenue: Decimal::ZERO,
            });
            seller.units_sold += quantity;
            seller.revenue += line_total.0;
        }

        let mut sellers: Vec<TopSeller> = by_medicine.into_values().collect();
        sellers.sort_by(|a, b| {
            b.units_sold
                .cmp(&a.units_sold)
                .then_with(|| a.brand_name.cmp(&b.brand_name))
        });
        sellers.truncate(limit);
        Ok(sellers)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::{MedicineCategory, ReorderStatus};
    use crate::services::inventory::tests::medicine_input;
    use chrono::TimeZone;
    use std::str::FromStr;
    use tokio_test::assert_ok;

    pub(crate) fn bill_for(items: &[(Uuid, i64)]) -> CreateBillInput {
        CreateBillInput {
            items: items
                .iter()
                .map(|&(medicine_id, quantity)| BillItemInput { medicine_id, quantity })
                .collect(),
            discount_percent: None,
            gst_percent: None,
            customer_name: None,
            customer_phone: None,
            doctor_name: None,
            payment_mode: None,
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, 10, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_bill_totals_and_stock_deduction() {
        let pool = test_pool().await;
        let inventory = InventoryService::new(pool.clone());
        let sales = SalesService::new(pool);
        let medicine = inventory
            .create_medicine(medicine_input("Crocin 650mg", MedicineCategory::Analgesic, 100, 30, 200))
            .await
            .unwrap();

        let mut input = bill_for(&[(medicine.id, 4)]);
        input.discount_percent = Some(Decimal::from(10));
        input.customer_phone = Some("+91 98765 43210".to_string());
        input.payment_mode = Some(PaymentMode::Upi);

        let bill = assert_ok!(sales.create_bill_at(input, at(15)).await);
        assert_eq!(bill.bill_no, "BILL20240715103000");
        assert_eq!(bill.totals.subtotal, Decimal::from_str("100.00").unwrap());
        assert_eq!(bill.totals.discount_amount, Decimal::from(10));
        assert_eq!(bill.totals.gst_amount, Decimal::from_str("16.2").unwrap());
        assert_eq!(bill.totals.grand_total, Decimal::from_str("106.2").unwrap());
        assert!(bill.low_stock.is_empty());

        assert_eq!(inventory.get_medicine(medicine.id).await.unwrap().quantity, 96);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_whole_bill() {
        let pool = test_pool().await;
        let inventory = InventoryService::new(pool.clone());
        let sales = SalesService::new(pool);
        let plenty = inventory
            .create_medicine(medicine_input("Pantop 40mg", MedicineCategory::Gastrointestinal, 150, 60, 300))
            .await
            .unwrap();
        let scarce = inventory
            .create_medicine(medicine_input("Januvia 100mg", MedicineCategory::Diabetic, 2, 20, 80))
            .await
            .unwrap();

        let err = sales
            .create_bill_at(bill_for(&[(plenty.id, 10), (scarce.id, 5)]), at(15))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));

        assert_eq!(inventory.get_medicine(plenty.id).await.unwrap().quantity, 150);
        assert_eq!(inventory.get_medicine(scarce.id).await.unwrap().quantity, 2);
        let day = sales.sales_on(at(15).date_naive()).await.unwrap();
        assert!(day.sales.is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_raises_alert_and_high_reorder() {
        let pool = test_pool().await;
        let inventory = InventoryService::new(pool.clone());
        let sales = SalesService::new(pool.clone());
        let alerts = AlertService::new(pool.clone());
        let queue = ReorderQueueService::new(pool);
        let medicine = inventory
            .create_medicine(medicine_input("Augmentin 625mg", MedicineCategory::Antibiotic, 25, 20, 100))
            .await
            .unwrap();

        let bill = sales
            .create_bill_at(bill_for(&[(medicine.id, 10)]), at(15))
            .await
            .unwrap();
        assert_eq!(bill.low_stock, vec![medicine.id]);

        let open = alerts.list_unresolved(Some(Severity::High)).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].message, "Stock below minimum (15/20)");

        // A second sale merges into the same pending reorder
        sales
            .create_bill_at(bill_for(&[(medicine.id, 5)]), at(16))
            .await
            .unwrap();
        let pending = queue.list(Some(ReorderStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].quantity, 90);
        assert_eq!(pending[0].priority, Severity::High);
    }

    #[test]
    fn test_empty_bill_reports_items_field() {
        let errors = bill_for(&[]).validate().unwrap_err();
        let field_errors = errors.field_errors();
        let items = field_errors["items"];
        assert_eq!(items[0].code, "length");
        assert_eq!(items[0].params["value"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_bill_validation() {
        let sales = SalesService::new(test_pool().await);

        let empty = bill_for(&[]);
        assert!(matches!(
            sales.create_bill(empty).await,
            Err(AppError::ValidationError(_))
        ));

        let zero_qty = bill_for(&[(Uuid::new_v4(), 0)]);
        assert!(matches!(
            sales.create_bill(zero_qty).await,
            Err(AppError::Validation { .. })
        ));

        let mut bad_phone = bill_for(&[(Uuid::new_v4(), 1)]);
        bad_phone.customer_phone = Some("12345".to_string());
        assert!(matches!(
            sales.create_bill(bad_phone).await,
            Err(AppError::Validation { .. })
        ));

        let unknown = bill_for(&[(Uuid::new_v4(), 1)]);
        assert!(matches!(
            sales.create_bill(unknown).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sales_history_queries() {
        let pool = test_pool().await;
        let inventory = InventoryService::new(pool.clone());
        let sales = SalesService::new(pool);
        let medicine = inventory
            .create_medicine(medicine_input("Storvas 10mg", MedicineCategory::Cardiac, 500, 45, 600))
            .await
            .unwrap();

        sales.create_bill_at(bill_for(&[(medicine.id, 3)]), at(10)).await.unwrap();
        sales.create_bill_at(bill_for(&[(medicine.id, 2)]), at(10) + chrono::Duration::minutes(5)).await.unwrap();
        sales.create_bill_at(bill_for(&[(medicine.id, 7)]), at(12)).await.unwrap();

        let history = sales
            .daily_sales(medicine.id, at(1).date_naive(), at(31).date_naive())
            .await
            .unwrap();
        assert_eq!(
            history,
            vec![
                DailySales::new(at(10).date_naive(), 5),
                DailySales::new(at(12).date_naive(), 7),
            ]
        );

        assert_eq!(sales.units_sold_since(medicine.id, at(11).date_naive()).await.unwrap(), 7);

        let day = sales.sales_on(at(10).date_naive()).await.unwrap();
        assert_eq!(day.summary.bill_count, 2);
        assert_eq!(day.summary.units_sold, 5);
        assert_eq!(day.summary.revenue, Decimal::from_str("125.00").unwrap());

        let trend = sales
            .sales_trend(DateRange::new(at(1).date_naive(), at(31).date_naive()))
            .await
            .unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[1].units_sold, 7);

        let top = sales
            .top_selling(DateRange::new(at(1).date_naive(), at(31).date_naive()), 5)
            .await
            .unwrap();
        assert_eq!(top[0].units_sold, 12);
        assert_eq!(top[0].brand_name, "Storvas 10mg");
    }
}
