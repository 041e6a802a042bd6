use super::{from_label, CollectionStore};
use crate::{
    domain::{City, CollectionStatus, Customer, DefaultCollection, EconomicIndicator, Loan, Region, State, Tier},
    error::{PipelineError, PipelineResult},
    snapshot::Snapshot,
    types::Quarter,
};
use chrono::NaiveDate;
use rusqlite::params;

const SNAPSHOT_TABLES: [&str; 6] = [
    "dim_state",
    "dim_city",
    "customers",
    "loans",
    "defaults_collections",
    "economic_indicators",
];

fn date_text(d: Option<NaiveDate>) -> Option<String> {
    d.map(|d| d.format("%Y-%m-%d").to_string())
}

fn parse_date(table: &str, row: usize, text: Option<String>) -> PipelineResult<Option<NaiveDate>> {
    match text.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some).map_err(|e| {
            PipelineError::MalformedRecord {
                table: table.to_string(),
                row,
                reason: format!("bad date '{s}': {e}"),
            }
        }),
    }
}

impl CollectionStore {
    // ── Snapshot write ─────────────────────────────────────────

    /// Replace the stored snapshot with `snapshot`, in one transaction.
    pub fn replace_snapshot(&self, snapshot: &Snapshot) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in SNAPSHOT_TABLES {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO dim_state (state_id, state_name, region) VALUES (?1, ?2, ?3)",
            )?;
            for s in &snapshot.states {
                stmt.execute(params![s.state_id, s.state_name, s.region.label()])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO dim_city (city_id, city_name, state_id, tier_classification)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for c in &snapshot.cities {
                stmt.execute(params![c.city_id, c.city_name, c.state_id, c.tier_classification.label()])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO customers (
                    customer_id, full_name, phone_number, email_address, city_id,
                    current_address, annual_income, cibil_score, employment_type,
                    gender, date_of_birth
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for c in &snapshot.customers {
                stmt.execute(params![
                    c.customer_id,
                    c.full_name,
                    c.phone_number,
                    c.email_address,
                    c.city_id,
                    c.current_address,
                    c.annual_income,
                    c.cibil_score,
                    c.employment_type,
                    c.gender,
                    date_text(c.date_of_birth),
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO loans (loan_id, customer_id, loan_amount, loan_status, disbursement_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for l in &snapshot.loans {
                stmt.execute(params![
                    l.loan_id,
                    l.customer_id,
                    l.loan_amount,
                    l.loan_status,
                    date_text(l.disbursement_date),
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO defaults_collections (
                    default_id, customer_id, loan_id, default_date, default_amount,
                    days_overdue, collection_status, last_contact_date, contact_attempts,
                    legal_notice_sent, recovery_amount, collection_agent_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for d in &snapshot.defaults {
                stmt.execute(params![
                    d.default_id,
                    d.customer_id,
                    d.loan_id,
                    date_text(d.default_date),
                    d.default_amount,
                    d.days_overdue,
                    d.collection_status.label(),
                    date_text(d.last_contact_date),
                    d.contact_attempts,
                    d.legal_notice_sent,
                    d.recovery_amount,
                    d.collection_agent_id,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO economic_indicators (
                    indicator_id, state_id, quarter, gdp_growth_rate, inflation_rate,
                    unemployment_rate, per_capita_income
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for i in &snapshot.indicators {
                stmt.execute(params![
                    i.indicator_id,
                    i.state_id,
                    i.quarter.to_string(),
                    i.gdp_growth_rate,
                    i.inflation_rate,
                    i.unemployment_rate,
                    i.per_capita_income,
                ])?;
            }
        }

        tx.commit()?;
        log::info!("store: snapshot written ({})", snapshot.fingerprint());
        Ok(())
    }

    // ── Snapshot read ──────────────────────────────────────────

    /// Bulk read of every snapshot table, each ordered by primary key.
    pub fn load_snapshot(&self) -> PipelineResult<Snapshot> {
        let states = self
            .conn
            .prepare("SELECT state_id, state_name, region FROM dim_state ORDER BY state_id")?
            .query_map([], |row| {
                Ok(State {
                    state_id: row.get(0)?,
                    state_name: row.get(1)?,
                    region: Region::parse(&row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let cities = self
            .conn
            .prepare(
                "SELECT city_id, city_name, state_id, tier_classification
                 FROM dim_city ORDER BY city_id",
            )?
            .query_map([], |row| {
                Ok(City {
                    city_id: row.get(0)?,
                    city_name: row.get(1)?,
                    state_id: row.get(2)?,
                    tier_classification: Tier::parse(&row.get::<_, String>(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let raw_customers = self
            .conn
            .prepare(
                "SELECT customer_id, full_name, phone_number, email_address, city_id,
                        current_address, annual_income, cibil_score, employment_type,
                        gender, date_of_birth
                 FROM customers ORDER BY customer_id",
            )?
            .query_map([], |row| {
                Ok((
                    Customer {
                        customer_id: row.get(0)?,
                        full_name: row.get(1)?,
                        phone_number: row.get(2)?,
                        email_address: row.get(3)?,
                        city_id: row.get(4)?,
                        current_address: row.get(5)?,
                        annual_income: row.get(6)?,
                        cibil_score: row.get(7)?,
                        employment_type: row.get(8)?,
                        gender: row.get(9)?,
                        date_of_birth: None,
                    },
                    row.get::<_, Option<String>>(10)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let customers = raw_customers
            .into_iter()
            .enumerate()
            .map(|(i, (mut c, dob))| {
                c.date_of_birth = parse_date("customers", i, dob)?;
                Ok(c)
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let raw_loans = self
            .conn
            .prepare(
                "SELECT loan_id, customer_id, loan_amount, loan_status, disbursement_date
                 FROM loans ORDER BY loan_id",
            )?
            .query_map([], |row| {
                Ok((
                    Loan {
                        loan_id: row.get(0)?,
                        customer_id: row.get(1)?,
                        loan_amount: row.get(2)?,
                        loan_status: row.get(3)?,
                        disbursement_date: None,
                    },
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let loans = raw_loans
            .into_iter()
            .enumerate()
            .map(|(i, (mut l, disbursed))| {
                l.disbursement_date = parse_date("loans", i, disbursed)?;
                Ok(l)
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let raw_defaults = self
            .conn
            .prepare(
                "SELECT default_id, customer_id, loan_id, default_date, default_amount,
                        days_overdue, collection_status, last_contact_date, contact_attempts,
                        legal_notice_sent, recovery_amount, collection_agent_id
                 FROM defaults_collections ORDER BY default_id",
            )?
            .query_map([], |row| {
                Ok((
                    DefaultCollection {
                        default_id: row.get(0)?,
                        customer_id: row.get(1)?,
                        loan_id: row.get(2)?,
                        default_date: None,
                        default_amount: row.get(4)?,
                        days_overdue: row.get(5)?,
                        collection_status: CollectionStatus::parse(&row.get::<_, String>(6)?),
                        last_contact_date: None,
                        contact_attempts: row.get(8)?,
                        legal_notice_sent: row.get(9)?,
                        recovery_amount: row.get(10)?,
                        collection_agent_id: row.get(11)?,
                    },
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let defaults = raw_defaults
            .into_iter()
            .enumerate()
            .map(|(i, (mut d, date, contacted))| {
                d.default_date = parse_date("defaults_collections", i, date)?;
                d.last_contact_date = parse_date("defaults_collections", i, contacted)?;
                Ok(d)
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let raw_indicators = self
            .conn
            .prepare(
                "SELECT indicator_id, state_id, quarter, gdp_growth_rate, inflation_rate,
                        unemployment_rate, per_capita_income
                 FROM economic_indicators ORDER BY indicator_id",
            )?
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                    row.get::<_, Option<f64>>(5)?,
                    row.get::<_, Option<f64>>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let indicators = raw_indicators
            .into_iter()
            .enumerate()
            .map(|(i, (indicator_id, state_id, quarter, gdp, inflation, unemployment, per_capita))| {
                let quarter: Quarter = from_label("economic_indicators", i, quarter)?;
                Ok(EconomicIndicator {
                    indicator_id,
                    state_id,
                    quarter,
                    gdp_growth_rate: gdp,
                    inflation_rate: inflation,
                    unemployment_rate: unemployment,
                    per_capita_income: per_capita,
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let snapshot = Snapshot {
            states,
            cities,
            customers,
            loans,
            defaults,
            indicators,
        };
        log::info!("store: snapshot loaded ({})", snapshot.fingerprint());
        Ok(snapshot)
    }

    /// Row count of one snapshot table.
    pub fn snapshot_row_count(&self, table: &str) -> PipelineResult<i64> {
        if !SNAPSHOT_TABLES.contains(&table) {
            return Err(PipelineError::Other(anyhow::anyhow!(
                "'{table}' is not a snapshot table"
            )));
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }
}
