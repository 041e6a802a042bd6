use super::{from_label, insert_event_row, insert_run_row, CollectionStore};
use crate::{
    aggregation::{GroupKey, OperationalGroup},
    domain::Tier,
    error::PipelineResult,
    event::EventLogEntry,
    extraction::ExclusionAudit,
    report::ContactPlanReport,
};
use rusqlite::{params, Connection};

impl CollectionStore {
    /// Persist a finished report under `run_id`. Group rank follows report order.
    pub fn save_report(&self, run_id: &str, report: &ContactPlanReport) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        write_report(&tx, run_id, report)?;
        tx.commit()?;
        Ok(())
    }

    /// Persist a whole run in one transaction: the run row, its event
    /// log and its report. On failure nothing of the run is kept.
    pub fn record_run(
        &self,
        run: &NewRun<'_>,
        events: &[EventLogEntry],
        report: &ContactPlanReport,
    ) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_run_row(&tx, run.run_id, run.seed, run.version, run.fingerprint)?;
        for entry in events {
            insert_event_row(&tx, entry)?;
        }
        write_report(&tx, run.run_id, report)?;
        tx.commit()?;
        Ok(())
    }

    /// Rebuild the report stored for `run_id`.
    pub fn load_report(&self, run_id: &str) -> PipelineResult<ContactPlanReport> {
        let run = self.run(run_id)?;

        let rows = self
            .conn
            .prepare(
                "SELECT calling_zone, optimal_contact_time, contact_method,
                        economic_priority, tier_classification, customer_count,
                        total_default_amount, avg_success_multiplier, expected_collection,
                        calls_per_hour, daily_call_capacity, resource_recommendation,
                        customers_with_indicators, avg_gdp_growth_rate,
                        avg_unemployment_rate, avg_per_capita_income
                 FROM contact_plan_group WHERE run_id = ?1 ORDER BY rank ASC",
            )?
            .query_map(params![run_id], |row| {
                Ok(StoredGroup {
                    calling_zone: row.get(0)?,
                    contact_window: row.get(1)?,
                    contact_method: row.get(2)?,
                    economic_priority: row.get(3)?,
                    tier: row.get(4)?,
                    customer_count: row.get(5)?,
                    total_default_amount: row.get(6)?,
                    avg_success_multiplier: row.get(7)?,
                    expected_collection: row.get(8)?,
                    calls_per_hour: row.get(9)?,
                    daily_call_capacity: row.get(10)?,
                    resource_recommendation: row.get(11)?,
                    customers_with_indicators: row.get(12)?,
                    avg_gdp_growth_rate: row.get(13)?,
                    avg_unemployment_rate: row.get(14)?,
                    avg_per_capita_income: row.get(15)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let groups = rows
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_group(i))
            .collect::<PipelineResult<Vec<_>>>()?;

        let mut audit = ExclusionAudit::default();
        let counts = self
            .conn
            .prepare("SELECT reason, count FROM exclusion_audit WHERE run_id = ?1")?
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (reason, count) in counts {
            audit.set(&reason, count as u64);
        }

        Ok(ContactPlanReport {
            eligible_customers: run.eligible_customers.unwrap_or(0),
            groups,
            audit,
        })
    }
}

/// Run fields written by `record_run`.
#[derive(Debug, Clone, Copy)]
pub struct NewRun<'a> {
    pub run_id: &'a str,
    pub seed: Option<u64>,
    pub version: &'a str,
    pub fingerprint: &'a str,
}

fn write_report(conn: &Connection, run_id: &str, report: &ContactPlanReport) -> PipelineResult<()> {
    {
        let mut stmt = conn.prepare(
            "INSERT INTO contact_plan_group (
                run_id, rank, calling_zone, optimal_contact_time, contact_method,
                economic_priority, tier_classification, customer_count,
                total_default_amount, avg_success_multiplier, expected_collection,
                calls_per_hour, daily_call_capacity, resource_recommendation,
                customers_with_indicators, avg_gdp_growth_rate,
                avg_unemployment_rate, avg_per_capita_income
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        )?;
        for (rank, g) in report.groups.iter().enumerate() {
            stmt.execute(params![
                run_id,
                rank as i64,
                g.key.calling_zone.label(),
                g.key.contact_window.label(),
                g.key.contact_method.label(),
                g.key.economic_priority.label(),
                g.key.tier.label(),
                g.customer_count as i64,
                g.total_default_amount,
                g.avg_success_multiplier,
                g.expected_collection,
                g.calls_per_hour,
                g.daily_call_capacity as i64,
                g.resource_recommendation.label(),
                g.customers_with_indicators as i64,
                g.avg_gdp_growth_rate,
                g.avg_unemployment_rate,
                g.avg_per_capita_income,
            ])?;
        }

        let mut stmt = conn.prepare(
            "INSERT INTO exclusion_audit (run_id, reason, count) VALUES (?1, ?2, ?3)",
        )?;
        for (reason, count) in report.audit.entries() {
            stmt.execute(params![run_id, reason, count as i64])?;
        }
    }
    conn.execute(
        "UPDATE pipeline_run SET eligible_customers = ?1 WHERE run_id = ?2",
        params![report.eligible_customers as i64, run_id],
    )?;
    Ok(())
}

/// One contact_plan_group row before its labels are parsed.
struct StoredGroup {
    calling_zone: String,
    contact_window: String,
    contact_method: String,
    economic_priority: String,
    tier: String,
    customer_count: i64,
    total_default_amount: f64,
    avg_success_multiplier: f64,
    expected_collection: f64,
    calls_per_hour: f64,
    daily_call_capacity: i64,
    resource_recommendation: String,
    customers_with_indicators: i64,
    avg_gdp_growth_rate: Option<f64>,
    avg_unemployment_rate: Option<f64>,
    avg_per_capita_income: Option<f64>,
}

impl StoredGroup {
    fn into_group(self, row: usize) -> PipelineResult<OperationalGroup> {
        const TABLE: &str = "contact_plan_group";
        Ok(OperationalGroup {
            key: GroupKey {
                calling_zone: from_label(TABLE, row, self.calling_zone)?,
                contact_window: from_label(TABLE, row, self.contact_window)?,
                contact_method: from_label(TABLE, row, self.contact_method)?,
                economic_priority: from_label(TABLE, row, self.economic_priority)?,
                tier: Tier::parse(&self.tier),
            },
            customer_count: self.customer_count as u64,
            total_default_amount: self.total_default_amount,
            avg_success_multiplier: self.avg_success_multiplier,
            expected_collection: self.expected_collection,
            calls_per_hour: self.calls_per_hour,
            daily_call_capacity: self.daily_call_capacity as u64,
            resource_recommendation: from_label(TABLE, row, self.resource_recommendation)?,
            customers_with_indicators: self.customers_with_indicators as u64,
            avg_gdp_growth_rate: self.avg_gdp_growth_rate,
            avg_unemployment_rate: self.avg_unemployment_rate,
            avg_per_capita_income: self.avg_per_capita_income,
        })
    }
}
