//! Drill-down loading, percentage fan-out, and the report submission flow.

use std::collections::HashMap;

use futures::future::join_all;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

use super::{ActivityStatus, CompletionRule, Level, Percentage, PercentageVariant};
use crate::backend::{ApiClient, ApiError, id_of};
use crate::models::entity::{ActividadEstructura, ReportInput};

const REPORT_ENDPOINT: &str = "reporte";
const STRUCTURE_ENDPOINT: &str = "estructura";

/// What a report submission did.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub structure_id: i64,
    pub report_id: Option<i64>,
    pub created: bool,
    /// Activity status after this report.
    pub status: ActivityStatus,
    pub structure_percentage: Option<Percentage>,
    pub promoted: bool,
}

/// Result id of the report embedded in an activity row, if any.
///
/// Reads `reporte.resultado.id`, then `reporte.id_resultado`; ids may be
/// numbers or numeric strings.
pub fn activity_result(activity: &Value) -> Option<i64> {
    let report = activity.get("reporte")?;
    report
        .get("resultado")
        .and_then(|r| id_of(r, "id"))
        .or_else(|| id_of(report, "id_resultado"))
}

/// Per-request view of the hierarchy.
///
/// The backend has no "children of" query, so each level's full list is
/// fetched once and filtered by parent field. The fetch is memoised for the
/// lifetime of the aggregator.
pub struct Aggregator<'a> {
    api: &'a ApiClient,
    rule: CompletionRule,
    lists: HashMap<Level, OnceCell<Vec<Value>>>,
}

impl<'a> Aggregator<'a> {
    pub fn new(api: &'a ApiClient, rule: CompletionRule) -> Self {
        let lists = [Level::Conjuntos, Level::Structures, Level::Activities]
            .into_iter()
            .map(|l| (l, OnceCell::new()))
            .collect();
        Self { api, rule, lists }
    }

    pub fn rule(&self) -> &CompletionRule {
        &self.rule
    }

    async fn level_list(&self, level: Level) -> Result<&Vec<Value>, ApiError> {
        let cell = self
            .lists
            .get(&level)
            .ok_or_else(|| ApiError::InvalidRequest(format!("no list for {level:?}")))?;
        cell.get_or_try_init(|| self.api.list(level.children_endpoint())).await
    }

    /// Children of `parent_id` at `level`, in backend order.
    pub async fn load_children(&self, parent_id: i64, level: Level) -> Result<Vec<Value>, ApiError> {
        let all = self.level_list(level).await?;
        Ok(all
            .iter()
            .filter(|child| id_of(child, level.parent_field()) == Some(parent_id))
            .cloned()
            .collect())
    }

    /// Backend percentage for each child, keyed by child id.
    ///
    /// Requests run concurrently. A failing child is logged and counts as 0;
    /// children without an id are skipped.
    pub async fn compute_percentages(
        &self,
        children: &[Value],
        variant: PercentageVariant,
    ) -> HashMap<i64, Percentage> {
        let requests = children.iter().filter_map(|c| id_of(c, "id")).map(|id| async move {
            match self.api.structure_percentage(id, variant).await {
                Ok(p) => (id, p),
                Err(e) => {
                    log::warn!("Percentage {} for id {id} failed: {e}", variant.path_segment());
                    (id, Percentage::ZERO)
                }
            }
        });
        join_all(requests).await.into_iter().collect()
    }

    /// Share of activity rows whose report result is the completion result.
    ///
    /// Works on the raw rows so that every row the table shows is counted.
    pub fn local_completion(activities: &[Value], rule: &CompletionRule) -> Percentage {
        if activities.is_empty() {
            return Percentage::ZERO;
        }
        let done = activities
            .iter()
            .filter(|a| activity_result(a).is_some_and(|r| rule.is_complete(r)))
            .count();
        Percentage::new(done as f64 * 100.0 / activities.len() as f64)
    }

    /// Save the report of an activity and roll progress up to its structure.
    ///
    /// Only the report write itself can fail the call; the follow-up status
    /// update, percentage check, and promotion are logged and skipped on error.
    pub async fn submit_report(
        &self,
        activity_id: i64,
        input: &ReportInput,
    ) -> Result<ReportOutcome, ApiError> {
        let activity: ActividadEstructura = self.api.get_as(Level::Activities.children_endpoint(), activity_id).await?;

        let payload = json!({
            "descripcion": input.descripcion,
            "id_interventor": input.id_interventor,
            "id_residente": input.id_residente,
            "id_contratista": input.id_contratista,
            "id_resultado": input.id_resultado,
            "id_actividad": activity_id,
        });

        let (response, created) = match activity.id_reporte {
            Some(existing) => (self.api.update(REPORT_ENDPOINT, existing, &payload).await?, false),
            None => (self.api.create(REPORT_ENDPOINT, &payload).await?, true),
        };
        let report_id = id_of(&response, "id").or(activity.id_reporte);
        log::info!(
            "Report {} for activity {activity_id} (report id {report_id:?})",
            if created { "created" } else { "updated" }
        );

        match report_id {
            Some(rid) => {
                if let Err(e) = self.api.update_activity_status_from_report(rid).await {
                    log::warn!("Activity status update for report {rid} failed: {e}");
                }
            }
            None => log::warn!("Report for activity {activity_id} came back without an id"),
        }

        let mut outcome = ReportOutcome {
            structure_id: activity.id_estructura,
            report_id,
            created,
            status: ActivityStatus::from_result(activity.result_id(), &self.rule)
                .on_report(input.id_resultado, &self.rule),
            structure_percentage: None,
            promoted: false,
        };
        if self.rule.is_complete(input.id_resultado) {
            self.roll_up(activity.id_estructura, &mut outcome).await;
        }
        Ok(outcome)
    }

    async fn roll_up(&self, structure_id: i64, outcome: &mut ReportOutcome) {
        let pct = match self.api.structure_percentage(structure_id, PercentageVariant::Activities).await {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Percentage for structure {structure_id} failed: {e}");
                return;
            }
        };
        outcome.structure_percentage = Some(pct);
        if !pct.is_full() {
            return;
        }

        let status = match self.api.get(STRUCTURE_ENDPOINT, structure_id).await {
            Ok(s) => id_of(&s, "id_estado"),
            Err(e) => {
                log::warn!("Could not read structure {structure_id}: {e}");
                return;
            }
        };
        if self.rule.is_completed_status(status) {
            return;
        }
        match self.api.promote_structure(structure_id, self.rule.completed_status_id).await {
            Ok(_) => {
                log::info!("Structure {structure_id} promoted to status {}", self.rule.completed_status_id);
                outcome.promoted = true;
            }
            Err(e) => log::error!("Promoting structure {structure_id} failed: {e}"),
        }
    }
}
