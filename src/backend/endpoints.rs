use serde_json::{Value, json};

use super::{ApiClient, ApiError};
use crate::models::entity::LoginResponse;
use crate::progress::{Percentage, PercentageVariant};

impl ApiClient {
    /// `GET /estructura/porcentaje{,P,C}/{id}`
    ///
    /// The unsuffixed variant nests the number under
    /// `porcentaje.porcentaje_actividades_completadas`; P and C answer `porcentaje` directly.
    pub async fn structure_percentage(
        &self,
        id: i64,
        variant: PercentageVariant,
    ) -> Result<Percentage, ApiError> {
        let path = format!("estructura/{}/{id}", variant.path_segment());
        let body = self.send_json(self.request(reqwest::Method::GET, &path)).await?;
        let raw = match variant {
            PercentageVariant::Activities => body
                .get("porcentaje")
                .and_then(|p| p.get("porcentaje_actividades_completadas")),
            PercentageVariant::Project | PercentageVariant::Conjunto => body.get("porcentaje"),
        };
        Ok(Percentage::from_json(raw))
    }

    /// `POST /estructura/generar/{id}`: seed the activities of a new structure.
    pub async fn generate_activities(&self, structure_id: i64) -> Result<(), ApiError> {
        let path = format!("estructura/generar/{structure_id}");
        self.send_json(self.request(reqwest::Method::POST, &path)).await?;
        Ok(())
    }

    /// `PUT /estructura/handleUpdateActividadEstructura/{report_id}`: let the
    /// backend move the reported activity to the status implied by its result.
    pub async fn update_activity_status_from_report(&self, report_id: i64) -> Result<(), ApiError> {
        let path = format!("estructura/handleUpdateActividadEstructura/{report_id}");
        self.send_json(self.request(reqwest::Method::PUT, &path)).await?;
        Ok(())
    }

    /// Read the structure, overwrite `id_estado`, and PUT the whole object back.
    pub async fn promote_structure(&self, structure_id: i64, status_id: i64) -> Result<Value, ApiError> {
        let mut current = self.get("estructura", structure_id).await?;
        match current.as_object_mut() {
            Some(map) => {
                map.insert("id_estado".to_string(), json!(status_id));
            }
            None => return Err(ApiError::Shape("estructura is not an object".to_string())),
        }
        self.update("estructura", structure_id, &current).await
    }

    /// `POST /usuario/login` with the national id; answers the role indicator.
    pub async fn login(&self, cedula: &str) -> Result<LoginResponse, ApiError> {
        let req = self
            .request(reqwest::Method::POST, "usuario/login")
            .json(&json!({ "cedula": cedula }));
        let body = self.send_json(req).await?;
        Ok(serde_json::from_value(body)?)
    }
}
