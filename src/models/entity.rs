use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    fn into_id(self) -> Result<Option<i64>, String> {
        match self {
            RawId::Int(n) => Ok(Some(n)),
            RawId::Float(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
            RawId::Float(f) => Err(format!("invalid id {f}")),
            RawId::Text(s) if s.trim().is_empty() => Ok(None),
            RawId::Text(s) => s.trim().parse().map(Some).map_err(|_| format!("invalid id {s:?}")),
        }
    }
}

/// Ids arrive as numbers or numeric strings depending on the endpoint.
fn id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    RawId::deserialize(d)?
        .into_id()
        .map_err(serde::de::Error::custom)?
        .ok_or_else(|| serde::de::Error::custom("missing id"))
}

fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<RawId>::deserialize(d)? {
        Some(raw) => raw.into_id().map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Embedded `{ "nombre": ... }` reference the backend joins into list rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub nombre: Option<String>,
}

impl NamedRef {
    pub fn name_or<'a>(r: &'a Option<NamedRef>, fallback: &'a str) -> &'a str {
        r.as_ref().and_then(|n| n.nombre.as_deref()).unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proyecto {
    #[serde(deserialize_with = "id")]
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_ciudad: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_estado: Option<i64>,
    #[serde(default)]
    pub ciudad: Option<NamedRef>,
    #[serde(default)]
    pub estado: Option<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conjunto {
    #[serde(deserialize_with = "id")]
    pub id: i64,
    pub nombre: String,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_residente_encargado: Option<i64>,
    #[serde(deserialize_with = "id")]
    pub id_proyecto: i64,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_tipo_vivienda: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_estado: Option<i64>,
    #[serde(default)]
    pub residente_encargado: Option<NamedRef>,
    #[serde(default)]
    pub tipo_vivienda: Option<NamedRef>,
    #[serde(default)]
    pub estado: Option<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estructura {
    #[serde(deserialize_with = "id")]
    pub id: i64,
    pub nombre: String,
    #[serde(deserialize_with = "id")]
    pub id_conjunto: i64,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_tipo_estructura: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_estado: Option<i64>,
    #[serde(default)]
    pub tipo_estructura: Option<NamedRef>,
    #[serde(default)]
    pub estado: Option<NamedRef>,
}

/// Report as embedded in an activity row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReporteResumen {
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub interventor: Option<NamedRef>,
    #[serde(default)]
    pub residente: Option<NamedRef>,
    #[serde(default)]
    pub contratista: Option<NamedRef>,
    #[serde(default)]
    pub resultado: Option<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActividadEstructura {
    #[serde(deserialize_with = "id")]
    pub id: i64,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_actividad: Option<i64>,
    #[serde(deserialize_with = "id")]
    pub id_estructura: i64,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub fecha_fin: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_reporte: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_estado: Option<i64>,
    #[serde(default)]
    pub actividad: Option<NamedRef>,
    #[serde(default)]
    pub estado: Option<NamedRef>,
    #[serde(default)]
    pub reporte: Option<ReporteResumen>,
}

impl ActividadEstructura {
    /// Result id of the attached report, if any.
    pub fn result_id(&self) -> Option<i64> {
        self.reporte.as_ref()?.resultado.as_ref()?.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reporte {
    #[serde(deserialize_with = "id")]
    pub id: i64,
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Older reports store the text here.
    #[serde(default)]
    pub descripcion_reporte: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_interventor: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_residente: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_contratista: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub id_resultado: Option<i64>,
}

impl Reporte {
    /// Form value of one report field; unset fields are blank.
    pub fn field(&self, name: &str) -> String {
        let id = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
        match name {
            "descripcion" => self
                .descripcion
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .or(self.descripcion_reporte.as_deref())
                .unwrap_or_default()
                .to_string(),
            "id_interventor" => id(self.id_interventor),
            "id_residente" => id(self.id_residente),
            "id_contratista" => id(self.id_contratista),
            "id_resultado" => id(self.id_resultado),
            _ => String::new(),
        }
    }
}

/// Numeric role ids the person catalog uses to tell report signatories apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonRole {
    Contratista = 1,
    Interventor = 2,
    Residente = 3,
}

impl PersonRole {
    pub fn id(self) -> i64 {
        self as i64
    }
}

/// Body of a report create/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInput {
    pub descripcion: String,
    #[serde(deserialize_with = "id")]
    pub id_interventor: i64,
    #[serde(deserialize_with = "id")]
    pub id_residente: i64,
    #[serde(deserialize_with = "id")]
    pub id_contratista: i64,
    #[serde(deserialize_with = "id")]
    pub id_resultado: i64,
}

/// Answer of the national-id login lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "id")]
    pub id_rol: i64,
    #[serde(default)]
    pub nombre: Option<String>,
}
