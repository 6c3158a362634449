use actix_session::Session;
use serde::{Deserialize, Serialize};

const SESSION_KEY: &str = "drill_focus";

/// The one parent open at each level of the drill-down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillFocus {
    pub project: Option<i64>,
    pub conjunto: Option<i64>,
    pub structure: Option<i64>,
}

impl DrillFocus {
    /// Open a project. Deeper levels close.
    pub fn focus_project(&mut self, id: i64) {
        if self.project != Some(id) {
            self.conjunto = None;
            self.structure = None;
        }
        self.project = Some(id);
    }

    pub fn focus_conjunto(&mut self, project: Option<i64>, id: i64) {
        if let Some(p) = project {
            self.focus_project(p);
        }
        if self.conjunto != Some(id) {
            self.structure = None;
        }
        self.conjunto = Some(id);
    }

    /// Open a structure. Moving to another conjunto also closes the open
    /// project, whose id a structure does not carry.
    pub fn focus_structure(&mut self, conjunto: Option<i64>, id: i64) {
        if let Some(c) = conjunto {
            if self.conjunto != Some(c) {
                self.project = None;
            }
            self.focus_conjunto(None, c);
        }
        self.structure = Some(id);
    }

    /// Deepest open page, used to send the user back after a report.
    pub fn return_path(&self) -> String {
        match (self.project, self.conjunto, self.structure) {
            (_, _, Some(s)) => format!("/estructuras/{s}/actividades"),
            (_, Some(c), None) => format!("/conjuntos/{c}/estructuras"),
            (Some(p), None, None) => format!("/proyectos/{p}/conjuntos"),
            _ => "/proyectos".to_string(),
        }
    }

    pub fn load(session: &Session) -> Self {
        session.get::<DrillFocus>(SESSION_KEY).ok().flatten().unwrap_or_default()
    }

    pub fn save(&self, session: &Session) {
        if let Err(e) = session.insert(SESSION_KEY, self) {
            log::warn!("Failed to store drill focus: {e}");
        }
    }
}
