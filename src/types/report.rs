use crate::types::survey::QuestionKind;
use serde::Serialize;

/// Three-band traffic-light indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Semaforo {
    Verde,
    Naranja,
    Rojo,
}

impl Semaforo {
    pub fn label(self) -> &'static str {
        match self {
            Semaforo::Verde => "verde",
            Semaforo::Naranja => "naranja",
            Semaforo::Rojo => "rojo",
        }
    }
}

/// Per-question score row, shaped for the report/export consumers.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionScore {
    pub pregunta: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    pub tipo: QuestionKind,
    pub promedio: f64,
    pub color_semaforo: Semaforo,
    pub total_respuestas: usize,
}

/// Per-category aggregate row.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryScore {
    pub categoria: String,
    pub promedio: f64,
    pub color_semaforo: Semaforo,
    pub total_respuestas: usize,
}

/// Full scoring report over one set of answer detail rows.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub promedio_respuesta: f64,
    pub color_semaforo: Semaforo,
    pub preguntas: Vec<QuestionScore>,
    pub categorias: Vec<CategoryScore>,
}

/// One data-quality finding over a survey definition.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub body: String,
    pub blocking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pregunta: Option<i64>,
}
