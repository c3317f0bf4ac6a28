use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type QuestionId = i64;
pub type OptionId = i64;

/// Wire shape of a survey definition as served by the administration API:
/// `{ "preguntas": [ ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Survey {
    #[serde(default)]
    pub id_encuesta: Option<i64>,
    #[serde(default)]
    pub titulo: Option<String>,
    pub preguntas: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id_pregunta: QuestionId,
    pub texto: String,
    pub tipo: QuestionKind,
    #[serde(default)]
    pub requerida: bool,
    #[serde(default)]
    pub id_categoria_pregunta: Option<i64>,
    #[serde(default)]
    pub categoria_nombre: Option<String>,
    #[serde(default)]
    pub opciones: Vec<Choice>,
}

/// An answer option. `puntos` defaults to 1 so an unweighted catalog still
/// scores. `condicional_pregunta_id` names the question this option reveals
/// when selected.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub id_opcion: OptionId,
    pub etiqueta: String,
    #[serde(default)]
    pub valor: Option<String>,
    #[serde(default = "default_puntos")]
    pub puntos: f64,
    #[serde(default)]
    pub excluyente: bool,
    #[serde(default)]
    pub condicional: bool,
    #[serde(default)]
    pub condicional_pregunta_id: Option<QuestionId>,
}

fn default_puntos() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SeleccionUnica,
    SeleccionMultiple,
    SiNo,
    Numerica,
    Texto,
    Fecha,
    Catalogo,
    /// Unrecognized type tags score under the generic fixed-10 policy
    /// instead of failing deserialization.
    #[serde(other)]
    Desconocido,
}

impl QuestionKind {
    pub fn has_options(self) -> bool {
        matches!(
            self,
            QuestionKind::SeleccionUnica | QuestionKind::SeleccionMultiple | QuestionKind::SiNo
        )
    }

    /// Only single-choice and yes/no selections drive conditional visibility.
    pub fn drives_visibility(self) -> bool {
        matches!(self, QuestionKind::SeleccionUnica | QuestionKind::SiNo)
    }
}

impl Survey {
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.preguntas.iter().find(|q| q.id_pregunta == id)
    }

    /// Ids of every question named as a conditional target by at least one
    /// option anywhere in the survey. These questions start hidden.
    pub fn conditional_targets(&self) -> BTreeSet<QuestionId> {
        self.preguntas
            .iter()
            .flat_map(|q| &q.opciones)
            .filter(|o| o.condicional)
            .filter_map(|o| o.condicional_pregunta_id)
            .collect()
    }
}

impl Question {
    pub fn option(&self, id: OptionId) -> Option<&Choice> {
        self.opciones.iter().find(|o| o.id_opcion == id)
    }
}

/// Strips the `**bold**` markup directive question texts may carry, for
/// plain-text contexts. Markdown output passes the text through untouched.
pub fn strip_bold_markup(texto: &str) -> String {
    texto.replace("**", "")
}
