use crate::error::{Result, SemaforoError};
use crate::types::answer::{AnswerDetail, SubmissionMeta};
use crate::types::survey::{OptionId, Question, QuestionId, QuestionKind, Survey};
use crate::visibility::{SelectionEvent, VisibilityState};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Current answer to one question while the form is being filled. Changing an
/// answer replaces the value wholesale; detail rows are re-materialized from
/// scratch on every scoring or submission pass.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAnswer {
    Opcion(OptionId),
    Opciones(Vec<OptionId>),
    Numero(f64),
    Texto(String),
    Fecha(NaiveDate),
}

/// In-memory answers for one survey-fill session.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    answers: HashMap<QuestionId, FormAnswer>,
}

impl FormState {
    pub fn answer(&self, id: QuestionId) -> Option<&FormAnswer> {
        self.answers.get(&id)
    }

    pub fn select_single(&mut self, id_pregunta: QuestionId, id_opcion: OptionId) {
        self.answers
            .insert(id_pregunta, FormAnswer::Opcion(id_opcion));
    }

    pub fn set_numero(&mut self, id_pregunta: QuestionId, valor: f64) {
        self.answers.insert(id_pregunta, FormAnswer::Numero(valor));
    }

    pub fn set_texto(&mut self, id_pregunta: QuestionId, valor: String) {
        self.answers.insert(id_pregunta, FormAnswer::Texto(valor));
    }

    pub fn set_fecha(&mut self, id_pregunta: QuestionId, valor: NaiveDate) {
        self.answers.insert(id_pregunta, FormAnswer::Fecha(valor));
    }

    /// Toggles one option of a multi-choice question, honoring exclusivity:
    /// picking an exclusive option clears every sibling, and picking a plain
    /// option while an exclusive one is active clears the exclusive one
    /// first. Toggling an already-selected option deselects it.
    pub fn toggle_option(&mut self, question: &Question, id_opcion: OptionId) {
        let mut selected = match self.answers.get(&question.id_pregunta) {
            Some(FormAnswer::Opciones(ids)) => ids.clone(),
            _ => Vec::new(),
        };

        if let Some(pos) = selected.iter().position(|id| *id == id_opcion) {
            selected.remove(pos);
        } else {
            let is_exclusive = |id: OptionId| {
                question
                    .option(id)
                    .map(|opt| opt.excluyente)
                    .unwrap_or(false)
            };
            if is_exclusive(id_opcion) {
                selected.clear();
            } else {
                selected.retain(|id| !is_exclusive(*id));
            }
            selected.push(id_opcion);
        }

        self.answers
            .insert(question.id_pregunta, FormAnswer::Opciones(selected));
    }

    /// Replays the single-choice and yes/no answers through the resolver in
    /// question order, producing the visibility set this form implies.
    pub fn resolve_visibility(&self, survey: &Survey) -> VisibilityState {
        let mut state = VisibilityState::new(survey);
        for question in &survey.preguntas {
            if let Some(FormAnswer::Opcion(id_opcion)) = self.answers.get(&question.id_pregunta) {
                state = state.apply(
                    survey,
                    SelectionEvent {
                        id_pregunta: question.id_pregunta,
                        id_opcion: *id_opcion,
                    },
                );
            }
        }
        state
    }

    /// Required, eligible questions with no usable answer.
    pub fn missing_required(
        &self,
        survey: &Survey,
        visibility: &VisibilityState,
    ) -> Vec<QuestionId> {
        survey
            .preguntas
            .iter()
            .filter(|q| q.requerida && visibility.is_eligible(q.id_pregunta))
            .filter(|q| !self.has_answer(q.id_pregunta))
            .map(|q| q.id_pregunta)
            .collect()
    }

    fn has_answer(&self, id: QuestionId) -> bool {
        match self.answers.get(&id) {
            None => false,
            Some(FormAnswer::Opciones(ids)) => !ids.is_empty(),
            Some(FormAnswer::Texto(texto)) => !texto.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Materializes the current answers into detail rows: one row per
    /// selected option for multi-choice (in the question's option order),
    /// exactly one row otherwise. Point weights come from the definition;
    /// value-typed answers carry zero points and score under the fixed-10
    /// policy.
    pub fn details(&self, survey: &Survey) -> Vec<AnswerDetail> {
        let mut rows = Vec::new();
        for question in &survey.preguntas {
            let Some(answer) = self.answers.get(&question.id_pregunta) else {
                continue;
            };
            match answer {
                FormAnswer::Opcion(id_opcion) => {
                    rows.push(option_row(question, *id_opcion));
                }
                FormAnswer::Opciones(ids) => {
                    for option in &question.opciones {
                        if ids.contains(&option.id_opcion) {
                            rows.push(option_row(question, option.id_opcion));
                        }
                    }
                }
                FormAnswer::Numero(_) | FormAnswer::Texto(_) | FormAnswer::Fecha(_) => {
                    rows.push(AnswerDetail {
                        id_pregunta: question.id_pregunta,
                        id_opcion: None,
                        puntos: 0.0,
                        tipo: question.tipo,
                        categoria: question.categoria_nombre.clone(),
                        id_categoria: question.id_categoria_pregunta,
                    });
                }
            }
        }
        rows
    }
}

fn option_row(question: &Question, id_opcion: OptionId) -> AnswerDetail {
    let puntos = question
        .option(id_opcion)
        .map(|opt| opt.puntos)
        .unwrap_or(0.0);
    AnswerDetail {
        id_pregunta: question.id_pregunta,
        id_opcion: Some(id_opcion),
        puntos,
        tipo: question.tipo,
        categoria: question.categoria_nombre.clone(),
        id_categoria: question.id_categoria_pregunta,
    }
}

/// A filled ballot as read from disk: interview header plus raw answers keyed
/// by question id.
#[derive(Debug, Clone, Deserialize)]
pub struct BallotFile {
    #[serde(flatten)]
    pub meta: SubmissionMeta,
    #[serde(default)]
    pub respuestas: BTreeMap<String, BallotValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BallotValue {
    Numero(f64),
    Texto(String),
    Opciones(Vec<OptionId>),
}

impl FormState {
    /// Interprets raw ballot values against the survey definition. Keys that
    /// match no question are skipped with a warning; values of the wrong
    /// shape for their question type are rejected.
    pub fn from_ballot(survey: &Survey, ballot: &BallotFile) -> Result<FormState> {
        let mut form = FormState::default();
        for (key, value) in &ballot.respuestas {
            let Ok(id_pregunta) = key.parse::<QuestionId>() else {
                return Err(SemaforoError::InvalidBallot(format!(
                    "respuestas key is not a question id: {key}"
                )));
            };
            let Some(question) = survey.question(id_pregunta) else {
                warn!(id_pregunta, "ballot answers a question not in the survey");
                continue;
            };
            apply_ballot_value(&mut form, question, value)?;
        }
        Ok(form)
    }
}

fn apply_ballot_value(form: &mut FormState, question: &Question, value: &BallotValue) -> Result<()> {
    let mismatch = || {
        SemaforoError::InvalidBallot(format!(
            "question {} ({:?}) got an incompatible value",
            question.id_pregunta, question.tipo
        ))
    };
    match question.tipo {
        QuestionKind::SeleccionUnica | QuestionKind::SiNo => match value {
            BallotValue::Numero(n) => {
                form.select_single(question.id_pregunta, *n as OptionId);
                Ok(())
            }
            BallotValue::Texto(s) => {
                let id = s.trim().parse::<OptionId>().map_err(|_| mismatch())?;
                form.select_single(question.id_pregunta, id);
                Ok(())
            }
            BallotValue::Opciones(_) => Err(mismatch()),
        },
        QuestionKind::SeleccionMultiple => match value {
            BallotValue::Opciones(ids) => {
                // Applied through the toggle path so exclusivity holds even
                // for hand-edited ballots.
                for id in ids {
                    form.toggle_option(question, *id);
                }
                Ok(())
            }
            BallotValue::Numero(n) => {
                form.toggle_option(question, *n as OptionId);
                Ok(())
            }
            BallotValue::Texto(_) => Err(mismatch()),
        },
        QuestionKind::Numerica => match value {
            BallotValue::Numero(n) => {
                form.set_numero(question.id_pregunta, *n);
                Ok(())
            }
            _ => Err(mismatch()),
        },
        QuestionKind::Fecha => match value {
            BallotValue::Texto(s) => {
                let fecha = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map_err(|_| mismatch())?;
                form.set_fecha(question.id_pregunta, fecha);
                Ok(())
            }
            _ => Err(mismatch()),
        },
        QuestionKind::Texto | QuestionKind::Catalogo | QuestionKind::Desconocido => match value {
            BallotValue::Texto(s) => {
                form.set_texto(question.id_pregunta, s.clone());
                Ok(())
            }
            BallotValue::Numero(n) => {
                form.set_texto(question.id_pregunta, n.to_string());
                Ok(())
            }
            BallotValue::Opciones(_) => Err(mismatch()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi_question() -> Question {
        serde_json::from_str(
            r#"
            {
              "id_pregunta": 1,
              "texto": "¿Qué fuentes de agua usa?",
              "tipo": "seleccion_multiple",
              "categoria_nombre": "Agua",
              "opciones": [
                { "id_opcion": 10, "etiqueta": "Pozo", "puntos": 2 },
                { "id_opcion": 11, "etiqueta": "Chorro", "puntos": 3 },
                { "id_opcion": 12, "etiqueta": "Ninguna", "excluyente": true, "puntos": 0 }
              ]
            }
            "#,
        )
        .expect("question should parse")
    }

    fn survey_with(question: Question) -> Survey {
        Survey {
            id_encuesta: None,
            titulo: None,
            preguntas: vec![question],
        }
    }

    #[test]
    fn exclusive_option_clears_siblings_and_is_cleared_back() {
        let question = multi_question();
        let mut form = FormState::default();

        form.toggle_option(&question, 10);
        form.toggle_option(&question, 12);
        assert_eq!(
            form.answer(1),
            Some(&FormAnswer::Opciones(vec![12])),
            "exclusive selection should clear prior picks"
        );

        form.toggle_option(&question, 11);
        assert_eq!(
            form.answer(1),
            Some(&FormAnswer::Opciones(vec![11])),
            "plain selection should clear the active exclusive pick"
        );
    }

    #[test]
    fn toggling_twice_deselects() {
        let question = multi_question();
        let mut form = FormState::default();
        form.toggle_option(&question, 10);
        form.toggle_option(&question, 10);
        assert_eq!(form.answer(1), Some(&FormAnswer::Opciones(vec![])));
    }

    #[test]
    fn details_emit_one_row_per_selected_option_with_weights() {
        let question = multi_question();
        let survey = survey_with(question.clone());
        let mut form = FormState::default();
        form.toggle_option(&question, 11);
        form.toggle_option(&question, 10);

        let rows = form.details(&survey);
        assert_eq!(rows.len(), 2);
        // Question option order, not selection order.
        assert_eq!(rows[0].id_opcion, Some(10));
        assert_eq!(rows[0].puntos, 2.0);
        assert_eq!(rows[1].id_opcion, Some(11));
        assert_eq!(rows[1].puntos, 3.0);
        assert_eq!(rows[0].categoria.as_deref(), Some("Agua"));
    }

    #[test]
    fn value_typed_answers_materialize_zero_point_rows() {
        let question: Question = serde_json::from_str(
            r#"{ "id_pregunta": 5, "texto": "¿Cuántas personas?", "tipo": "numerica" }"#,
        )
        .expect("question should parse");
        let survey = survey_with(question);
        let mut form = FormState::default();
        form.set_numero(5, 7.0);

        let rows = form.details(&survey);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id_opcion, None);
        assert_eq!(rows[0].puntos, 0.0);
    }

    #[test]
    fn missing_required_skips_hidden_questions() {
        let survey: Survey = serde_json::from_str(
            r#"
            {
              "preguntas": [
                {
                  "id_pregunta": 1, "texto": "p1", "tipo": "si_no", "requerida": true,
                  "opciones": [
                    { "id_opcion": 10, "etiqueta": "Sí",
                      "condicional": true, "condicional_pregunta_id": 2 },
                    { "id_opcion": 11, "etiqueta": "No" }
                  ]
                },
                { "id_pregunta": 2, "texto": "p2", "tipo": "texto", "requerida": true }
              ]
            }
            "#,
        )
        .expect("survey should parse");

        let mut form = FormState::default();
        form.select_single(1, 11);
        let visibility = form.resolve_visibility(&survey);
        assert_eq!(form.missing_required(&survey, &visibility), Vec::<i64>::new());

        let mut form = FormState::default();
        form.select_single(1, 10);
        let visibility = form.resolve_visibility(&survey);
        assert_eq!(form.missing_required(&survey, &visibility), vec![2]);
    }

    #[test]
    fn blank_text_counts_as_unanswered() {
        let survey: Survey = serde_json::from_str(
            r#"{ "preguntas": [
                  { "id_pregunta": 1, "texto": "p", "tipo": "texto", "requerida": true }
                ] }"#,
        )
        .expect("survey should parse");
        let mut form = FormState::default();
        form.set_texto(1, "   ".to_string());
        let visibility = form.resolve_visibility(&survey);
        assert_eq!(form.missing_required(&survey, &visibility), vec![1]);
    }

    #[test]
    fn ballot_values_are_interpreted_by_question_type() {
        let survey: Survey = serde_json::from_str(
            r#"
            {
              "preguntas": [
                { "id_pregunta": 1, "texto": "p1", "tipo": "si_no",
                  "opciones": [
                    { "id_opcion": 10, "etiqueta": "Sí" },
                    { "id_opcion": 11, "etiqueta": "No" }
                  ] },
                { "id_pregunta": 2, "texto": "p2", "tipo": "numerica" },
                { "id_pregunta": 3, "texto": "p3", "tipo": "fecha" }
              ]
            }
            "#,
        )
        .expect("survey should parse");
        let ballot: BallotFile = serde_json::from_str(
            r#"
            {
              "boleta_num": "B-001",
              "id_encuesta": 1,
              "id_comunidad": 4,
              "nombre_encuestada": "María",
              "fecha_entrevista": "2026-08-01",
              "respuestas": {
                "1": 10,
                "2": 6.5,
                "3": "2026-07-30"
              }
            }
            "#,
        )
        .expect("ballot should parse");

        let form = FormState::from_ballot(&survey, &ballot).expect("ballot should apply");
        assert_eq!(form.answer(1), Some(&FormAnswer::Opcion(10)));
        assert_eq!(form.answer(2), Some(&FormAnswer::Numero(6.5)));
        assert!(matches!(form.answer(3), Some(FormAnswer::Fecha(_))));
    }

    #[test]
    fn ballot_rejects_incompatible_value_shape() {
        let survey: Survey = serde_json::from_str(
            r#"{ "preguntas": [ { "id_pregunta": 2, "texto": "p", "tipo": "numerica" } ] }"#,
        )
        .expect("survey should parse");
        let ballot: BallotFile = serde_json::from_str(
            r#"
            {
              "boleta_num": "B-001",
              "id_encuesta": 1,
              "id_comunidad": 4,
              "nombre_encuestada": "María",
              "fecha_entrevista": "2026-08-01",
              "respuestas": { "2": "siete" }
            }
            "#,
        )
        .expect("ballot should parse");
        let err = FormState::from_ballot(&survey, &ballot).expect_err("should reject");
        assert!(err.to_string().contains("incompatible"));
    }
}
