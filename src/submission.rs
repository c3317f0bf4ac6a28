use crate::error::{Result, SemaforoError};
use crate::form::{BallotFile, FormAnswer, FormState};
use crate::types::answer::{RespuestaEntry, SubmissionPayload};
use crate::types::survey::{Question, Survey};
use chrono::NaiveDate;

/// Builds the submission payload for one filled ballot.
///
/// Selections are replayed through the visibility resolver first; only
/// eligible questions contribute `respuestas` entries, and required eligible
/// questions must all be answered. The interview date must be an ISO
/// calendar date.
pub fn build_payload(survey: &Survey, ballot: &BallotFile) -> Result<SubmissionPayload> {
    if NaiveDate::parse_from_str(ballot.meta.fecha_entrevista.trim(), "%Y-%m-%d").is_err() {
        return Err(SemaforoError::InvalidBallot(format!(
            "fecha_entrevista is not an ISO date: {}",
            ballot.meta.fecha_entrevista
        )));
    }

    let form = FormState::from_ballot(survey, ballot)?;
    let visibility = form.resolve_visibility(survey);

    let missing = form.missing_required(survey, &visibility);
    if !missing.is_empty() {
        let ids: Vec<String> = missing.iter().map(i64::to_string).collect();
        return Err(SemaforoError::InvalidBallot(format!(
            "required questions unanswered: {}",
            ids.join(", ")
        )));
    }

    let mut respuestas = Vec::new();
    for question in &survey.preguntas {
        if !visibility.is_eligible(question.id_pregunta) {
            continue;
        }
        let Some(answer) = form.answer(question.id_pregunta) else {
            continue;
        };
        match answer {
            FormAnswer::Opcion(id_opcion) => {
                respuestas.push(option_entry(question, *id_opcion));
            }
            FormAnswer::Opciones(ids) => {
                for option in &question.opciones {
                    if ids.contains(&option.id_opcion) {
                        respuestas.push(option_entry(question, option.id_opcion));
                    }
                }
            }
            FormAnswer::Numero(valor) => respuestas.push(RespuestaEntry {
                id_pregunta: question.id_pregunta,
                id_opcion: None,
                valor_numerico: Some(*valor),
                valor_texto: None,
                puntos: 0.0,
                es_no_aplica: false,
            }),
            FormAnswer::Texto(valor) => respuestas.push(RespuestaEntry {
                id_pregunta: question.id_pregunta,
                id_opcion: None,
                valor_numerico: None,
                valor_texto: Some(valor.clone()),
                puntos: 0.0,
                es_no_aplica: false,
            }),
            FormAnswer::Fecha(valor) => respuestas.push(RespuestaEntry {
                id_pregunta: question.id_pregunta,
                id_opcion: None,
                valor_numerico: None,
                valor_texto: Some(valor.format("%Y-%m-%d").to_string()),
                puntos: 0.0,
                es_no_aplica: false,
            }),
        }
    }

    Ok(SubmissionPayload {
        meta: ballot.meta.clone(),
        respuestas,
    })
}

fn option_entry(question: &Question, id_opcion: i64) -> RespuestaEntry {
    let option = question.option(id_opcion);
    RespuestaEntry {
        id_pregunta: question.id_pregunta,
        id_opcion: Some(id_opcion),
        valor_numerico: None,
        valor_texto: None,
        puntos: option.map(|opt| opt.puntos).unwrap_or(0.0),
        // "None of the above" picks are flagged for the analytics side.
        es_no_aplica: option.map(|opt| opt.excluyente).unwrap_or(false),
    }
}
