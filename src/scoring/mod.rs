pub mod classify;

use crate::types::answer::AnswerDetail;
use crate::types::report::{CategoryScore, QuestionScore, ScoreReport, Semaforo};
use crate::types::survey::{QuestionId, QuestionKind};
use classify::classify;
use std::collections::{HashMap, HashSet};

/// Maximum score a single question can reach on the 0-10 scale.
pub const ESCALA: f64 = 10.0;

/// Aggregated result for one question within a scored response.
#[derive(Debug, Clone)]
pub struct ScoredQuestion {
    pub id_pregunta: QuestionId,
    pub tipo: QuestionKind,
    pub categoria: Option<String>,
    pub id_categoria: Option<i64>,
    pub puntos_total: f64,
    pub puntos_maximos: f64,
    pub promedio: f64,
    pub color: Semaforo,
    pub total_respuestas: usize,
}

/// Scored view of one full set of answer detail rows.
#[derive(Debug, Clone)]
pub struct ScoredResponse {
    pub preguntas: Vec<ScoredQuestion>,
    pub promedio: f64,
    pub color: Semaforo,
}

/// Maximum attainable points for one question, derived from the rows in the
/// dataset being scored rather than from the full option catalog.
///
/// Single-choice and yes/no take the highest weight seen; multi-choice sums
/// the weights of distinct options (first occurrence wins on duplicates).
/// Everything else, including unknown type tags, scores against a fixed 10.
/// The result is floored at 1 so a division by zero cannot occur.
pub fn max_attainable_points(rows: &[&AnswerDetail], tipo: QuestionKind) -> f64 {
    let max = match tipo {
        QuestionKind::SeleccionUnica | QuestionKind::SiNo => {
            rows.iter().map(|row| row.puntos).fold(0.0, f64::max)
        }
        QuestionKind::SeleccionMultiple => {
            let mut seen: HashSet<Option<i64>> = HashSet::new();
            let mut total = 0.0;
            for row in rows {
                if seen.insert(row.id_opcion) {
                    total += row.puntos;
                }
            }
            total
        }
        _ => ESCALA,
    };
    max.max(1.0)
}

/// Groups rows by question id, preserving first-appearance order so that
/// summation order (and therefore the floating-point result) is reproducible
/// for any fixed input order.
fn group_by_question(details: &[AnswerDetail]) -> Vec<(QuestionId, Vec<&AnswerDetail>)> {
    let mut index: HashMap<QuestionId, usize> = HashMap::new();
    let mut groups: Vec<(QuestionId, Vec<&AnswerDetail>)> = Vec::new();
    for row in details {
        match index.get(&row.id_pregunta) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                index.insert(row.id_pregunta, groups.len());
                groups.push((row.id_pregunta, vec![row]));
            }
        }
    }
    groups
}

fn score_group(id_pregunta: QuestionId, rows: &[&AnswerDetail]) -> ScoredQuestion {
    let first = rows[0];
    let puntos_total: f64 = rows.iter().map(|row| row.puntos).sum();
    let puntos_maximos = max_attainable_points(rows, first.tipo);
    let promedio = (puntos_total / puntos_maximos * ESCALA).clamp(0.0, ESCALA);
    ScoredQuestion {
        id_pregunta,
        tipo: first.tipo,
        categoria: first.categoria.clone(),
        id_categoria: first.id_categoria,
        puntos_total,
        puntos_maximos,
        promedio,
        color: classify(promedio),
        total_respuestas: rows.len(),
    }
}

/// Scores a flat array of detail rows: one 0-10 score per distinct question,
/// averaged into the response score. Empty input yields average 0 and Rojo,
/// never an error. Pure and replayable: re-fetched rows score identically to
/// freshly entered ones.
pub fn score_response(details: &[AnswerDetail]) -> ScoredResponse {
    let preguntas: Vec<ScoredQuestion> = group_by_question(details)
        .into_iter()
        .map(|(id, rows)| score_group(id, &rows))
        .collect();

    let promedio = if preguntas.is_empty() {
        0.0
    } else {
        preguntas.iter().map(|q| q.promedio).sum::<f64>() / preguntas.len() as f64
    };

    ScoredResponse {
        promedio,
        color: classify(promedio),
        preguntas,
    }
}

/// Average restricted to rows whose category display name matches. Category
/// identity by display string is the wire contract for fetched rows; the full
/// report additionally keys on the category id when one is present.
pub fn score_category(details: &[AnswerDetail], categoria: &str) -> f64 {
    let filtered: Vec<AnswerDetail> = details
        .iter()
        .filter(|row| row.categoria.as_deref() == Some(categoria))
        .cloned()
        .collect();
    score_response(&filtered).promedio
}

pub fn round_to(value: f64, decimales: u32) -> f64 {
    let factor = 10f64.powi(decimales as i32);
    (value * factor).round() / factor
}

/// Builds the report shapes consumed by export collaborators. Colors are
/// classified on the unrounded averages; `promedio` fields are rounded for
/// display only.
pub fn build_report(details: &[AnswerDetail], decimales: u32) -> ScoreReport {
    let scored = score_response(details);

    let preguntas: Vec<QuestionScore> = scored
        .preguntas
        .iter()
        .map(|q| QuestionScore {
            pregunta: q.id_pregunta,
            categoria: q.categoria.clone(),
            tipo: q.tipo,
            promedio: round_to(q.promedio, decimales),
            color_semaforo: q.color,
            total_respuestas: q.total_respuestas,
        })
        .collect();

    // Category grouping keys on (id, nombre) so two categories that share a
    // display name but differ in id stay distinct. Questions with neither are
    // left out of the category table.
    let mut cat_index: HashMap<(Option<i64>, String), usize> = HashMap::new();
    let mut cat_groups: Vec<(String, Vec<&ScoredQuestion>)> = Vec::new();
    for q in &scored.preguntas {
        let nombre = match (&q.categoria, q.id_categoria) {
            (Some(nombre), _) => nombre.clone(),
            (None, Some(id)) => format!("categoria_{id}"),
            (None, None) => continue,
        };
        let key = (q.id_categoria, nombre.clone());
        match cat_index.get(&key) {
            Some(&slot) => cat_groups[slot].1.push(q),
            None => {
                cat_index.insert(key, cat_groups.len());
                cat_groups.push((nombre, vec![q]));
            }
        }
    }

    let categorias: Vec<CategoryScore> = cat_groups
        .into_iter()
        .map(|(nombre, group)| {
            let promedio =
                group.iter().map(|q| q.promedio).sum::<f64>() / group.len() as f64;
            CategoryScore {
                categoria: nombre,
                promedio: round_to(promedio, decimales),
                color_semaforo: classify(promedio),
                total_respuestas: group.iter().map(|q| q.total_respuestas).sum(),
            }
        })
        .collect();

    ScoreReport {
        promedio_respuesta: round_to(scored.promedio, decimales),
        color_semaforo: scored.color,
        preguntas,
        categorias,
    }
}
