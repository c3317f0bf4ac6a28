use crate::types::survey::{OptionId, QuestionId, QuestionKind};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One answer detail row, either freshly materialized from a form or
/// re-fetched from the persistence API. Multi-choice questions contribute one
/// row per selected option; every other type contributes at most one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub id_pregunta: QuestionId,
    #[serde(default)]
    pub id_opcion: Option<OptionId>,
    /// Missing or non-numeric values coerce to 0 instead of failing.
    #[serde(default, deserialize_with = "coerce_puntos")]
    pub puntos: f64,
    #[serde(default = "unknown_kind", alias = "pregunta_tipo")]
    pub tipo: QuestionKind,
    #[serde(default, alias = "categoria_nombre")]
    pub categoria: Option<String>,
    #[serde(default, alias = "id_categoria_pregunta")]
    pub id_categoria: Option<i64>,
}

fn unknown_kind() -> QuestionKind {
    QuestionKind::Desconocido
}

fn coerce_puntos<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Interview header fields carried alongside the answers in a ballot file
/// and echoed verbatim into the submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionMeta {
    pub boleta_num: String,
    pub id_encuesta: i64,
    pub id_comunidad: i64,
    pub nombre_encuestada: String,
    #[serde(default)]
    pub edad_encuestada: Option<u32>,
    #[serde(default)]
    pub sexo_encuestador: Option<String>,
    pub fecha_entrevista: String,
    #[serde(default)]
    pub vuelta: Option<u32>,
}

/// The payload handed to the external persistence API. Only questions that
/// passed the eligibility check contribute entries to `respuestas`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub meta: SubmissionMeta,
    pub respuestas: Vec<RespuestaEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RespuestaEntry {
    pub id_pregunta: QuestionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_opcion: Option<OptionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_numerico: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_texto: Option<String>,
    pub puntos: f64,
    pub es_no_aplica: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_row_parses_canonical_shape() {
        let row: AnswerDetail = serde_json::from_str(
            r#"{ "id_pregunta": 4, "id_opcion": 40, "puntos": 2.5,
                 "pregunta_tipo": "seleccion_multiple", "categoria_nombre": "Agua" }"#,
        )
        .expect("row should parse");
        assert_eq!(row.puntos, 2.5);
        assert_eq!(row.tipo, QuestionKind::SeleccionMultiple);
        assert_eq!(row.categoria.as_deref(), Some("Agua"));
    }

    #[test]
    fn detail_row_accepts_short_aliases() {
        let row: AnswerDetail = serde_json::from_str(
            r#"{ "id_pregunta": 4, "puntos": 1, "tipo": "si_no", "categoria": "Higiene" }"#,
        )
        .expect("row should parse");
        assert_eq!(row.tipo, QuestionKind::SiNo);
        assert_eq!(row.categoria.as_deref(), Some("Higiene"));
    }

    #[test]
    fn puntos_coerces_missing_null_and_garbage_to_zero() {
        for raw in [
            r#"{ "id_pregunta": 1, "tipo": "si_no" }"#,
            r#"{ "id_pregunta": 1, "tipo": "si_no", "puntos": null }"#,
            r#"{ "id_pregunta": 1, "tipo": "si_no", "puntos": "n/a" }"#,
            r#"{ "id_pregunta": 1, "tipo": "si_no", "puntos": [3] }"#,
        ] {
            let row: AnswerDetail = serde_json::from_str(raw).expect("row should parse");
            assert_eq!(row.puntos, 0.0, "input: {raw}");
        }
    }

    #[test]
    fn puntos_coerces_numeric_strings() {
        let row: AnswerDetail = serde_json::from_str(
            r#"{ "id_pregunta": 1, "tipo": "si_no", "puntos": " 3.5 " }"#,
        )
        .expect("row should parse");
        assert_eq!(row.puntos, 3.5);
    }

    #[test]
    fn respuesta_entry_omits_absent_optionals() {
        let entry = RespuestaEntry {
            id_pregunta: 7,
            id_opcion: None,
            valor_numerico: Some(42.0),
            valor_texto: None,
            puntos: 0.0,
            es_no_aplica: false,
        };
        let json = serde_json::to_string(&entry).expect("entry should serialize");
        assert!(!json.contains("id_opcion"));
        assert!(!json.contains("valor_texto"));
        assert!(json.contains("\"valor_numerico\":42.0"));
    }
}
