use crate::types::report::Finding;
use crate::types::survey::{QuestionKind, Survey};
use std::collections::HashSet;

/// Data-quality findings over a survey definition. `estricto` promotes
/// warnings to blocking.
pub fn survey_findings(survey: &Survey, estricto: bool) -> Vec<Finding> {
    let mut findings = Vec::new();
    let question_ids: HashSet<i64> = survey.preguntas.iter().map(|q| q.id_pregunta).collect();

    for question in &survey.preguntas {
        if question.tipo.has_options() && question.opciones.is_empty() {
            findings.push(Finding {
                id: "opciones.faltantes".to_string(),
                title: "Choice question without options".to_string(),
                body: format!(
                    "Question {} is {:?} but declares no options.",
                    question.id_pregunta, question.tipo
                ),
                blocking: false,
                pregunta: Some(question.id_pregunta),
            });
        }

        let mut seen = HashSet::new();
        for option in &question.opciones {
            if !seen.insert(option.id_opcion) {
                findings.push(Finding {
                    id: "opciones.duplicadas".to_string(),
                    title: "Duplicate option id".to_string(),
                    body: format!(
                        "Question {} declares option {} more than once.",
                        question.id_pregunta, option.id_opcion
                    ),
                    blocking: true,
                    pregunta: Some(question.id_pregunta),
                });
            }

            if option.puntos < 0.0 {
                findings.push(Finding {
                    id: "puntos.negativos".to_string(),
                    title: "Negative point weight".to_string(),
                    body: format!(
                        "Option {} of question {} has weight {}.",
                        option.id_opcion, question.id_pregunta, option.puntos
                    ),
                    blocking: true,
                    pregunta: Some(question.id_pregunta),
                });
            }

            if option.excluyente && question.tipo != QuestionKind::SeleccionMultiple {
                findings.push(Finding {
                    id: "opciones.excluyente_fuera_de_multiple".to_string(),
                    title: "Exclusive flag outside multi-choice".to_string(),
                    body: format!(
                        "Option {} of question {} is excluyente but the question is {:?}.",
                        option.id_opcion, question.id_pregunta, question.tipo
                    ),
                    blocking: false,
                    pregunta: Some(question.id_pregunta),
                });
            }

            if option.condicional {
                match option.condicional_pregunta_id {
                    None => findings.push(Finding {
                        id: "condicional.sin_destino".to_string(),
                        title: "Conditional option without target".to_string(),
                        body: format!(
                            "Option {} of question {} is condicional but names no target; \
                             it will never reveal anything.",
                            option.id_opcion, question.id_pregunta
                        ),
                        blocking: false,
                        pregunta: Some(question.id_pregunta),
                    }),
                    Some(target) if !question_ids.contains(&target) => {
                        findings.push(Finding {
                            id: "condicional.destino_desconocido".to_string(),
                            title: "Conditional target not in survey".to_string(),
                            body: format!(
                                "Option {} of question {} targets question {}, which does \
                                 not exist.",
                                option.id_opcion, question.id_pregunta, target
                            ),
                            blocking: true,
                            pregunta: Some(question.id_pregunta),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    if estricto {
        for finding in &mut findings {
            finding.blocking = true;
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken_survey() -> Survey {
        serde_json::from_str(
            r#"
            {
              "preguntas": [
                {
                  "id_pregunta": 1, "texto": "p1", "tipo": "si_no",
                  "opciones": [
                    { "id_opcion": 10, "etiqueta": "Sí", "condicional": true },
                    { "id_opcion": 10, "etiqueta": "Sí otra vez" },
                    { "id_opcion": 11, "etiqueta": "No", "puntos": -1,
                      "condicional": true, "condicional_pregunta_id": 99 }
                  ]
                },
                { "id_pregunta": 2, "texto": "p2", "tipo": "seleccion_unica" }
              ]
            }
            "#,
        )
        .expect("survey should parse")
    }

    #[test]
    fn findings_cover_each_defect_class() {
        let findings = survey_findings(&broken_survey(), false);
        let has = |id: &str| findings.iter().any(|f| f.id == id);
        assert!(has("condicional.sin_destino"));
        assert!(has("condicional.destino_desconocido"));
        assert!(has("opciones.duplicadas"));
        assert!(has("opciones.faltantes"));
        assert!(has("puntos.negativos"));
    }

    #[test]
    fn severity_split_matches_defect_class() {
        let findings = survey_findings(&broken_survey(), false);
        let blocking = |id: &str| {
            findings
                .iter()
                .find(|f| f.id == id)
                .map(|f| f.blocking)
                .expect("finding should exist")
        };
        assert!(!blocking("condicional.sin_destino"));
        assert!(blocking("condicional.destino_desconocido"));
        assert!(blocking("opciones.duplicadas"));
        assert!(!blocking("opciones.faltantes"));
    }

    #[test]
    fn estricto_promotes_warnings_to_blocking() {
        let findings = survey_findings(&broken_survey(), true);
        assert!(findings.iter().all(|f| f.blocking));
    }

    #[test]
    fn clean_survey_has_no_findings() {
        let survey: Survey = serde_json::from_str(
            r#"
            {
              "preguntas": [
                {
                  "id_pregunta": 1, "texto": "p", "tipo": "seleccion_multiple",
                  "opciones": [
                    { "id_opcion": 10, "etiqueta": "a", "puntos": 2 },
                    { "id_opcion": 11, "etiqueta": "ninguna", "excluyente": true }
                  ]
                }
              ]
            }
            "#,
        )
        .expect("survey should parse");
        assert!(survey_findings(&survey, false).is_empty());
    }
}
