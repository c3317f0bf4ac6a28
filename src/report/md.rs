use crate::types::report::ScoreReport;

pub fn to_markdown(report: &ScoreReport) -> String {
    let mut output = String::new();
    output.push_str("# Reporte de semáforo\n\n");
    output.push_str(&format!(
        "Promedio de la respuesta: {:.2} ({})\n\n",
        report.promedio_respuesta,
        report.color_semaforo.label()
    ));

    output.push_str("## Categorías\n\n");
    if report.categorias.is_empty() {
        output.push_str("- ninguna\n\n");
    } else {
        for categoria in &report.categorias {
            output.push_str(&format!(
                "- {}: {:.2} ({}, {} respuestas)\n",
                categoria.categoria,
                categoria.promedio,
                categoria.color_semaforo.label(),
                categoria.total_respuestas
            ));
        }
        output.push('\n');
    }

    output.push_str("## Preguntas\n\n");
    if report.preguntas.is_empty() {
        output.push_str("- ninguna\n");
    } else {
        for pregunta in &report.preguntas {
            output.push_str(&format!(
                "- pregunta {}{}: {:.2} ({})\n",
                pregunta.pregunta,
                pregunta
                    .categoria
                    .as_deref()
                    .map(|c| format!(" [{c}]"))
                    .unwrap_or_default(),
                pregunta.promedio,
                pregunta.color_semaforo.label()
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::build_report;
    use crate::types::answer::AnswerDetail;
    use crate::types::survey::QuestionKind;

    #[test]
    fn markdown_report_contains_sections() {
        let details = vec![
            AnswerDetail {
                id_pregunta: 1,
                id_opcion: Some(10),
                puntos: 1.0,
                tipo: QuestionKind::SiNo,
                categoria: Some("Agua".to_string()),
                id_categoria: None,
            },
            AnswerDetail {
                id_pregunta: 2,
                id_opcion: None,
                puntos: 0.0,
                tipo: QuestionKind::Texto,
                categoria: None,
                id_categoria: None,
            },
        ];
        let rendered = to_markdown(&build_report(&details, 2));
        assert!(rendered.contains("# Reporte de semáforo"));
        assert!(rendered.contains("## Categorías"));
        assert!(rendered.contains("- Agua:"));
        assert!(rendered.contains("## Preguntas"));
        assert!(rendered.contains("- pregunta 1 [Agua]:"));
    }

    #[test]
    fn markdown_report_handles_empty_input() {
        let rendered = to_markdown(&build_report(&[], 2));
        assert!(rendered.contains("Promedio de la respuesta: 0.00 (rojo)"));
        assert!(rendered.contains("- ninguna"));
    }
}
