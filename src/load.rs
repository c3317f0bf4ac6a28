use crate::error::{Result, SemaforoError};
use crate::form::BallotFile;
use crate::types::answer::AnswerDetail;
use crate::types::survey::Survey;
use std::path::Path;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        return Err(SemaforoError::PathNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        SemaforoError::InvalidSurvey(format!("{what} {}: {e}", path.display()))
    })
}

pub fn load_survey(path: &Path) -> Result<Survey> {
    read_json(path, "survey")
}

/// Detail rows are accepted either as a bare array or wrapped in
/// `{ "respuestas": [...] }`, matching how the API returns them.
pub fn load_details(path: &Path) -> Result<Vec<AnswerDetail>> {
    if !path.exists() {
        return Err(SemaforoError::PathNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let rows = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map
            .remove("respuestas")
            .ok_or_else(|| {
                SemaforoError::InvalidDetails(format!(
                    "{}: expected an array or an object with \"respuestas\"",
                    path.display()
                ))
            })?,
        _ => {
            return Err(SemaforoError::InvalidDetails(format!(
                "{}: expected an array",
                path.display()
            )))
        }
    };
    serde_json::from_value(rows).map_err(SemaforoError::Json)
}

pub fn load_ballot(path: &Path) -> Result<BallotFile> {
    if !path.exists() {
        return Err(SemaforoError::PathNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| SemaforoError::InvalidBallot(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_details_accepts_bare_array_and_wrapper() {
        let dir = TempDir::new().expect("temp dir should be created");
        let bare = dir.path().join("bare.json");
        fs::write(
            &bare,
            r#"[ { "id_pregunta": 1, "puntos": 2, "tipo": "si_no" } ]"#,
        )
        .expect("file should write");
        assert_eq!(load_details(&bare).expect("bare should load").len(), 1);

        let wrapped = dir.path().join("wrapped.json");
        fs::write(
            &wrapped,
            r#"{ "respuestas": [ { "id_pregunta": 1, "puntos": 2, "tipo": "si_no" } ] }"#,
        )
        .expect("file should write");
        assert_eq!(load_details(&wrapped).expect("wrapped should load").len(), 1);
    }

    #[test]
    fn missing_path_maps_to_path_not_found() {
        let dir = TempDir::new().expect("temp dir should be created");
        let err = load_survey(&dir.path().join("nope.json")).expect_err("should fail");
        assert!(matches!(err, SemaforoError::PathNotFound(_)));
    }
}
