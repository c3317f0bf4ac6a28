use crate::types::survey::{OptionId, QuestionId, Survey};
use std::collections::BTreeSet;
use tracing::warn;

/// A single-choice or yes/no answer picked by the surveyor. Events on other
/// question types never change visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    pub id_pregunta: QuestionId,
    pub id_opcion: OptionId,
}

/// Visible-question set for one form-fill session.
///
/// Owned by the caller and advanced with pure transitions; a fresh state is
/// built whenever a survey is (re)loaded. Questions named as a conditional
/// target by any option start hidden, every other question starts visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityState {
    visible: BTreeSet<QuestionId>,
    targets: BTreeSet<QuestionId>,
}

impl VisibilityState {
    pub fn new(survey: &Survey) -> Self {
        let targets = survey.conditional_targets();
        let visible = survey
            .preguntas
            .iter()
            .map(|q| q.id_pregunta)
            .filter(|id| !targets.contains(id))
            .collect();
        Self { visible, targets }
    }

    /// Applies one selection event and returns the next state.
    ///
    /// A conditional option with a target reveals that target. Selecting any
    /// non-conditional option retracts the targets of the question's other
    /// conditional options, so a dependent question disappears again when the
    /// surveyor changes their mind. Retraction is deliberately limited to
    /// sibling options of the answered question; triggers held by unrelated
    /// questions are not re-scanned. Re-applying the same event is a no-op.
    pub fn apply(mut self, survey: &Survey, event: SelectionEvent) -> Self {
        let Some(question) = survey.question(event.id_pregunta) else {
            warn!(id_pregunta = event.id_pregunta, "selection on unknown question");
            return self;
        };
        if !question.tipo.drives_visibility() {
            return self;
        }
        let Some(option) = question.option(event.id_opcion) else {
            warn!(
                id_pregunta = event.id_pregunta,
                id_opcion = event.id_opcion,
                "selection of unknown option"
            );
            return self;
        };

        if option.condicional {
            match option.condicional_pregunta_id {
                Some(target) => {
                    self.visible.insert(target);
                }
                None => {
                    // Data-quality defect in the definition; treated as
                    // non-triggering.
                    warn!(
                        id_pregunta = question.id_pregunta,
                        id_opcion = option.id_opcion,
                        "conditional option has no target question"
                    );
                }
            }
        } else {
            for other in &question.opciones {
                if other.id_opcion == option.id_opcion || !other.condicional {
                    continue;
                }
                if let Some(target) = other.condicional_pregunta_id {
                    self.visible.remove(&target);
                }
            }
        }
        self
    }

    pub fn is_visible(&self, id: QuestionId) -> bool {
        self.visible.contains(&id)
    }

    /// A question must be answered and submitted iff it is not a conditional
    /// target at all, or it has been revealed by a currently-selected
    /// trigger. Validation and submission serialization use this identically.
    pub fn is_eligible(&self, id: QuestionId) -> bool {
        !self.targets.contains(&id) || self.visible.contains(&id)
    }
}
