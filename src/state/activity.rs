/// Lifecycle of asynchronous actions
///
/// Every long-running action (an AI call, a rasterization) is tracked by an
/// `ActionState`. Starting an action that is already pending is refused,
/// which is the in-flight guard: a second trigger from another input path
/// cannot race the first. Completion always goes through `finish`, whether
/// the action succeeded or failed, so the busy state is always cleared.

use std::collections::HashMap;

use super::data::CaptureId;

/// Observable state of one action
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActionState<T> {
    #[default]
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> ActionState<T> {
    /// Move to `Pending`. Returns false (and changes nothing) if already pending.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = ActionState::Pending;
        true
    }

    /// Record the outcome. Always leaves the pending state.
    pub fn finish<E: std::fmt::Display>(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(value) => ActionState::Succeeded(value),
            Err(error) => ActionState::Failed(error.to_string()),
        };
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ActionState::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ActionState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = ActionState::Idle;
    }
}

/// The AI actions available on a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiAction {
    Redact,
    ExtractText,
}

/// Results of the AI actions for one capture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureTools {
    /// Redacted image as a data URI, waiting to be applied
    pub redaction: ActionState<String>,
    /// Text read from the image
    pub extraction: ActionState<String>,
}

impl CaptureTools {
    pub fn action(&self, action: AiAction) -> &ActionState<String> {
        match action {
            AiAction::Redact => &self.redaction,
            AiAction::ExtractText => &self.extraction,
        }
    }

    pub fn action_mut(&mut self, action: AiAction) -> &mut ActionState<String> {
        match action {
            AiAction::Redact => &mut self.redaction,
            AiAction::ExtractText => &mut self.extraction,
        }
    }
}

/// Per-capture action tracking, so one guard exists per action per capture
#[derive(Debug, Default)]
pub struct ToolBoard {
    tools: HashMap<CaptureId, CaptureTools>,
}

impl ToolBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the tools for a capture (idle if never used)
    pub fn get(&self, id: CaptureId) -> CaptureTools {
        self.tools.get(&id).cloned().unwrap_or_default()
    }

    /// Start an action on a capture. Returns false if one is already in flight.
    pub fn begin(&mut self, id: CaptureId, action: AiAction) -> bool {
        self.tools.entry(id).or_default().action_mut(action).begin()
    }

    pub fn finish<E: std::fmt::Display>(&mut self, id: CaptureId, action: AiAction, result: Result<String, E>) {
        self.tools.entry(id).or_default().action_mut(action).finish(result);
    }

    /// Drop a pending redaction preview once it has been applied
    pub fn clear(&mut self, id: CaptureId, action: AiAction) {
        if let Some(tools) = self.tools.get_mut(&id) {
            tools.action_mut(action).reset();
        }
    }

    /// Forget everything about a deleted capture
    pub fn remove(&mut self, id: CaptureId) {
        self.tools.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_refuses_while_pending() {
        let mut state: ActionState<u32> = ActionState::default();
        assert!(state.begin());
        assert!(!state.begin());
        assert!(state.is_pending());
    }

    #[test]
    fn test_finish_always_leaves_pending() {
        let mut state: ActionState<u32> = ActionState::default();

        state.begin();
        state.finish::<String>(Ok(3));
        assert_eq!(state, ActionState::Succeeded(3));
        assert_eq!(state.value(), Some(&3));

        state.begin();
        state.finish(Err("boom"));
        assert_eq!(state, ActionState::Failed("boom".to_string()));
        assert!(state.begin());
    }

    #[test]
    fn test_guard_is_per_capture_and_action() {
        let mut board = ToolBoard::new();
        let a = CaptureId(1);
        let b = CaptureId(2);

        assert!(board.begin(a, AiAction::Redact));
        assert!(!board.begin(a, AiAction::Redact));
        assert!(board.begin(a, AiAction::ExtractText));
        assert!(board.begin(b, AiAction::Redact));

        board.finish::<String>(a, AiAction::Redact, Ok("data:image/png;base64,AA==".to_string()));
        assert!(!board.get(a).redaction.is_pending());
        assert_eq!(
            board.get(a).redaction.value().map(String::as_str),
            Some("data:image/png;base64,AA==")
        );

        board.clear(a, AiAction::Redact);
        assert_eq!(board.get(a).redaction, ActionState::Idle);

        board.remove(b);
        assert!(!board.get(b).redaction.is_pending());
    }
}
