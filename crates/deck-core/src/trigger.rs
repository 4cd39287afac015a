//! Trigger Resolver: button index to action sequence.

use crate::dispatch::ActionExecutor;
use crate::error::Result;
use crate::store::ConfigStore;
use crate::types::{ActionOutcome, BUTTON_COUNT};
use std::sync::Arc;
use tracing::debug;

pub struct TriggerResolver {
    store: Arc<dyn ConfigStore>,
    executor: ActionExecutor,
}

impl TriggerResolver {
    pub fn new(store: Arc<dyn ConfigStore>, executor: ActionExecutor) -> Self {
        Self { store, executor }
    }

    /// Run the actions bound to `button_index` on the active page of the
    /// active profile.
    ///
    /// Nothing happens when there is no active profile or page, no such
    /// button, or the button is disabled or empty. Only a failure to read the
    /// configuration is an error.
    pub async fn resolve_and_run(&self, button_index: u32) -> Result<Vec<ActionOutcome>> {
        let Some(profile) = self.store.active_profile()? else {
            debug!(button_index, "no active profile");
            return Ok(Vec::new());
        };
        let Some(page) = profile.active_page() else {
            debug!(button_index, profile = %profile.name, "no active page");
            return Ok(Vec::new());
        };
        let Some(button) = page.button(button_index).filter(|b| b.is_runnable()) else {
            debug!(button_index, page = %page.name, "button unbound or disabled");
            return Ok(Vec::new());
        };
        debug!(button_index, actions = button.actions.len(), "triggering button");
        Ok(self.executor.dispatch_sequence(&button.actions).await)
    }
}

/// Keyboard-mode accelerator for a button: `CommandOrControl+Alt+Shift+`
/// followed by `1`..`9` for buttons 1..9 and `A`..`I` for buttons 10..18.
pub fn accelerator_for(button_index: u32) -> Option<String> {
    let key = match button_index {
        1..=9 => char::from_digit(button_index, 10)?,
        10..=BUTTON_COUNT => char::from_u32('A' as u32 + button_index - 10)?,
        _ => return None,
    };
    Some(format!("CommandOrControl+Alt+Shift+{key}"))
}

/// Every `(button, accelerator)` pair, in button order.
pub fn accelerators() -> Vec<(u32, String)> {
    (1..=BUTTON_COUNT)
        .filter_map(|i| accelerator_for(i).map(|a| (i, a)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::{linux_executor, RecordingRunner};
    use crate::store::DeckData;
    use crate::types::{ActionDescriptor, ActionKind, Profile};
    use serde_json::json;

    fn data_with_button(id: u32, actions: Vec<ActionDescriptor>, enabled: bool) -> DeckData {
        let mut data = DeckData::with_defaults();
        let button = data.button_mut(None, None, id).unwrap();
        button.actions = actions;
        button.enabled = enabled;
        data
    }

    fn resolver(data: DeckData, runner: Arc<RecordingRunner>) -> TriggerResolver {
        TriggerResolver::new(Arc::new(data), linux_executor(runner))
    }

    #[tokio::test]
    async fn runs_bound_actions_in_order() {
        let runner = RecordingRunner::succeeding();
        let actions = vec![
            ActionDescriptor::bare(ActionKind::MediaPlayPause),
            ActionDescriptor::new(
                "open-url",
                json!({ "url": "https://example.com" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
        ];
        let r = resolver(data_with_button(3, actions, true), runner.clone());
        let outcomes = r.resolve_and_run(3).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(runner.programs(), vec!["xdotool", "xdg-open"]);
    }

    #[tokio::test]
    async fn disabled_or_empty_buttons_do_nothing() {
        let runner = RecordingRunner::succeeding();
        let disabled = resolver(
            data_with_button(1, vec![ActionDescriptor::bare(ActionKind::MediaMute)], false),
            runner.clone(),
        );
        assert!(disabled.resolve_and_run(1).await.unwrap().is_empty());

        let empty = resolver(data_with_button(2, vec![], true), runner.clone());
        assert!(empty.resolve_and_run(2).await.unwrap().is_empty());
        assert!(runner.programs().is_empty());
    }

    #[tokio::test]
    async fn unknown_button_or_missing_profile_is_a_no_op() {
        let runner = RecordingRunner::succeeding();
        let r = resolver(DeckData::with_defaults(), runner.clone());
        assert!(r.resolve_and_run(0).await.unwrap().is_empty());
        assert!(r.resolve_and_run(42).await.unwrap().is_empty());

        let mut orphaned = DeckData::with_defaults();
        orphaned.settings.active_profile_id = "gone".into();
        let r = resolver(orphaned, runner.clone());
        assert!(r.resolve_and_run(1).await.unwrap().is_empty());
        assert!(runner.programs().is_empty());
    }

    #[tokio::test]
    async fn missing_active_page_is_a_no_op() {
        let mut data = DeckData {
            profiles: vec![Profile::new("Solo")],
            ..Default::default()
        };
        data.settings.active_profile_id = data.profiles[0].id.clone();
        data.profiles[0].active_page_id = "nowhere".into();
        let runner = RecordingRunner::succeeding();
        let r = resolver(data, runner.clone());
        assert!(r.resolve_and_run(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_action_does_not_stop_the_button() {
        let runner = RecordingRunner::succeeding();
        let actions = vec![
            ActionDescriptor::new("bogus", Default::default()),
            ActionDescriptor::bare(ActionKind::ScreenshotFull),
        ];
        let r = resolver(data_with_button(18, actions, true), runner.clone());
        let outcomes = r.resolve_and_run(18).await.unwrap();
        assert!(!outcomes[0].succeeded);
        assert!(outcomes[1].succeeded);
        assert_eq!(runner.programs(), vec!["gnome-screenshot"]);
    }

    #[test]
    fn accelerators_cover_all_buttons() {
        assert_eq!(
            accelerator_for(1).as_deref(),
            Some("CommandOrControl+Alt+Shift+1")
        );
        assert_eq!(
            accelerator_for(9).as_deref(),
            Some("CommandOrControl+Alt+Shift+9")
        );
        assert_eq!(
            accelerator_for(10).as_deref(),
            Some("CommandOrControl+Alt+Shift+A")
        );
        assert_eq!(
            accelerator_for(18).as_deref(),
            Some("CommandOrControl+Alt+Shift+I")
        );
        assert_eq!(accelerator_for(0), None);
        assert_eq!(accelerator_for(19), None);
        assert_eq!(accelerators().len(), 18);
    }
}
