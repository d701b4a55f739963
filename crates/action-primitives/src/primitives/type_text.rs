//! Type text primitive - replace the contents of an input

use tracing::{debug, info};

use crate::{errors::ActionError, primitives::ActionExecutor, types::ElementHandle};

impl ActionExecutor {
    /// Focus the node, clear it, settle, then type `value` with per-character pacing.
    ///
    /// An empty value leaves the field cleared. Partial typing is not rolled
    /// back when a later keystroke fails.
    pub async fn clear_and_type(
        &self,
        handle: &ElementHandle,
        value: &str,
    ) -> Result<(), ActionError> {
        debug!(handle = %handle, text_length = value.chars().count(), "Executing clear_and_type");

        self.session().focus(handle).await?;
        self.session().clear(handle).await?;
        self.settle(self.tempo().clear_settle()).await;

        if !value.is_empty() {
            self.session()
                .type_text(handle, value, self.tempo().per_char_delay())
                .await?;
        }

        info!(handle = %handle, "Type text completed");
        Ok(())
    }
}
