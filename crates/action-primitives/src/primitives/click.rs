//! Click primitive - click a resolved node

use tracing::{debug, info};

use crate::{errors::ActionError, primitives::ActionExecutor, types::ElementHandle};

impl ActionExecutor {
    /// Click the node once
    pub async fn click(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        debug!(handle = %handle, "Executing click");
        self.session().click(handle).await
    }

    /// Scroll into view, settle, click, then settle again.
    ///
    /// Any step's failure propagates unchanged; nothing is retried.
    pub async fn scroll_and_click(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        self.scroll_into_view(handle).await?;
        self.settle(self.tempo().scroll_settle()).await;
        self.click(handle).await?;
        self.settle(self.tempo().post_click_settle()).await;
        info!(handle = %handle, "Click completed");
        Ok(())
    }
}
