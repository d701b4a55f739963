//! Scroll primitive - bring a resolved node into view

use tracing::debug;

use crate::{errors::ActionError, primitives::ActionExecutor, types::ElementHandle};

impl ActionExecutor {
    /// Scroll the node to the viewport center
    pub async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), ActionError> {
        debug!(handle = %handle, "Scrolling element into view");
        self.session().scroll_into_view(handle).await
    }
}
