use action_locator::ElementResolver;
use action_primitives::{PageSession, Tempo};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a tool needs: the page, its resolver and output locations
#[derive(Clone)]
pub struct ToolContext {
    resolver: ElementResolver,
    screenshots_dir: PathBuf,
}

impl ToolContext {
    pub fn new(resolver: ElementResolver, screenshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            screenshots_dir: screenshots_dir.into(),
        }
    }

    pub fn resolver(&self) -> &ElementResolver {
        &self.resolver
    }

    pub fn session(&self) -> &Arc<dyn PageSession> {
        self.resolver.executor().session()
    }

    pub fn tempo(&self) -> &Tempo {
        self.resolver.executor().tempo()
    }

    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }
}
