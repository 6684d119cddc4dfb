//! Static keyword-to-handler registry
//!
//! Populated once at startup; lookups are read-only thereafter, so the
//! registry is shared across connections without further locking.

use super::handler::CommandHandler;
use super::misc::UnsupportedHandler;
use std::collections::HashMap;

type HandlerFactory = Box<dyn Fn() -> Box<dyn CommandHandler> + Send + Sync>;

/// Maps command keywords to handler factories, with an "unsupported"
/// fallback for everything else
pub struct CommandRegistry {
    handlers: HashMap<&'static str, HandlerFactory>,
    fallback: HandlerFactory,
}

impl CommandRegistry {
    /// Create an empty registry whose fallback replies `500`
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Box::new(|| Box::new(UnsupportedHandler)),
        }
    }

    /// Associate a keyword (uppercase) with a handler factory
    pub fn register<F, H>(&mut self, keyword: &'static str, factory: F)
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: CommandHandler + 'static,
    {
        debug_assert!(keyword.chars().all(|c| !c.is_ascii_lowercase()));
        self.handlers
            .insert(keyword, Box::new(move || Box::new(factory())));
    }

    /// Instantiate the handler for a keyword, falling back to the
    /// "unsupported" handler for unknown keywords
    #[must_use]
    pub fn resolve(&self, keyword: &str) -> Box<dyn CommandHandler> {
        match self.handlers.get(keyword) {
            Some(factory) => factory(),
            None => (self.fallback)(),
        }
    }

    /// Registered keyword count (startup logging)
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registry with the full command set this server speaks
    #[must_use]
    pub fn standard() -> Self {
        use super::authinfo::AuthInfoHandler;
        use super::misc::{CapabilitiesHandler, DateHandler, HelpHandler, ModeHandler, QuitHandler};
        use super::post::PostHandler;
        use super::reader::{ArticleHandler, GroupHandler, NavigateHandler, RetrieveMode};

        let mut registry = Self::new();
        registry.register("QUIT", || QuitHandler);
        registry.register("POST", PostHandler::new);
        registry.register("GROUP", || GroupHandler);
        registry.register("ARTICLE", || ArticleHandler::new(RetrieveMode::Article));
        registry.register("HEAD", || ArticleHandler::new(RetrieveMode::Head));
        registry.register("BODY", || ArticleHandler::new(RetrieveMode::Body));
        registry.register("STAT", || ArticleHandler::new(RetrieveMode::Stat));
        registry.register("NEXT", || NavigateHandler::next());
        registry.register("LAST", || NavigateHandler::last());
        registry.register("AUTHINFO", || AuthInfoHandler);
        registry.register("DATE", || DateHandler);
        registry.register("HELP", || HelpHandler);
        registry.register("CAPABILITIES", || CapabilitiesHandler);
        registry.register("MODE", || ModeHandler);
        registry
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
