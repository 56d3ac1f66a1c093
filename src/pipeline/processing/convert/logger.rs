use tracing::Span;

use score_core::ImportType;

/// Logging capability handed to converters.
///
/// Everything logged through it is parented to one span carrying the import
/// type, service and user, so per-record messages can be traced back to the
/// import that produced them. Used for diagnostics only.
#[derive(Debug, Clone)]
pub struct ImportLogger {
    span: Span,
}

impl ImportLogger {
    pub fn new(import_type: ImportType, service: &str, user_id: Option<u64>) -> Self {
        let span = tracing::info_span!(
            "score_import",
            import_type = %import_type,
            service = %service,
            user_id = ?user_id,
        );
        Self { span }
    }

    /// A logger whose messages go to no span; used in tests
    pub fn detached() -> Self {
        Self { span: Span::none() }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(parent: &self.span, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(parent: &self.span, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(parent: &self.span, "{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(parent: &self.span, "{}", message);
    }

    /// Highest severity: a broken invariant that needs an operator
    pub fn severe(&self, message: &str) {
        tracing::error!(parent: &self.span, severity = "severe", "{}", message);
    }
}
