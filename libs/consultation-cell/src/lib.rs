pub mod models;
pub mod services;

pub use models::{
    ConsultationError, DocumentationStatus, Evaluation, NoteDraft, PaymentReceipt, SessionNote,
    SessionState,
};
pub use services::notes::SessionNoteService;
pub use services::session::ConsultationSessionController;
pub use services::timer::{format_elapsed, SessionTimer};
