// Upload Gateway
// Accepts one résumé per request, validates type and size, and stages it on disk.
// The gateway owns the staged file's name and lifetime; analysis only reads it.

pub mod handlers;
pub mod intake;
pub mod staging;

pub use intake::receive_resume;
pub use staging::StagingArea;
