// html2pdf shared type definitions
// Error enums and the print page setup used across toolkit backends.

pub mod errors;
pub mod paper;
