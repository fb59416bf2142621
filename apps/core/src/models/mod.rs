pub mod application;
pub mod company;
pub mod document;
pub mod user;
pub mod validation;

pub use application::{ApplicationDraft, ApplicationPatch, ApplicationStatus, JobApplication, Priority};
pub use company::{Company, CompanyDraft, CompanyPatch, CompanyTier};
pub use document::{Document, DocumentDraft, DocumentPatch};
pub use user::UserProfile;
