pub mod resume;
pub mod verified;

pub use resume::{Certification, Education, Experience, Identity, Project, ResumeDocument, Skills};
pub use verified::{
    LinkKind, ProfileLink, Provenance, TaggedText, VerifiedCertification, VerifiedIdentity,
    VerifiedProject, VerifiedResume, VerifiedSkills,
};
