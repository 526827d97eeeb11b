pub mod face_extraction;
pub mod face_localizer;
