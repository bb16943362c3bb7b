pub mod persona_service;
pub mod retrieval_service;
pub mod tutor_service;
