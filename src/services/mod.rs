pub mod error;
pub mod capacity;
pub mod notification_service;
pub mod application_service;
pub mod evaluation_service;
pub mod internship_service;
pub mod query_service;
pub mod student_service;
pub mod admin_service;
