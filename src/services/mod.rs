pub mod auth_service;
pub mod pet_service;

pub use auth_service::AuthService;
pub use pet_service::PetService;
