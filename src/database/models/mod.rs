pub mod pet;
pub mod user;

pub use pet::Pet;
pub use user::User;
