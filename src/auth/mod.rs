pub mod token;

pub use token::TokenValidator;
