pub mod admin;
pub mod customer;
pub mod potential_customer;
pub mod refresh_token;

pub use admin::{Admin, NewAdmin};
pub use customer::{Customer, NewCustomer};
pub use potential_customer::{NewPotentialCustomer, PotentialCustomer};
pub use refresh_token::RefreshToken;
