pub mod health;
pub mod products;
pub mod vending_machines;
