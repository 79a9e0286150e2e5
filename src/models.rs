pub mod vending;
