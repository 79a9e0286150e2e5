pub mod vending_machine_repo;
pub use vending_machine_repo::VendingMachineRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod link_repo;
pub use link_repo::LinkRepository;
