pub mod vending_machine_service;
pub use vending_machine_service::VendingMachineService;
pub mod product_service;
pub use product_service::ProductService;
pub mod link_service;
pub use link_service::LinkService;
