pub mod error;
pub mod network;
pub mod observer;
pub mod population;
pub mod record;
pub mod selector;
