mod api;
mod connectivity;
mod device;
mod node_id;
mod registration;

pub use api::*;
pub use connectivity::*;
pub use device::*;
pub use node_id::*;
pub use registration::*;
