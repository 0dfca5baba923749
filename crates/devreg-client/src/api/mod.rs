//! API endpoint modules.

mod device;

pub use device::DeviceApi;
