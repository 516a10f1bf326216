pub mod random;
pub mod sensor;

pub use random::RandomSource;
pub use sensor::{DeviceMetadata, SensorConfig, VirtualSensor};
