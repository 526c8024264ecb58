//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                 |
//! |------------|--------------------|-----------------------------|
//! | `ble`      | LinkHandler        | Bluedroid GATT server       |
//! | `hardware` | SensorPort         | ESP32 ADC1 (FSR)            |
//! |            | ActuatorPort       | ESP32 LEDC PWM (servo)      |
//! | `log_sink` | EventSink          | Serial log output           |
//! | `serial`   | LinkHandler        | UART0 (voice module)        |
//! |            | SerialPort         | UART0 / in-memory queue     |
//! | `time`     | ClockPort          | ESP32 system timer          |

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod serial;
pub mod time;
