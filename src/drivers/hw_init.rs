//! One-shot hardware peripheral initialization.
//!
//! Configures the FSR ADC channel, the servo LEDC timer/channel and the
//! voice-module UART using raw ESP-IDF sys calls. Called once from `main()`
//! before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    LedcInitFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::AdcInitFailed(_) => Self::Init("ADC1"),
            HwInitError::LedcInitFailed(_) => Self::Init("LEDC"),
            HwInitError::UartInitFailed(rc) => {
                Self::Comms(crate::error::CommsError::UartInitFailed(rc))
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(uart_baud: u32) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_ledc()?;
        init_uart(uart_baud)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_uart_baud: u32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the init path or the main-loop read
/// path. `init_adc()` completes before the control loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::FSR_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH{}=FSR)", pins::FSR_ADC_CHANNEL);
    Ok(())
}

/// Oneshot read. A failed conversion reads as 0 (below any threshold).
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── LEDC PWM (servo) ──────────────────────────────────────────

pub const LEDC_CH_SERVO: u32 = 0;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: LEDC_CH_SERVO,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::SERVO_PWM_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!(
        "hw_init: LEDC configured (servo=CH{} on GPIO{}, {} Hz)",
        LEDC_CH_SERVO,
        pins::SERVO_PWM_GPIO,
        pins::SERVO_PWM_FREQ_HZ
    );
    Ok(())
}

/// One LEDC output channel, exposed through `embedded_hal::pwm::SetDutyCycle`.
///
/// On host builds the duty is kept in memory so tests can read it back.
pub struct LedcChannel {
    channel: u32,
    max_duty: u16,
    #[cfg(not(target_os = "espidf"))]
    sim_duty: u16,
}

/// LEDC write failure, carrying the ESP-IDF return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedcError(pub i32);

impl embedded_hal::pwm::Error for LedcError {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

impl LedcChannel {
    pub fn new(channel: u32, resolution_bits: u32) -> Self {
        Self {
            channel,
            max_duty: ((1u32 << resolution_bits) - 1) as u16,
            #[cfg(not(target_os = "espidf"))]
            sim_duty: 0,
        }
    }

    /// The servo channel as configured by `init_peripherals`.
    pub fn servo() -> Self {
        Self::new(LEDC_CH_SERVO, pins::SERVO_PWM_RESOLUTION_BITS)
    }

    /// Last duty written (host builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_duty(&self) -> u16 {
        self.sim_duty
    }
}

impl embedded_hal::pwm::ErrorType for LedcChannel {
    type Error = LedcError;
}

impl embedded_hal::pwm::SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    #[cfg(target_os = "espidf")]
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), LedcError> {
        // SAFETY: the channel was configured in init_ledc(); duty register
        // writes are race-free since only the main loop drives the servo.
        let ret = unsafe { ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel, duty as u32) };
        if ret != ESP_OK as i32 {
            return Err(LedcError(ret));
        }
        let ret = unsafe { ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel) };
        if ret != ESP_OK as i32 {
            return Err(LedcError(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), LedcError> {
        let _ = self.channel;
        self.sim_duty = duty.min(self.max_duty);
        Ok(())
    }
}

// ── UART (voice module) ───────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_uart(baud: u32) -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: baud as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(pins::VOICE_UART_PORT, &cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    let ret = unsafe {
        uart_set_pin(
            pins::VOICE_UART_PORT,
            pins::UART_TX_GPIO,
            pins::UART_RX_GPIO,
            UART_PIN_NO_CHANGE,
            UART_PIN_NO_CHANGE,
        )
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    let ret = unsafe {
        uart_driver_install(
            pins::VOICE_UART_PORT,
            pins::UART_RX_BUF_BYTES,
            0,
            0,
            core::ptr::null_mut(),
            0,
        )
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    info!("hw_init: UART{} at {} baud", pins::VOICE_UART_PORT, baud);
    Ok(())
}

/// Non-blocking single-byte read from the voice-module UART.
#[cfg(target_os = "espidf")]
pub fn uart_read_byte() -> Option<u8> {
    let mut byte = 0u8;
    // SAFETY: the driver was installed in init_uart(); a zero tick timeout
    // returns immediately when the RX ring is empty.
    let n = unsafe {
        uart_read_bytes(
            pins::VOICE_UART_PORT,
            (&raw mut byte).cast(),
            1,
            0,
        )
    };
    (n == 1).then_some(byte)
}
