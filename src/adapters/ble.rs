//! BLE confirmation link.
//!
//! A phone-side vision solver connects over BLE and writes `'g'` to confirm
//! that a pending GO is safe. This adapter owns the GATT server and turns
//! those writes into a raised [`ConfirmationFlag`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server. C callbacks stash
//!   connection events and written bytes in statics; [`BleLink::poll`]
//!   drains them on the main loop and dispatches through [`LinkHandler`].
//! - **all other targets**: simulation stubs. Tests drive the
//!   [`LinkHandler`] callbacks directly.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                        | Perms |
//! |----------------|-----------------------------|-------|
//! | Confirmation   | `6e7a0002-…-9c31d4a8b05f`   | Write |

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{debug, info};

use crate::app::commands::is_confirmation_payload;
use crate::app::ports::LinkHandler;
use crate::error::CommsError;
use crate::handoff::ConfirmationFlag;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x6e7a0001_52c4_4f1e_b7d2_9c31d4a8b05f;
pub const CHAR_CONFIRM: u128 = 0x6e7a0002_52c4_4f1e_b7d2_9c31d4a8b05f;

/// Bytes the bridge keeps for logging between polls. Confirmation
/// detection sees every write in full regardless.
pub const MAX_WRITE_BYTES: usize = 64;

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Connected,
    Failed,
}

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the link.

#[cfg(target_os = "espidf")]
static BLE_CONFIRM_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONNECTED_EVT: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_DISCONNECTED_EVT: AtomicBool = AtomicBool::new(false);

#[cfg(target_os = "espidf")]
static BLE_RX: RxBridge = RxBridge::new();

// ───────────────────────────────────────────────────────────────
// Write bridge
// ───────────────────────────────────────────────────────────────

/// Hands characteristic writes from the Bluedroid task to the main loop.
///
/// The confirmation check runs on the full payload at write time, so a
/// `'g'` is never lost to the bounded log buffer.
pub struct RxBridge {
    confirmed: AtomicBool,
    dropped: AtomicU32,
    // GATTS callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.
    log: std::sync::Mutex<heapless::Vec<u8, MAX_WRITE_BYTES>>,
}

impl Default for RxBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl RxBridge {
    pub const fn new() -> Self {
        Self {
            confirmed: AtomicBool::new(false),
            dropped: AtomicU32::new(0),
            log: std::sync::Mutex::new(heapless::Vec::new()),
        }
    }

    /// Record one write. Returns whether it carried a confirmation.
    pub fn record_write(&self, data: &[u8]) -> bool {
        let confirmed = is_confirmation_payload(data);
        if confirmed {
            self.confirmed.store(true, Ordering::Release);
        }
        if let Ok(mut buf) = self.log.lock() {
            let room = MAX_WRITE_BYTES - buf.len();
            let kept = data.len().min(room);
            let _ = buf.extend_from_slice(&data[..kept]);
            if kept < data.len() {
                self.dropped
                    .fetch_add((data.len() - kept) as u32, Ordering::Relaxed);
            }
        }
        confirmed
    }

    pub fn take_confirmed(&self) -> bool {
        self.confirmed.swap(false, Ordering::Acquire)
    }

    /// Move logged bytes out, with the count that did not fit.
    pub fn take_bytes(&self) -> (heapless::Vec<u8, MAX_WRITE_BYTES>, u32) {
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        let bytes = self
            .log
            .lock()
            .map(|mut buf| core::mem::take(&mut *buf))
            .unwrap_or_default();
        (bytes, dropped)
    }
}

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    unsafe {
        t.uuid.uuid128 = uuid.to_le_bytes();
    }
    t
}

#[cfg(target_os = "espidf")]
unsafe fn start_advertising() {
    use esp_idf_svc::sys::*;
    let mut adv_params = esp_ble_adv_params_t {
        adv_int_min: 0x20,
        adv_int_max: 0x40,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        ..unsafe { core::mem::zeroed() }
    };
    unsafe { esp_ble_gap_start_advertising(&mut adv_params) };
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: uuid128_to_esp(SERVICE_UUID),
                    inst_id: 0,
                },
                is_primary: true,
            };
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, 4) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let svc_handle = unsafe { (*param).create.service_handle };
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            let mut char_uuid = uuid128_to_esp(CHAR_CONFIRM);
            unsafe {
                esp_ble_gatts_start_service(svc_handle);
                esp_ble_gatts_add_char(
                    svc_handle,
                    &mut char_uuid,
                    ESP_GATT_PERM_WRITE as esp_gatt_perm_t,
                    ESP_GATT_CHAR_PROP_BIT_WRITE as esp_gatt_char_prop_t,
                    core::ptr::null_mut(),
                    core::ptr::null_mut(),
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let handle = unsafe { (*param).add_char.attr_handle };
            BLE_CONFIRM_CHAR_HANDLE.store(handle as u32, Ordering::Relaxed);
            log::info!("BLE GATTS: confirmation char (handle={})", handle);
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            BLE_CONNECTED_EVT.store(true, Ordering::Release);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            BLE_DISCONNECTED_EVT.store(true, Ordering::Release);
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            if p.handle as u32 == BLE_CONFIRM_CHAR_HANDLE.load(Ordering::Relaxed) {
                let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };
                BLE_RX.record_write(data);
            }
            // Write-with-response: the client stalls until acknowledged.
            if p.need_rsp {
                unsafe {
                    esp_ble_gatts_send_response(
                        gatts_if,
                        p.conn_id,
                        p.trans_id,
                        esp_gatt_status_t_ESP_GATT_OK,
                        core::ptr::null_mut(),
                    );
                }
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE link
// ───────────────────────────────────────────────────────────────

pub struct BleLink<'a> {
    state: BleState,
    device_name: heapless::String<24>,
    flag: &'a ConfirmationFlag,
    bytes_received: u32,
    confirmations: u32,
}

impl<'a> BleLink<'a> {
    pub fn new(device_name: heapless::String<24>, flag: &'a ConfirmationFlag) -> Self {
        Self {
            state: BleState::Idle,
            device_name,
            flag,
            bytes_received: 0,
            confirmations: 0,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn bytes_received(&self) -> u32 {
        self.bytes_received
    }

    pub fn confirmations(&self) -> u32 {
        self.confirmations
    }

    /// Bring up the stack and begin advertising.
    pub fn start(&mut self) -> Result<(), CommsError> {
        if let Err(e) = self.platform_start() {
            self.state = BleState::Failed;
            return Err(e);
        }
        self.state = BleState::Advertising;
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.state == BleState::Idle {
            return;
        }
        self.platform_stop();
        self.state = BleState::Idle;
    }

    /// Dispatch anything the Bluedroid task recorded since the last call.
    #[cfg(target_os = "espidf")]
    pub fn poll(&mut self) {
        if BLE_CONNECTED_EVT.swap(false, Ordering::Acquire) {
            self.on_connect();
        }
        self.drain(&BLE_RX);
        if BLE_DISCONNECTED_EVT.swap(false, Ordering::Acquire) {
            self.on_disconnect();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn poll(&mut self) {}

    /// Log bridged bytes and forward a confirmation seen at write time.
    pub fn drain(&mut self, bridge: &RxBridge) {
        let (bytes, dropped) = bridge.take_bytes();
        self.log_rx(&bytes);
        if dropped > 0 {
            debug!("BLE: {} byte(s) not logged", dropped);
            self.bytes_received = self.bytes_received.wrapping_add(dropped);
        }
        if bridge.take_confirmed() {
            self.on_confirmation_received();
        }
    }

    fn log_rx(&mut self, payload: &[u8]) {
        for &b in payload {
            debug!("BLE: rx 0x{:02x} ({:?})", b, b as char);
        }
        self.bytes_received = self.bytes_received.wrapping_add(payload.len() as u32);
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;
        unsafe {
            // BLE-only: hand classic BT memory back to the heap.
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            if esp_bt_controller_init(&mut bt_cfg) != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed("bt_controller_init"));
            }
            if esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE) != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed("bt_controller_enable"));
            }
            if esp_bluedroid_init() != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed("bluedroid_init"));
            }
            if esp_bluedroid_enable() != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed("bluedroid_enable"));
            }

            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            esp_ble_gatts_app_register(0);

            // Bluedroid copies the name; it must be NUL-terminated.
            let mut name = [0u8; 25];
            let bytes = self.device_name.as_bytes();
            name[..bytes.len()].copy_from_slice(bytes);
            esp_ble_gap_set_device_name(name.as_ptr() as *const _);

            start_advertising();
        }
        info!("BLE(espidf): advertising as '{}'", self.device_name);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        info!(
            "BLE(sim): advertising '{}' (service {:032x})",
            self.device_name, SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        use esp_idf_svc::sys::*;
        unsafe {
            esp_ble_gap_stop_advertising();
            esp_bluedroid_disable();
            esp_bluedroid_deinit();
            esp_bt_controller_disable();
            esp_bt_controller_deinit();
        }
        info!("BLE(espidf): stack shut down");
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) {
        info!("BLE(sim): stopped");
    }

    #[cfg(target_os = "espidf")]
    fn platform_readvertise(&mut self) {
        // SAFETY: only reached after platform_start brought Bluedroid up.
        unsafe { start_advertising() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_readvertise(&mut self) {
        debug!("BLE(sim): advertising restarted");
    }
}

impl LinkHandler for BleLink<'_> {
    fn on_connect(&mut self) {
        info!("BLE: client connected");
        self.state = BleState::Connected;
    }

    fn on_disconnect(&mut self) {
        info!("BLE: client disconnected");
        if matches!(self.state, BleState::Idle | BleState::Failed) {
            return;
        }
        self.platform_readvertise();
        self.state = BleState::Advertising;
        info!("BLE: advertising restarted");
    }

    fn on_command_received(&mut self, payload: &[u8]) {
        self.log_rx(payload);
        if is_confirmation_payload(payload) {
            self.on_confirmation_received();
        }
    }

    fn on_confirmation_received(&mut self) {
        info!("BLE: confirmation received");
        self.confirmations = self.confirmations.wrapping_add(1);
        self.flag.raise();
    }
}
