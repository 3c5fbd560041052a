//! BLE GATT server adapter.
//!
//! Brings up the light-control service, turns Bluedroid GATTS callbacks into
//! [`RadioEvent`]s for the registered handler, and implements [`RadioPort`]
//! for the requests the domain makes back into the stack.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Attribute      | UUID                                   | Properties          |
//! |----------------|----------------------------------------|---------------------|
//! | Service        | `80865467-9c99-4cce-a94e-48058d175fed` | primary             |
//! | RX (commands)  | `011c9658-f282-4ddc-97a9-a1b1fb6c52b9` | Write Without Resp. |
//! | TX (status)    | `88e28319-e781-4b31-b34f-5b9c65e4dd74` | Notify              |
//! | TX CCCD        | `0x2902`                               | Read+Write          |
//!
//! These identifiers are the client-facing wire contract.

use std::sync::Mutex;

use log::{info, warn};

use crate::app::events::RadioEvent;
use crate::app::link::LinkTimingRequest;
use crate::app::ports::RadioPort;
use crate::config::LightConfig;
use crate::error::{CommsError, Result};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x80865467_9c99_4cce_a94e_48058d175fed;
pub const CHAR_RX: u128 = 0x011c9658_f282_4ddc_97a9_a1b1fb6c52b9;
pub const CHAR_TX: u128 = 0x88e28319_e781_4b31_b34f_5b9c65e4dd74;
/// Client Characteristic Configuration descriptor.
pub const DESCR_CCCD: u16 = 0x2902;

/// Legacy advertising PDU payload limit.
pub const MAX_ADV_LEN: usize = 31;
/// Default ATT MTU (23) minus the 3-byte notification header.
pub const MAX_NOTIFY_LEN: usize = 20;

const AD_TYPE_FLAGS: u8 = 0x01;
const AD_TYPE_COMPLETE_UUID128: u8 = 0x07;
/// LE General Discoverable | BR/EDR Not Supported.
const ADV_FLAGS: u8 = 0x02 | 0x04;

/// Raw advertising data.
pub type AdvPayload = heapless::Vec<u8, MAX_ADV_LEN>;

/// Receives every GATT server event.  A plain `fn` because Bluedroid
/// callbacks are C function pointers that cannot capture state.
pub type RadioEventHandler = fn(RadioEvent<'_>);

// ───────────────────────────────────────────────────────────────
// Advertising payload
// ───────────────────────────────────────────────────────────────

/// Flags AD structure followed by the complete list of 128-bit service
/// UUIDs, UUID bytes little-endian as on the air.
pub fn adv_payload(service: u128) -> AdvPayload {
    let mut adv = AdvPayload::new();
    // 3 + 18 bytes never exceeds MAX_ADV_LEN.
    let _ = adv.extend_from_slice(&[2, AD_TYPE_FLAGS, ADV_FLAGS]);
    let _ = adv.extend_from_slice(&[17, AD_TYPE_COMPLETE_UUID128]);
    let _ = adv.extend_from_slice(&service.to_le_bytes());
    adv
}

// ───────────────────────────────────────────────────────────────
// Event handler registration
// ───────────────────────────────────────────────────────────────

static EVENT_HANDLER: Mutex<Option<RadioEventHandler>> = Mutex::new(None);

/// Install the single handler for connect, disconnect and write events.
pub fn set_event_handler(handler: RadioEventHandler) {
    if let Ok(mut slot) = EVENT_HANDLER.lock() {
        *slot = Some(handler);
    }
}

fn raise(event: RadioEvent<'_>) {
    // Copy the fn pointer out so the lock is not held while handling.
    let handler = EVENT_HANDLER.lock().ok().and_then(|slot| *slot);
    match handler {
        Some(handle) => handle(event),
        None => warn!("BLE: dropped {:?} (no handler registered)", event),
    }
}

/// Simulation: inject a GATT server event as if Bluedroid had raised it.
#[cfg(not(target_os = "espidf"))]
pub fn sim_raise(event: RadioEvent<'_>) {
    raise(event);
}

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Failed,
}

// ── ESP-IDF BLE static state (ISR-safe atomics) ───────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These atomics bridge the callback context to BleRadio.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_LINK_UP: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_NOTIFY_ENABLED: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_TX_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_TX_CCCD_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_RX_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CHAR_STEP: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_ADV_INTERVAL: AtomicU32 = AtomicU32::new(0x20);

/// Attribute handles reserved for the service: declaration, TX (2), CCCD, RX (2).
#[cfg(target_os = "espidf")]
const SERVICE_NUM_HANDLES: u16 = 8;

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    t.uuid.uuid128 = uuid.to_le_bytes();
    t
}

#[cfg(target_os = "espidf")]
fn uuid16_to_esp(uuid: u16) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 2;
    t.uuid.uuid16 = uuid;
    t
}

#[cfg(target_os = "espidf")]
unsafe fn add_gatt_char(svc_handle: u16, uuid: u128, perm: u32, prop: u32) {
    use esp_idf_svc::sys::*;
    let mut char_uuid = uuid128_to_esp(uuid);
    unsafe {
        esp_ble_gatts_add_char(
            svc_handle,
            &mut char_uuid,
            perm as esp_gatt_perm_t,
            prop as esp_gatt_char_prop_t,
            core::ptr::null_mut(),
            core::ptr::null_mut(),
        );
    }
}

#[cfg(target_os = "espidf")]
unsafe fn start_advertising() {
    use esp_idf_svc::sys::*;
    let interval = BLE_ADV_INTERVAL.load(AtomicOrdering::Relaxed) as u16;
    unsafe {
        let mut adv_params = esp_ble_adv_params_t {
            adv_int_min: interval,
            adv_int_max: interval,
            adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
            own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
            channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
            adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
            ..core::mem::zeroed()
        };
        esp_ble_gap_start_advertising(&mut adv_params);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_RAW_SET_COMPLETE_EVT => {
            unsafe { start_advertising() };
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            let status = unsafe { (*param).adv_start_cmpl.status };
            if status == esp_bt_status_t_ESP_BT_STATUS_SUCCESS {
                log::info!("BLE GAP: advertising started");
            } else {
                log::warn!("BLE GAP: advertising start failed (status={})", status);
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_UPDATE_CONN_PARAMS_EVT => {
            let p = unsafe { &(*param).update_conn_params };
            log::info!(
                "BLE GAP: conn params status={} interval={} latency={} timeout={}",
                p.status,
                p.conn_int,
                p.latency,
                p.timeout
            );
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
    use crate::app::link::PeerAddress;
    use esp_idf_svc::sys::*;

    BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);

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
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, SERVICE_NUM_HANDLES) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let svc_handle = unsafe { (*param).create.service_handle };
            BLE_SVC_HANDLE.store(svc_handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            BLE_CHAR_STEP.store(1, AtomicOrdering::Relaxed);
            unsafe {
                esp_ble_gatts_start_service(svc_handle);
                add_gatt_char(
                    svc_handle,
                    CHAR_TX,
                    ESP_GATT_PERM_READ,
                    ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let handle = unsafe { (*param).add_char.attr_handle };
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            match BLE_CHAR_STEP.load(AtomicOrdering::Relaxed) {
                1 => {
                    BLE_TX_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: TX char (handle={})", handle);
                    BLE_CHAR_STEP.store(2, AtomicOrdering::Relaxed);
                    let mut cccd = uuid16_to_esp(DESCR_CCCD);
                    unsafe {
                        esp_ble_gatts_add_char_descr(
                            svc_handle,
                            &mut cccd,
                            (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                            core::ptr::null_mut(),
                            core::ptr::null_mut(),
                        );
                    }
                }
                3 => {
                    BLE_RX_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    BLE_CHAR_STEP.store(4, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: RX char (handle={}), all registered", handle);
                }
                _ => {}
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
            let handle = unsafe { (*param).add_char_descr.attr_handle };
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            if BLE_CHAR_STEP.load(AtomicOrdering::Relaxed) == 2 {
                BLE_TX_CCCD_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                log::info!("BLE GATTS: TX CCCD (handle={})", handle);
                BLE_CHAR_STEP.store(3, AtomicOrdering::Relaxed);
                unsafe {
                    add_gatt_char(
                        svc_handle,
                        CHAR_RX,
                        ESP_GATT_PERM_WRITE,
                        ESP_GATT_CHAR_PROP_BIT_WRITE_NR,
                    );
                }
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let p = unsafe { &(*param).connect };
            BLE_CONN_ID.store(p.conn_id as u32, AtomicOrdering::Relaxed);
            BLE_NOTIFY_ENABLED.store(false, AtomicOrdering::Relaxed);
            BLE_LINK_UP.store(true, AtomicOrdering::Release);
            log::info!("BLE GATTS: client connected (conn_id={})", p.conn_id);
            raise(RadioEvent::Connected(PeerAddress(p.remote_bda)));
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            BLE_LINK_UP.store(false, AtomicOrdering::Release);
            BLE_NOTIFY_ENABLED.store(false, AtomicOrdering::Relaxed);
            let reason = unsafe { (*param).disconnect.reason };
            log::info!("BLE GATTS: client disconnected (reason=0x{:02x})", reason);
            raise(RadioEvent::Disconnected);
            // Single-peer link: become connectable again.
            unsafe { start_advertising() };
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            let handle = p.handle as u32;
            let data: &[u8] = if p.value.is_null() || p.len == 0 {
                &[]
            } else {
                unsafe { core::slice::from_raw_parts(p.value, p.len as usize) }
            };

            if handle == BLE_RX_CHAR_HANDLE.load(AtomicOrdering::Relaxed) {
                raise(RadioEvent::Write(data));
            } else if handle == BLE_TX_CCCD_HANDLE.load(AtomicOrdering::Relaxed) {
                let enabled = data.first().is_some_and(|b| b & 0x01 != 0);
                BLE_NOTIFY_ENABLED.store(enabled, AtomicOrdering::Relaxed);
                log::info!("BLE GATTS: TX notifications {}", if enabled { "on" } else { "off" });
            }

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
// BLE adapter (stack lifecycle)
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    state: BleState,
    device_name: heapless::String<24>,
    adv_interval_units: u16,
}

impl BleAdapter {
    pub fn new(config: &LightConfig) -> Self {
        Self {
            state: BleState::Idle,
            device_name: config.device_name.clone(),
            adv_interval_units: config.adv_interval_units,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BleState::Advertising
    }

    /// Handle for issuing [`RadioPort`] requests from any context.
    pub fn radio(&self) -> BleRadio {
        BleRadio
    }

    /// Bring up the stack, register the service and start advertising.
    pub fn start(&mut self) -> Result<()> {
        info!("BLE: starting advertising as '{}'", self.device_name);
        match self.platform_start() {
            Ok(()) => {
                self.state = BleState::Advertising;
                Ok(())
            }
            Err(e) => {
                self.state = BleState::Failed;
                Err(e)
            }
        }
    }

    pub fn stop(&mut self) {
        self.platform_stop();
        self.state = BleState::Idle;
        info!("BLE: stopped");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<()> {
        use esp_idf_svc::sys::*;

        BLE_ADV_INTERVAL.store(u32::from(self.adv_interval_units), AtomicOrdering::Relaxed);

        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_init failed ({})", ret);
                return Err(CommsError::BleInitFailed.into());
            }

            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed.into());
            }

            let ret = esp_bluedroid_init();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_init failed ({})", ret);
                return Err(CommsError::BleInitFailed.into());
            }

            let ret = esp_bluedroid_enable();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed.into());
            }

            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            esp_ble_gatts_app_register(0);

            // GAP device name (NUL-terminated C string).
            let mut name = heapless::Vec::<u8, 25>::new();
            let _ = name.extend_from_slice(self.device_name.as_bytes());
            let _ = name.push(0);
            esp_ble_gap_set_device_name(name.as_ptr() as *const _);

            // Advertising starts from the RAW_SET_COMPLETE GAP event.
            let mut adv = adv_payload(SERVICE_UUID);
            let ret = esp_ble_gap_config_adv_data_raw(adv.as_mut_ptr(), adv.len() as u32);
            if ret != ESP_OK as i32 {
                log::error!("BLE: config_adv_data_raw failed ({})", ret);
                return Err(CommsError::BleInitFailed.into());
            }
        }

        info!(
            "BLE(espidf): Bluedroid stack initialized, advertising as '{}'",
            self.device_name
        );
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<()> {
        info!(
            "BLE(sim): advertising '{}' every {} units (service {:032x})",
            self.device_name, self.adv_interval_units, SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        use esp_idf_svc::sys::*;
        BLE_LINK_UP.store(false, AtomicOrdering::Release);
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
}

// ───────────────────────────────────────────────────────────────
// RadioPort implementation
// ───────────────────────────────────────────────────────────────

/// Stateless handle onto the running stack.  Usable from the GATTS
/// callback context and the status loop alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct BleRadio;

impl RadioPort for BleRadio {
    #[cfg(target_os = "espidf")]
    fn request_link_timing(&mut self, request: &LinkTimingRequest) -> Result<()> {
        use esp_idf_svc::sys::*;
        let mut params = esp_ble_conn_update_params_t {
            bda: request.peer.0,
            min_int: request.min_interval,
            max_int: request.max_interval,
            latency: request.latency,
            timeout: request.supervision_timeout,
        };
        let ret = unsafe { esp_ble_gap_update_conn_params(&mut params) };
        if ret != ESP_OK as i32 {
            return Err(CommsError::LinkUpdateFailed(ret).into());
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn request_link_timing(&mut self, request: &LinkTimingRequest) -> Result<()> {
        info!(
            "BLE(sim): conn params for {} → {}-{} units, latency {}, timeout {}",
            request.peer,
            request.min_interval,
            request.max_interval,
            request.latency,
            request.supervision_timeout
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn notify(&mut self, value: &[u8]) -> Result<()> {
        use esp_idf_svc::sys::*;
        if value.len() > MAX_NOTIFY_LEN {
            return Err(CommsError::PayloadTooLong.into());
        }
        if !BLE_LINK_UP.load(AtomicOrdering::Acquire)
            || !BLE_NOTIFY_ENABLED.load(AtomicOrdering::Relaxed)
        {
            return Err(CommsError::NotConnected.into());
        }
        let ret = unsafe {
            esp_ble_gatts_send_indicate(
                BLE_GATTS_IF.load(AtomicOrdering::Relaxed) as esp_gatt_if_t,
                BLE_CONN_ID.load(AtomicOrdering::Relaxed) as u16,
                BLE_TX_CHAR_HANDLE.load(AtomicOrdering::Relaxed) as u16,
                value.len() as u16,
                value.as_ptr() as *mut u8,
                false,
            )
        };
        if ret != ESP_OK as i32 {
            return Err(CommsError::NotifyFailed(ret).into());
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn notify(&mut self, value: &[u8]) -> Result<()> {
        if value.len() > MAX_NOTIFY_LEN {
            return Err(CommsError::PayloadTooLong.into());
        }
        info!("BLE(sim): notify {} bytes", value.len());
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
